use std::collections::HashMap;

use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, Executor, Pool, Row as _};
use tracing::debug;

use crate::{
    ChosenConnection, ChosenDB, ChosenRow, Error, FromRowPrefixed,
    author::Author,
    error::Result,
    genre::{self, Genre},
};

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[garde(length(min = 1, max = 255))]
    pub title: String,
    #[garde(length(min = 1))]
    pub description: String,
    #[garde(skip)]
    pub publication_year: i32,
    #[garde(skip)]
    pub author_id: i64,
    #[garde(skip)]
    pub genre_ids: Vec<i64>,
}

/// Book record, relations are filled only by queries which join them.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub publication_year: i32,
    pub author_id: i64,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,

    #[serde(rename = "Author", default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(rename = "Genres", default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<Genre>>,
}

impl sqlx::FromRow<'_, ChosenRow> for Book {
    fn from_row(row: &ChosenRow) -> Result<Self, sqlx::Error> {
        let author = if row.try_column("author_name").is_ok() {
            Some(Author::from_row_prefixed(row)?)
        } else {
            None
        };
        Ok(Book {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            publication_year: row.try_get("publication_year")?,
            author_id: row.try_get("author_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            author,
            genres: None,
        })
    }
}

const SELECT_BOOK: &str = r#"
SELECT b.id, b.title, b.description, b.publication_year, b.author_id, b.created_at, b.updated_at
FROM book b
"#;

const SELECT_BOOK_WITH_AUTHOR: &str = r#"
SELECT b.id, b.title, b.description, b.publication_year, b.author_id, b.created_at, b.updated_at,
a.name AS author_name, a.birthdate AS author_birthdate, a.email AS author_email,
a.created_at AS author_created_at, a.updated_at AS author_updated_at
FROM book b
JOIN author a ON a.id = b.author_id
"#;

async fn author_exists<'e, X>(executor: X, id: i64) -> Result<bool>
where
    X: Executor<'e, Database = ChosenDB>,
{
    let found = sqlx::query_scalar::<_, i64>("SELECT id FROM author WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(found.is_some())
}

async fn with_genres<'e, X>(executor: X, mut books: Vec<Book>) -> Result<Vec<Book>>
where
    X: Executor<'e, Database = ChosenDB>,
{
    let ids: Vec<i64> = books.iter().map(|b| b.id).collect();
    let mut genres: HashMap<i64, Vec<Genre>> = HashMap::new();
    for (book_id, genre) in genre::load_for_books(executor, &ids).await? {
        genres.entry(book_id).or_default().push(genre);
    }
    for book in books.iter_mut() {
        book.genres = Some(genres.remove(&book.id).unwrap_or_default());
    }
    Ok(books)
}

/// Inserts the book row after checking its author, returns new id.
pub(crate) async fn insert(conn: &mut ChosenConnection, payload: &CreateBook) -> Result<i64> {
    payload.validate()?;
    if !author_exists(&mut *conn, payload.author_id).await? {
        return Err(Error::RecordNotFound("Author".to_string()));
    }
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO book (title, description, publication_year, author_id) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(payload.publication_year)
    .bind(payload.author_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Sets book genres to exactly `genre_ids`. Fails when any of the ids is unknown.
pub(crate) async fn replace_genres(
    conn: &mut ChosenConnection,
    book_id: i64,
    genre_ids: &[i64],
) -> Result<()> {
    let found = genre::find_ids(&mut *conn, genre_ids).await?;
    if found.len() != genre_ids.len() {
        debug!("Book {book_id}: requested genres {genre_ids:?}, found {found:?}");
        return Err(Error::UnknownGenres {
            requested: genre_ids.len(),
            found: found.len(),
        });
    }

    sqlx::query("DELETE FROM book_genres WHERE book_id = ?")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;
    for genre_id in found {
        sqlx::query("INSERT INTO book_genres (book_id, genre_id) VALUES (?, ?)")
            .bind(book_id)
            .bind(genre_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub type BookRepository = BookRepositoryImpl<Pool<ChosenDB>>;

pub struct BookRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> BookRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB> + Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Book with its author and genres.
    pub async fn get(&self, id: i64) -> Result<Book> {
        let sql = format!("{SELECT_BOOK_WITH_AUTHOR} WHERE b.id = ?");
        let book = sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::RecordNotFound("Book".to_string()))?;
        let mut books = with_genres(&self.executor, vec![book]).await?;
        books
            .pop()
            .ok_or_else(|| Error::RecordNotFound("Book".to_string()))
    }

    /// All books with their authors and genres.
    pub async fn list(&self) -> Result<Vec<Book>> {
        let sql = format!("{SELECT_BOOK_WITH_AUTHOR} ORDER BY b.id");
        let books = sqlx::query_as::<_, Book>(&sql)
            .fetch_all(&self.executor)
            .await?;
        with_genres(&self.executor, books).await
    }

    /// Books of the author with their genres, author itself must exist.
    pub async fn list_by_author(&self, author_id: i64) -> Result<Vec<Book>> {
        if !author_exists(&self.executor, author_id).await? {
            return Err(Error::RecordNotFound("Author".to_string()));
        }
        let sql = format!("{SELECT_BOOK} WHERE b.author_id = ? ORDER BY b.id");
        let books = sqlx::query_as::<_, Book>(&sql)
            .bind(author_id)
            .fetch_all(&self.executor)
            .await?;
        with_genres(&self.executor, books).await
    }

    /// Books filed under the genre, with their authors and genres.
    pub async fn list_by_genre(&self, genre_id: i64) -> Result<Vec<Book>> {
        if !genre::exists(&self.executor, genre_id).await? {
            return Err(Error::RecordNotFound("Genre".to_string()));
        }
        let sql = format!(
            "{SELECT_BOOK_WITH_AUTHOR} JOIN book_genres bg ON bg.book_id = b.id WHERE bg.genre_id = ? ORDER BY b.id"
        );
        let books = sqlx::query_as::<_, Book>(&sql)
            .bind(genre_id)
            .fetch_all(&self.executor)
            .await?;
        with_genres(&self.executor, books).await
    }

    /// Creates the book together with its genre associations, all or nothing.
    pub async fn create(&self, payload: CreateBook) -> Result<Book> {
        let mut tx = self.executor.begin().await?;
        let id = insert(&mut tx, &payload).await?;
        replace_genres(&mut tx, id, &payload.genre_ids).await?;
        tx.commit().await?;
        debug!("Created book {id} with genres {:?}", payload.genre_ids);

        self.get(id).await
    }

    /// Replaces genres of an existing book.
    pub async fn set_genres(&self, book_id: i64, genre_ids: &[i64]) -> Result<Book> {
        let mut tx = self.executor.begin().await?;
        let found = sqlx::query_scalar::<_, i64>("SELECT id FROM book WHERE id = ?")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?;
        if found.is_none() {
            return Err(Error::RecordNotFound("Book".to_string()));
        }
        replace_genres(&mut tx, book_id, genre_ids).await?;
        sqlx::query("UPDATE book SET updated_at = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        self.get(book_id).await
    }
}
