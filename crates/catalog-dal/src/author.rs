use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::{Executor, Pool, Row as _};

use crate::{ChosenDB, ChosenRow, Error, FromRowPrefixed, error::Result};

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthor {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(skip)]
    pub birthdate: time::Date,
    #[garde(length(min = 1, max = 255))]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub birthdate: time::Date,
    pub email: String,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
}

impl FromRowPrefixed for Author {
    fn from_row_prefixed(row: &ChosenRow) -> Result<Self, sqlx::Error> {
        Ok(Author {
            id: row.try_get("author_id")?,
            name: row.try_get("author_name")?,
            birthdate: row.try_get("author_birthdate")?,
            email: row.try_get("author_email")?,
            created_at: row.try_get("author_created_at")?,
            updated_at: row.try_get("author_updated_at")?,
        })
    }
}

pub(crate) async fn insert<'e, X>(executor: X, payload: &CreateAuthor) -> Result<Author>
where
    X: Executor<'e, Database = ChosenDB>,
{
    payload.validate()?;
    let record = sqlx::query_as::<_, Author>(
        "INSERT INTO author (name, birthdate, email) VALUES (?, ?, ?) \
         RETURNING id, name, birthdate, email, created_at, updated_at",
    )
    .bind(&payload.name)
    .bind(payload.birthdate)
    .bind(&payload.email)
    .fetch_one(executor)
    .await?;
    Ok(record)
}

pub type AuthorRepository = AuthorRepositoryImpl<Pool<ChosenDB>>;

pub struct AuthorRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> AuthorRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateAuthor) -> Result<Author> {
        insert(&self.executor, &payload).await
    }

    pub async fn get(&self, id: i64) -> Result<Author> {
        sqlx::query_as::<_, Author>(
            "SELECT id, name, birthdate, email, created_at, updated_at FROM author WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.executor)
        .await?
        .ok_or_else(|| Error::RecordNotFound("Author".to_string()))
    }

    pub async fn list(&self) -> Result<Vec<Author>> {
        let records = sqlx::query_as::<_, Author>(
            "SELECT id, name, birthdate, email, created_at, updated_at FROM author ORDER BY id",
        )
        .fetch_all(&self.executor)
        .await?;
        Ok(records)
    }

    /// Distinct authors of the books filed under the genre.
    pub async fn list_by_genre(&self, genre_id: i64) -> Result<Vec<Author>> {
        if !crate::genre::exists(&self.executor, genre_id).await? {
            return Err(Error::RecordNotFound("Genre".to_string()));
        }
        const SQL: &str = r#"
        SELECT DISTINCT a.id, a.name, a.birthdate, a.email, a.created_at, a.updated_at
        FROM author a
        JOIN book b ON b.author_id = a.id
        JOIN book_genres bg ON bg.book_id = b.id
        WHERE bg.genre_id = ?
        ORDER BY a.id
        "#;
        let records = sqlx::query_as::<_, Author>(SQL)
            .bind(genre_id)
            .fetch_all(&self.executor)
            .await?;
        Ok(records)
    }
}
