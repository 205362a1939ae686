use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow as _, Pool, QueryBuilder, Row as _};

use crate::{ChosenDB, error::Result};

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateGenre {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(length(min = 1))]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn insert<'e, X>(executor: X, payload: &CreateGenre) -> Result<Genre>
where
    X: Executor<'e, Database = ChosenDB>,
{
    payload.validate()?;
    let record = sqlx::query_as::<_, Genre>(
        "INSERT INTO genre (name, description) VALUES (?, ?) \
         RETURNING id, name, description, created_at, updated_at",
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .fetch_one(executor)
    .await?;
    Ok(record)
}

pub(crate) async fn exists<'e, X>(executor: X, id: i64) -> Result<bool>
where
    X: Executor<'e, Database = ChosenDB>,
{
    let found = sqlx::query_scalar::<_, i64>("SELECT id FROM genre WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(found.is_some())
}

/// Ids of those requested genres which exist, duplicates collapse.
pub(crate) async fn find_ids<'e, X>(executor: X, ids: &[i64]) -> Result<Vec<i64>>
where
    X: Executor<'e, Database = ChosenDB>,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut query = QueryBuilder::<ChosenDB>::new("SELECT id FROM genre WHERE id IN (");
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY id");
    let found = query.build_query_scalar::<i64>().fetch_all(executor).await?;
    Ok(found)
}

/// Genres of given books as `(book_id, genre)` pairs, ordered by book and genre.
pub(crate) async fn load_for_books<'e, X>(executor: X, book_ids: &[i64]) -> Result<Vec<(i64, Genre)>>
where
    X: Executor<'e, Database = ChosenDB>,
{
    if book_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut query = QueryBuilder::<ChosenDB>::new(
        "SELECT bg.book_id, g.id, g.name, g.description, g.created_at, g.updated_at \
         FROM book_genres bg JOIN genre g ON g.id = bg.genre_id WHERE bg.book_id IN (",
    );
    let mut separated = query.separated(", ");
    for id in book_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY bg.book_id, g.id");
    let rows = query.build().fetch_all(executor).await?;
    rows.iter()
        .map(|row| -> Result<(i64, Genre)> {
            let book_id: i64 = row.try_get("book_id")?;
            Ok((book_id, Genre::from_row(row)?))
        })
        .collect()
}

pub type GenreRepository = GenreRepositoryImpl<Pool<ChosenDB>>;

pub struct GenreRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> GenreRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn list(&self) -> Result<Vec<Genre>> {
        let records = sqlx::query_as::<_, Genre>(
            "SELECT id, name, description, created_at, updated_at FROM genre ORDER BY id",
        )
        .fetch_all(&self.executor)
        .await?;
        Ok(records)
    }
}
