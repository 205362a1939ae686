pub mod author;
pub mod book;
pub mod error;
pub mod genre;
pub mod schema;
pub mod seed;

use std::str::FromStr as _;

pub use error::Error;
pub use sqlx::Error as SqlxError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::Result;

pub type ChosenDB = sqlx::Sqlite;
pub type ChosenRow = sqlx::sqlite::SqliteRow;
pub type ChosenConnection = sqlx::SqliteConnection;
pub type Pool = sqlx::Pool<ChosenDB>;

pub async fn new_pool(database_url: &str) -> Result<Pool, Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(50)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Decodes an entity from a joined row, where its columns are aliased with an entity prefix
/// (e.g. `author_name` for `author.name`).
pub trait FromRowPrefixed: Sized {
    fn from_row_prefixed(row: &ChosenRow) -> Result<Self, sqlx::Error>;
}
