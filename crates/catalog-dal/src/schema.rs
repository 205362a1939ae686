use sqlx::Executor;
use tracing::debug;

use crate::{ChosenConnection, ChosenDB, error::Result};

const CREATE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS author (
    id INTEGER PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    birthdate DATE NOT NULL,
    email VARCHAR(255) NOT NULL UNIQUE,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS genre (
    id INTEGER PRIMARY KEY,
    name VARCHAR(255) NOT NULL UNIQUE,
    description TEXT,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS book (
    id INTEGER PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    description TEXT NOT NULL,
    publication_year INTEGER NOT NULL,
    author_id INTEGER NOT NULL REFERENCES author(id) ON UPDATE CASCADE,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS book_author_id_idx ON book(author_id);

CREATE TABLE IF NOT EXISTS book_genres (
    book_id INTEGER NOT NULL REFERENCES book(id) ON DELETE CASCADE ON UPDATE CASCADE,
    genre_id INTEGER NOT NULL REFERENCES genre(id) ON DELETE CASCADE ON UPDATE CASCADE,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (book_id, genre_id)
);

CREATE INDEX IF NOT EXISTS book_genres_genre_id_idx ON book_genres(genre_id);
"#;

// Children first, so foreign keys never dangle while dropping.
const DROP_SCHEMA: &str = r#"
DROP TABLE IF EXISTS book_genres;
DROP TABLE IF EXISTS book;
DROP TABLE IF EXISTS genre;
DROP TABLE IF EXISTS author;
"#;

/// Creates missing tables, existing data is left untouched.
pub async fn ensure_schema<'c, E>(executor: E) -> Result<()>
where
    E: Executor<'c, Database = ChosenDB>,
{
    sqlx::raw_sql(CREATE_SCHEMA).execute(executor).await?;
    Ok(())
}

/// Drops all catalog tables and creates them again empty.
pub async fn reset(conn: &mut ChosenConnection) -> Result<()> {
    conn.execute(DROP_SCHEMA).await?;
    debug!("Catalog tables dropped");
    conn.execute(CREATE_SCHEMA).await?;
    debug!("Catalog tables created");
    Ok(())
}
