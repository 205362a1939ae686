use time::macros::date;
use tracing::info;

use crate::{
    Pool,
    author::{self, Author, CreateAuthor},
    book::{self, CreateBook},
    error::Result,
    genre::{self, CreateGenre, Genre},
};

struct SeedBook {
    title: &'static str,
    description: &'static str,
    publication_year: i32,
    /// index into seeded authors
    author: usize,
    /// indexes into seeded genres
    genres: &'static [usize],
}

const BOOKS: &[SeedBook] = &[
    SeedBook {
        title: "Harry Potter and the Philosopher's Stone",
        description: "A young wizard's journey begins.",
        publication_year: 1997,
        author: 0,
        genres: &[0],
    },
    SeedBook {
        title: "Game of Thrones",
        description: "A medieval fantasy saga.",
        publication_year: 1996,
        author: 1,
        genres: &[0, 1],
    },
];

fn authors() -> Vec<CreateAuthor> {
    vec![
        CreateAuthor {
            name: "J.K. Rowling".to_string(),
            birthdate: date!(1965 - 07 - 31),
            email: "jkrowling@books.com".to_string(),
        },
        CreateAuthor {
            name: "George R.R. Martin".to_string(),
            birthdate: date!(1948 - 09 - 20),
            email: "grrmartin@books.com".to_string(),
        },
    ]
}

fn genres() -> Vec<CreateGenre> {
    vec![
        CreateGenre {
            name: "Fantasy".to_string(),
            description: Some("Magical and mythical stories.".to_string()),
        },
        CreateGenre {
            name: "Drama".to_string(),
            description: Some("Fiction with realistic characters and events.".to_string()),
        },
    ]
}

#[derive(Debug)]
pub struct Seeded {
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
    pub book_ids: Vec<i64>,
}

/// Drops all catalog tables, recreates them and fills in the sample data.
///
/// Runs in one transaction, so on failure the previous content stays in place.
pub async fn reset_and_seed(pool: &Pool) -> Result<Seeded> {
    let mut tx = pool.begin().await?;
    crate::schema::reset(&mut tx).await?;
    info!("Database synced");

    let mut authors = Vec::new();
    for payload in self::authors() {
        authors.push(author::insert(&mut *tx, &payload).await?);
    }
    info!("Authors seeded");

    let mut genres = Vec::new();
    for payload in self::genres() {
        genres.push(genre::insert(&mut *tx, &payload).await?);
    }
    info!("Genres seeded");

    let mut book_ids = Vec::with_capacity(BOOKS.len());
    for seed in BOOKS {
        let payload = CreateBook {
            title: seed.title.to_string(),
            description: seed.description.to_string(),
            publication_year: seed.publication_year,
            author_id: authors[seed.author].id,
            genre_ids: Vec::new(),
        };
        book_ids.push(book::insert(&mut tx, &payload).await?);
    }
    info!("Books seeded");

    for (seed, book_id) in BOOKS.iter().zip(&book_ids) {
        let genre_ids: Vec<i64> = seed.genres.iter().map(|&i| genres[i].id).collect();
        book::replace_genres(&mut tx, *book_id, &genre_ids).await?;
    }
    info!("Book-genre associations created");

    tx.commit().await?;
    Ok(Seeded {
        authors,
        genres,
        book_ids,
    })
}
