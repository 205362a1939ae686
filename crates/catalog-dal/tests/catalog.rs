use catalog_dal::{
    Error,
    author::{AuthorRepository, CreateAuthor},
    book::{BookRepository, CreateBook},
    genre::GenreRepository,
};
use time::macros::date;

async fn init_db() -> sqlx::Pool<sqlx::Sqlite> {
    const DB_URL: &str = "sqlite::memory:";
    let conn = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .connect(DB_URL)
        .await
        .unwrap();
    catalog_dal::schema::ensure_schema(&conn).await.unwrap();
    catalog_dal::seed::reset_and_seed(&conn).await.unwrap();
    conn
}

async fn count(conn: &sqlx::Pool<sqlx::Sqlite>, table: &str) -> i64 {
    sqlx::query_scalar(&format!("select count(*) from {table}"))
        .fetch_one(conn)
        .await
        .unwrap()
}

fn assert_send<T: Send>(_: &T) {}

#[tokio::test]
async fn test_reseed_future_is_send() {
    let conn = init_db().await;
    // handlers run on a multithreaded runtime
    let seeding = catalog_dal::seed::reset_and_seed(&conn);
    assert_send(&seeding);
    let seeded = tokio::spawn({
        let conn = conn.clone();
        async move { catalog_dal::seed::reset_and_seed(&conn).await }
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(seeded.book_ids.len(), 2);
    drop(seeding);
    assert_eq!(count(&conn, "book").await, 2);
}

#[tokio::test]
async fn test_reseed_is_idempotent() {
    let conn = init_db().await;
    let first = catalog_dal::seed::reset_and_seed(&conn).await.unwrap();
    let second = catalog_dal::seed::reset_and_seed(&conn).await.unwrap();

    assert_eq!(count(&conn, "author").await, 2);
    assert_eq!(count(&conn, "genre").await, 2);
    assert_eq!(count(&conn, "book").await, 2);
    assert_eq!(count(&conn, "book_genres").await, 3);

    let names = |s: &catalog_dal::seed::Seeded| {
        s.authors.iter().map(|a| a.email.clone()).collect::<Vec<_>>()
    };
    assert_eq!(names(&first), names(&second));
    assert_eq!(first.book_ids, second.book_ids);

    let books = BookRepository::new(conn).list().await.unwrap();
    let genres: Vec<Vec<String>> = books
        .iter()
        .map(|b| {
            b.genres
                .as_ref()
                .unwrap()
                .iter()
                .map(|g| g.name.clone())
                .collect()
        })
        .collect();
    assert_eq!(
        genres,
        vec![vec!["Fantasy".to_string()], vec!["Fantasy".to_string(), "Drama".to_string()]]
    );
}

#[tokio::test]
async fn test_reseed_removes_added_rows() {
    let conn = init_db().await;
    let authors = AuthorRepository::new(conn.clone());
    authors
        .create(CreateAuthor {
            name: "Terry Pratchett".to_string(),
            birthdate: date!(1948 - 04 - 28),
            email: "pratchett@books.com".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(count(&conn, "author").await, 3);

    catalog_dal::seed::reset_and_seed(&conn).await.unwrap();
    assert_eq!(count(&conn, "author").await, 2);
}

#[tokio::test]
async fn test_list_books_with_relations() {
    let conn = init_db().await;
    let repo = BookRepository::new(conn);
    let books = repo.list().await.unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].title, "Harry Potter and the Philosopher's Stone");
    assert_eq!(books[0].author.as_ref().unwrap().name, "J.K. Rowling");
    assert_eq!(books[1].author.as_ref().unwrap().name, "George R.R. Martin");
    assert_eq!(books[1].genres.as_ref().unwrap().len(), 2);
}

#[tokio::test]
async fn test_books_by_genre() {
    let conn = init_db().await;
    let genres = GenreRepository::new(conn.clone()).list().await.unwrap();
    let fantasy = genres.iter().find(|g| g.name == "Fantasy").unwrap();
    let drama = genres.iter().find(|g| g.name == "Drama").unwrap();

    let repo = BookRepository::new(conn);
    let fantasy_books = repo.list_by_genre(fantasy.id).await.unwrap();
    assert_eq!(fantasy_books.len(), 2);

    let drama_books = repo.list_by_genre(drama.id).await.unwrap();
    assert_eq!(drama_books.len(), 1);
    assert_eq!(drama_books[0].title, "Game of Thrones");

    let res = repo.list_by_genre(999).await;
    assert!(matches!(res, Err(Error::RecordNotFound(ref what)) if what == "Genre"));
}

#[tokio::test]
async fn test_books_by_author() {
    let conn = init_db().await;
    let authors = AuthorRepository::new(conn.clone());
    let all = authors.list().await.unwrap();
    let rowling = all.iter().find(|a| a.name == "J.K. Rowling").unwrap();

    let repo = BookRepository::new(conn);
    let books = repo.list_by_author(rowling.id).await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Harry Potter and the Philosopher's Stone");
    assert!(books[0].author.is_none());
    assert_eq!(books[0].genres.as_ref().unwrap()[0].name, "Fantasy");

    let no_books = authors
        .create(CreateAuthor {
            name: "Nobody".to_string(),
            birthdate: date!(1970 - 01 - 01),
            email: "nobody@books.com".to_string(),
        })
        .await
        .unwrap();
    let books = repo.list_by_author(no_books.id).await.unwrap();
    assert!(books.is_empty());

    let res = repo.list_by_author(999).await;
    assert!(matches!(res, Err(Error::RecordNotFound(ref what)) if what == "Author"));
}

#[tokio::test]
async fn test_duplicate_author_email() {
    let conn = init_db().await;
    let repo = AuthorRepository::new(conn.clone());
    let res = repo
        .create(CreateAuthor {
            name: "Impostor".to_string(),
            birthdate: date!(1980 - 01 - 01),
            email: "jkrowling@books.com".to_string(),
        })
        .await;
    let err = res.unwrap_err();
    assert!(err.is_unique_violation());
    assert_eq!(count(&conn, "author").await, 2);
}

#[tokio::test]
async fn test_author_requires_name() {
    let conn = init_db().await;
    let repo = AuthorRepository::new(conn.clone());
    let res = repo
        .create(CreateAuthor {
            name: "".to_string(),
            birthdate: date!(1980 - 01 - 01),
            email: "empty@books.com".to_string(),
        })
        .await;
    assert!(matches!(res, Err(Error::InvalidEntity(_))));
    assert_eq!(count(&conn, "author").await, 2);
}

#[tokio::test]
async fn test_create_book() {
    let conn = init_db().await;
    let genres = GenreRepository::new(conn.clone()).list().await.unwrap();
    let repo = BookRepository::new(conn.clone());

    let book = repo
        .create(CreateBook {
            title: "A Clash of Kings".to_string(),
            description: "Second book of the saga.".to_string(),
            publication_year: 1998,
            author_id: 2,
            genre_ids: genres.iter().map(|g| g.id).collect(),
        })
        .await
        .unwrap();
    assert_eq!(book.author.as_ref().unwrap().name, "George R.R. Martin");
    assert_eq!(book.genres.as_ref().unwrap().len(), 2);

    let all = repo.list().await.unwrap();
    let listed = all.iter().find(|b| b.id == book.id).unwrap();
    assert_eq!(listed, &book);
}

#[tokio::test]
async fn test_create_book_unknown_genre_rolls_back() {
    let conn = init_db().await;
    let repo = BookRepository::new(conn.clone());

    let res = repo
        .create(CreateBook {
            title: "Orphan".to_string(),
            description: "Should not survive.".to_string(),
            publication_year: 2000,
            author_id: 1,
            genre_ids: vec![1, 42],
        })
        .await;
    assert!(matches!(
        res,
        Err(Error::UnknownGenres {
            requested: 2,
            found: 1
        })
    ));
    assert_eq!(count(&conn, "book").await, 2);
    assert_eq!(count(&conn, "book_genres").await, 3);
}

#[tokio::test]
async fn test_create_book_unknown_author() {
    let conn = init_db().await;
    let repo = BookRepository::new(conn.clone());

    let res = repo
        .create(CreateBook {
            title: "Ghost written".to_string(),
            description: "No author.".to_string(),
            publication_year: 2000,
            author_id: 77,
            genre_ids: vec![1],
        })
        .await;
    assert!(matches!(res, Err(Error::RecordNotFound(ref what)) if what == "Author"));
    assert_eq!(count(&conn, "book").await, 2);
}

#[tokio::test]
async fn test_set_genres_replaces_associations() {
    let conn = init_db().await;
    let repo = BookRepository::new(conn.clone());

    let book = repo.set_genres(2, &[2]).await.unwrap();
    let genres = book.genres.unwrap();
    assert_eq!(genres.len(), 1);
    assert_eq!(genres[0].name, "Drama");

    let book = repo.set_genres(2, &[]).await.unwrap();
    assert!(book.genres.unwrap().is_empty());

    let res = repo.set_genres(1, &[1, 3]).await;
    assert!(matches!(res, Err(Error::UnknownGenres { .. })));
    let book = repo.get(1).await.unwrap();
    assert_eq!(book.genres.unwrap().len(), 1);
}

#[tokio::test]
async fn test_authors_by_genre() {
    let conn = init_db().await;
    let repo = AuthorRepository::new(conn);

    let fantasy = repo.list_by_genre(1).await.unwrap();
    assert_eq!(fantasy.len(), 2);

    let drama = repo.list_by_genre(2).await.unwrap();
    assert_eq!(drama.len(), 1);
    assert_eq!(drama[0].name, "George R.R. Martin");

    let res = repo.list_by_genre(5).await;
    assert!(matches!(res, Err(Error::RecordNotFound(_))));
}
