use anyhow::Result;
use catalog_app::rest_api::{Message, author::AuthorList, book::BookCreated};
use catalog_dal::{author::Author, book::Book};
use reqwest::{StatusCode, Url};
use tracing::info;

pub async fn seed(client: &reqwest::Client, base_url: &Url) -> Result<Message> {
    let response = client.get(base_url.join("seed_db")?).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    let message: Message = response.json().await?;
    Ok(message)
}

pub async fn list_books(client: &reqwest::Client, base_url: &Url) -> Result<Vec<Book>> {
    let response = client.get(base_url.join("books")?).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    let books: Vec<Book> = response.json().await?;
    Ok(books)
}

pub async fn list_authors(client: &reqwest::Client, base_url: &Url) -> Result<Vec<Author>> {
    let response = client.get(base_url.join("author")?).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    let list: AuthorList = response.json().await?;
    Ok(list.authors)
}

pub async fn create_author(
    client: &reqwest::Client,
    base_url: &Url,
    name: &str,
    birthdate: &str,
    email: &str,
) -> Result<Author> {
    let api_url = base_url.join("author/new")?;
    let response = client
        .post(api_url)
        .query(&[("name", name), ("birthdate", birthdate), ("email", email)])
        .send()
        .await?;
    info!("Author response: {:#?}", response);
    assert_eq!(response.status(), StatusCode::CREATED);

    let new_author: Author = response.json().await?;
    Ok(new_author)
}

pub async fn create_book<T>(
    client: &reqwest::Client,
    base_url: &Url,
    payload: &T,
) -> Result<BookCreated>
where
    T: serde::Serialize,
{
    let api_url = base_url.join("books")?;
    let response = client.post(api_url).json(payload).send().await?;
    info!("Book response: {:#?}", response);
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response.text().await?;
    let created: BookCreated = serde_json::from_str(&body)?;
    Ok(created)
}
