use catalog_dal::book::{Book, BookRepository, CreateBook};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, rest_api::non_empty, state::AppState};
#[allow(unused_imports)]
use axum::routing::{get, post};

crate::repository_from_request!(BookRepository);

/// Book payload as sent by clients, every field is checked for presence.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub publication_year: Option<i32>,
    pub author_id: Option<i64>,
    pub genre_ids: Option<Vec<i64>>,
}

impl TryFrom<CreateBookRequest> for CreateBook {
    type Error = ApiError;

    fn try_from(value: CreateBookRequest) -> Result<Self, Self::Error> {
        // zero counts as missing, empty genre list does not
        match (
            non_empty(value.title),
            non_empty(value.description),
            value.publication_year.filter(|y| *y != 0),
            value.author_id.filter(|id| *id != 0),
            value.genre_ids,
        ) {
            (
                Some(title),
                Some(description),
                Some(publication_year),
                Some(author_id),
                Some(genre_ids),
            ) => Ok(CreateBook {
                title,
                description,
                publication_year,
                author_id,
                genre_ids,
            }),
            _ => Err(ApiError::InvalidRequest("All fields are required".to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookCreated {
    pub message: String,
    pub book: Book,
}

mod crud_api {
    use super::*;
    use crate::error::{ApiResult, DalResultExt as _};
    use crate::extract::Checked;
    use axum::{extract::Path, response::IntoResponse, Json};
    use http::StatusCode;
    use tracing::debug;

    #[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/books", tag = "Book", operation_id = "listBooks",
        responses((status = StatusCode::OK, description = "All books with author and genres", body = Vec<Book>))))]
    pub async fn list(repository: BookRepository) -> ApiResult<impl IntoResponse> {
        let books = repository.list().await.or_api_error("Failed to fetch books")?;
        Ok((StatusCode::OK, Json(books)))
    }

    #[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/authors/{author_id}/books", tag = "Book", operation_id = "listAuthorBooks",
        params(("author_id" = i64, Path, description = "Author id")),
        responses((status = StatusCode::OK, description = "Books of the author with genres", body = Vec<Book>),
        (status = StatusCode::NOT_FOUND, description = "Unknown author or author without books", body = crate::error::ErrorBody))))]
    pub async fn list_by_author(
        Checked(Path(author_id)): Checked<Path<i64>>,
        repository: BookRepository,
    ) -> ApiResult<impl IntoResponse> {
        let books = repository
            .list_by_author(author_id)
            .await
            .or_api_error("Failed to fetch books by author")?;
        if books.is_empty() {
            return Err(ApiError::ResourceNotFound(
                "No books found for this author".to_string(),
            ));
        }
        Ok((StatusCode::OK, Json(books)))
    }

    #[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/genres/{genre_id}/books", tag = "Book", operation_id = "listGenreBooks",
        params(("genre_id" = i64, Path, description = "Genre id")),
        responses((status = StatusCode::OK, description = "Books in the genre", body = Vec<Book>),
        (status = StatusCode::NOT_FOUND, description = "Unknown genre", body = crate::error::ErrorBody))))]
    pub async fn list_by_genre(
        Checked(Path(genre_id)): Checked<Path<i64>>,
        repository: BookRepository,
    ) -> ApiResult<impl IntoResponse> {
        let books = repository
            .list_by_genre(genre_id)
            .await
            .or_api_error("Failed to fetch books by genre")?;
        Ok((StatusCode::OK, Json(books)))
    }

    #[cfg_attr(feature = "openapi",  utoipa::path(post, path = "/books", tag = "Book", operation_id = "createBook",
        request_body = CreateBookRequest,
        responses((status = StatusCode::CREATED, description = "Created Book", body = BookCreated),
        (status = StatusCode::BAD_REQUEST, description = "Missing fields or unknown genre", body = crate::error::ErrorBody),
        (status = StatusCode::NOT_FOUND, description = "Unknown author", body = crate::error::ErrorBody))))]
    pub async fn create(
        repository: BookRepository,
        Checked(Json(payload)): Checked<Json<CreateBookRequest>>,
    ) -> ApiResult<impl IntoResponse> {
        debug!("Create book request: {payload:?}");
        let payload = CreateBook::try_from(payload)?;
        let book = repository
            .create(payload)
            .await
            .or_api_error("Failed to add book")?;
        Ok((
            StatusCode::CREATED,
            Json(BookCreated {
                message: "Book created successfully!".to_string(),
                book,
            }),
        ))
    }

    #[cfg(feature = "openapi")]
    #[derive(utoipa::OpenApi)]
    #[openapi(paths(list, list_by_author, list_by_genre, create))]
    struct ApiDocs;

    #[cfg(feature = "openapi")]
    pub(super) fn api_docs() -> utoipa::openapi::OpenApi {
        use utoipa::OpenApi as _;
        ApiDocs::openapi()
    }
}

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    crud_api::api_docs()
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/books", get(crud_api::list).post(crud_api::create))
        .route("/authors/{author_id}/books", get(crud_api::list_by_author))
        .route("/genres/{genre_id}/books", get(crud_api::list_by_genre))
}
