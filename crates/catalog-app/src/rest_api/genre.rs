use axum::{extract::Path, response::IntoResponse, routing::get, Json};
use catalog_dal::author::AuthorRepository;
use http::StatusCode;

use crate::{
    error::{ApiResult, DalResultExt as _, INTERNAL_ERROR},
    extract::Checked,
    rest_api::author::AuthorList,
    state::AppState,
};

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/genres/{genre_id}/authors", tag = "Genre", operation_id = "listGenreAuthors",
    params(("genre_id" = i64, Path, description = "Genre id")),
    responses((status = StatusCode::OK, description = "Distinct authors of books in the genre", body = AuthorList),
    (status = StatusCode::NOT_FOUND, description = "Unknown genre", body = crate::error::ErrorBody))))]
pub async fn list_authors(
    Checked(Path(genre_id)): Checked<Path<i64>>,
    repository: AuthorRepository,
) -> ApiResult<impl IntoResponse> {
    let authors = repository
        .list_by_genre(genre_id)
        .await
        .or_api_error(INTERNAL_ERROR)?;
    Ok((StatusCode::OK, Json(AuthorList { authors })))
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/genres/{genre_id}/authors", get(list_authors))
}

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    #[derive(utoipa::OpenApi)]
    #[openapi(paths(list_authors))]
    struct ApiDocs;
    ApiDocs::openapi()
}
