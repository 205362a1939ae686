use axum::{extract::State, response::IntoResponse, routing::get, Json};
use http::StatusCode;
use tracing::info;

use crate::{
    error::{ApiResult, DalResultExt as _},
    rest_api::Message,
    state::AppState,
};

#[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/seed_db", tag = "Seed", operation_id = "seedDb",
    responses((status = StatusCode::OK, description = "Database reset and filled with sample data", body = Message),
    (status = StatusCode::INTERNAL_SERVER_ERROR, description = "Seeding failed", body = crate::error::ErrorBody))))]
pub async fn seed_db(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let seeded = catalog_dal::seed::reset_and_seed(state.pool())
        .await
        .or_api_error("Database seeding failed!")?;
    info!(
        "Database seeded with {} authors, {} genres and {} books",
        seeded.authors.len(),
        seeded.genres.len(),
        seeded.book_ids.len()
    );
    Ok((
        StatusCode::OK,
        Json(Message::new("Database seeded successfully!")),
    ))
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/seed_db", get(seed_db))
}

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    use utoipa::OpenApi as _;
    #[derive(utoipa::OpenApi)]
    #[openapi(paths(seed_db))]
    struct ApiDocs;
    ApiDocs::openapi()
}
