pub mod author;
pub mod book;
pub mod genre;
pub mod seed;

use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Plain confirmation returned by operations without other payload
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Message {
            message: message.into(),
        }
    }
}

/// Treats empty strings as missing values, as clients send them for blank form fields.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .merge(seed::router())
        .merge(book::router())
        .merge(author::router())
        .merge(genre::router())
}

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    seed::api_docs()
        .merge_from(book::api_docs())
        .merge_from(author::api_docs())
        .merge_from(genre::api_docs())
}
