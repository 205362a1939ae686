use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

pub type Error = anyhow::Error;
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

type GenericError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub const INTERNAL_ERROR: &str = "Internal server error.";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    ResourceNotFound(String),
    /// Message goes to client, source is only logged
    #[error("{message}")]
    Internal {
        message: &'static str,
        #[source]
        source: GenericError,
    },
}

impl ApiError {
    pub fn internal<E>(message: &'static str, e: E) -> Self
    where
        E: Into<GenericError>,
    {
        ApiError::Internal {
            message,
            source: e.into(),
        }
    }

    /// Maps data layer error to response, storage failures are reported with given opaque `message`.
    pub fn from_dal(e: catalog_dal::Error, message: &'static str) -> Self {
        match e {
            catalog_dal::Error::RecordNotFound(what) => {
                ApiError::ResourceNotFound(format!("{what} not found"))
            }
            catalog_dal::Error::UnknownGenres { .. } => {
                ApiError::InvalidRequest("One or more genres not found".to_string())
            }
            catalog_dal::Error::InvalidEntity(report) => {
                ApiError::InvalidRequest(format!("Invalid input: {report}"))
            }
            e @ catalog_dal::Error::DatabaseError(_) => {
                if e.is_unique_violation() {
                    warn!("Write rejected by unique constraint: {e}");
                }
                ApiError::internal(message, e)
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<catalog_dal::Error> for ApiError {
    fn from(e: catalog_dal::Error) -> Self {
        ApiError::from_dal(e, INTERNAL_ERROR)
    }
}

pub trait DalResultExt<T> {
    fn or_api_error(self, message: &'static str) -> ApiResult<T>;
}

impl<T> DalResultExt<T> for std::result::Result<T, catalog_dal::Error> {
    fn or_api_error(self, message: &'static str) -> ApiResult<T> {
        self.map_err(|e| ApiError::from_dal(e, message))
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::Internal { message, source } => error!("{message}: {source}"),
            other => debug!("Request rejected with {status}: {other}"),
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
