use catalog_dal::author::{Author, AuthorRepository, CreateAuthor};
use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date};

use crate::{error::ApiError, rest_api::non_empty, state::AppState};
#[allow(unused_imports)]
use axum::routing::{get, post};

crate::repository_from_request!(AuthorRepository);

/// Authors wrapped under the `Author` key
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuthorList {
    #[serde(rename = "Author")]
    pub authors: Vec<Author>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct CreateAuthorParams {
    pub name: Option<String>,
    /// date as YYYY-MM-DD
    pub birthdate: Option<String>,
    pub email: Option<String>,
}

impl TryFrom<CreateAuthorParams> for CreateAuthor {
    type Error = ApiError;

    fn try_from(value: CreateAuthorParams) -> Result<Self, Self::Error> {
        let (Some(name), Some(birthdate), Some(email)) = (
            non_empty(value.name),
            non_empty(value.birthdate),
            non_empty(value.email),
        ) else {
            return Err(ApiError::InvalidRequest(
                "name, email, birthdate required.".to_string(),
            ));
        };
        let birthdate = Date::parse(birthdate.trim(), format_description!("[year]-[month]-[day]"))
            .map_err(|e| {
                ApiError::InvalidRequest(format!("Invalid birthdate, expected YYYY-MM-DD: {e}"))
            })?;
        Ok(CreateAuthor {
            name,
            birthdate,
            email,
        })
    }
}

mod crud_api {
    use super::*;
    use crate::error::{ApiResult, DalResultExt as _, INTERNAL_ERROR};
    use crate::extract::Checked;
    use axum::{extract::Query, response::IntoResponse, Json};
    use http::StatusCode;
    use tracing::debug;

    #[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/author", tag = "Author", operation_id = "listAuthors",
        responses((status = StatusCode::OK, description = "All authors", body = AuthorList))))]
    pub async fn list(repository: AuthorRepository) -> ApiResult<impl IntoResponse> {
        let authors = repository.list().await.or_api_error(INTERNAL_ERROR)?;
        Ok((StatusCode::OK, Json(AuthorList { authors })))
    }

    #[cfg_attr(feature = "openapi",  utoipa::path(post, path = "/author/new", tag = "Author", operation_id = "createAuthor",
        params(CreateAuthorParams),
        responses((status = StatusCode::CREATED, description = "Created Author", body = Author),
        (status = StatusCode::BAD_REQUEST, description = "Missing or malformed fields", body = crate::error::ErrorBody))))]
    pub async fn create(
        repository: AuthorRepository,
        Checked(Query(params)): Checked<Query<CreateAuthorParams>>,
    ) -> ApiResult<impl IntoResponse> {
        debug!("Create author request: {params:?}");
        let payload = CreateAuthor::try_from(params)?;
        let record = repository
            .create(payload)
            .await
            .or_api_error(INTERNAL_ERROR)?;
        Ok((StatusCode::CREATED, Json(record)))
    }

    #[cfg(feature = "openapi")]
    #[derive(utoipa::OpenApi)]
    #[openapi(paths(list, create))]
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
        .route("/author", get(crud_api::list))
        .route("/author/new", post(crud_api::create))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(name: Option<&str>, birthdate: Option<&str>, email: Option<&str>) -> CreateAuthorParams {
        CreateAuthorParams {
            name: name.map(String::from),
            birthdate: birthdate.map(String::from),
            email: email.map(String::from),
        }
    }

    #[test]
    fn test_valid_params() {
        let author =
            CreateAuthor::try_from(params(Some("Ann"), Some("1980-02-29"), Some("ann@x.org")))
                .unwrap();
        assert_eq!(author.birthdate, time::macros::date!(1980 - 02 - 29));
    }

    #[test]
    fn test_missing_params() {
        for p in [
            params(None, Some("1980-01-01"), Some("ann@x.org")),
            params(Some("Ann"), None, Some("ann@x.org")),
            params(Some("Ann"), Some("1980-01-01"), Some("")),
        ] {
            let err = CreateAuthor::try_from(p).unwrap_err();
            assert_eq!(err.to_string(), "name, email, birthdate required.");
        }
    }

    #[test]
    fn test_bad_birthdate() {
        let err = CreateAuthor::try_from(params(Some("Ann"), Some("yesterday"), Some("a@b.c")))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }
}
