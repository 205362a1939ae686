use axum::extract::{
    rejection::{JsonRejection, PathRejection, QueryRejection},
    FromRequest, FromRequestParts, Request,
};
use http::request::Parts;
use std::ops::{Deref, DerefMut};

use crate::error::ApiError;

/// Wraps axum extractors, so that their rejections are reported as [`ApiError`]
/// with the usual `{"error": ...}` body.
#[derive(Debug, Clone, Copy, Default)]
pub struct Checked<E>(pub E);

impl<E> Deref for Checked<E> {
    type Target = E;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<E> DerefMut for Checked<E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<E> Checked<E> {
    pub fn into_inner(self) -> E {
        self.0
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidRequest(format!("Invalid query: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidRequest(format!("Invalid path: {}", rejection.body_text()))
    }
}

impl<S, Extractor> FromRequest<S> for Checked<Extractor>
where
    S: Send + Sync,
    Extractor: FromRequest<S>,
    ApiError: From<<Extractor as FromRequest<S>>::Rejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let inner = Extractor::from_request(req, state).await?;
        Ok(Checked(inner))
    }
}

// Mirrors the impl above for extractors that only need request parts (Path, Query).
impl<S, Extractor> FromRequestParts<S> for Checked<Extractor>
where
    S: Send + Sync,
    Extractor: FromRequestParts<S>,
    ApiError: From<<Extractor as FromRequestParts<S>>::Rejection>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let inner = Extractor::from_request_parts(parts, state).await?;
        Ok(Checked(inner))
    }
}
