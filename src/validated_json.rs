//! Axum extractor for validated request data

use crate::error::DashboardError;

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Json},
    http::Request,
};
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::Validate;

/// JSON request data that has been deserialised and then checked with [Validate].
///
/// Rejections are returned as [DashboardError] and so render as a 400 response.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, B, Rejection = JsonRejection>,
    B: Send + 'static,
{
    type Rejection = DashboardError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                debug!("rejected request data: {rejection}");
                rejection
            })?;
        if let Err(errors) = value.validate() {
            debug!("invalid request data: {errors}");
            return Err(errors.into());
        }
        Ok(ValidatedJson(value))
    }
}
