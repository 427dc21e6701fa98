use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::Validate;

use crate::error::AppError;

/// JSON 请求体提取器：解析失败和校验失败都转成 `AppError`，
/// 统一返回 400 和 `{ success: false, error }`
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            debug!(error = %rejection, "rejected json body");
            AppError::BadRequest(rejection.body_text())
        })?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}
