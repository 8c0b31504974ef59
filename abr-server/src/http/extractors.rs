//! Custom Axum extractors

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use crate::models::{PageName, UserId};

/// Extract and validate `/users/{user_id}/tab-orders/{page}`
pub struct TabOrderPath {
    pub user: UserId,
    pub page: PageName,
}

impl<S> FromRequestParts<S> for TabOrderPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((user, page)): Path<(String, String)> = Path::from_request_parts(parts, state)
            .await
            .map_err(|rejection: PathRejection| ApiError::BadRequest {
                message: rejection.body_text(),
            })?;

        Ok(Self {
            user: UserId::new(&user)?,
            page: PageName::new(&page)?,
        })
    }
}

/// `Json` whose rejection is rendered as an `ApiError` body
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::BadRequest {
                message: rejection.body_text(),
            })?;
        Ok(Self(value))
    }
}
