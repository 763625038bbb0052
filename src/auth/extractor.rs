use axum::{extract::FromRequestParts, http::request::Parts};
use std::future::{ready, Future};
use uuid::Uuid;

use crate::auth::models::Claims;
use crate::error::AppError;

// Wrapper type for Claims that implements FromRequestParts
pub struct AuthenticatedUser(pub Claims);

impl AuthenticatedUser {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.0.sub).map_err(|_| {
            tracing::warn!(sub = %self.0.sub, "Token carries an invalid user ID");
            AppError::Validation("Invalid user ID".into())
        })
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let result = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or_else(|| AppError::Unauthorized("No authentication information".into()));
        ready(result)
    }
}
