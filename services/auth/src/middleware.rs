//! Middleware for bearer token authentication

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{error::AuthError, state::AppState};

/// Resolve the bearer token into an [`common::Identity`] and store it in the
/// request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or_else(|| {
        AuthError::Unauthorized("Access denied. No token provided.".to_string())
    })?;

    let identity = state.authenticator.authenticate(bearer.token()).await?;
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
