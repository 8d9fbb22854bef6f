//! Authentication and permission middleware

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use common::{Identity, guard};

use crate::{error::ApiError, state::AppState};

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or_else(|| {
        ApiError::Unauthorized("Access denied. No token provided.".to_string())
    })?;

    let identity = state.authenticator.authenticate(bearer.token()).await?;
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Let the request through when its identity holds any of `required`
pub async fn permission_gate(
    required: &'static [&'static str],
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    guard::require(req.extensions().get::<Identity>(), required)?;
    Ok(next.run(req).await)
}

/// Guard a handler with [`permission_gate`]
pub fn gated<S>(route: MethodRouter<S>, required: &'static [&'static str]) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(middleware::from_fn(move |req: Request, next: Next| {
        permission_gate(required, req, next)
    }))
}
