//! Application state shared across handlers

use common::{identity::Authenticator, rate_limit::ClientRateLimiter, roles::RoleStore};
use std::sync::Arc;

use crate::{jwt::JwtService, repositories::CredentialRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub jwt_service: JwtService,
    pub authenticator: Authenticator,
    pub credentials: CredentialRepository,
    pub roles: Arc<dyn RoleStore>,
    pub rate_limiter: ClientRateLimiter,
}
