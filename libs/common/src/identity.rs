//! Authenticated identity and its resolution from a bearer token
//!
//! The effective permission set is resolved once when the identity is built
//! and travels with the request; authorization checks never re-resolve it.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::{
    error::{AccessError, AccessResult},
    models::UserAccount,
    permission::{PermissionSet, SUPER_ADMIN_ROLE},
    roles::{RoleStore, effective_permissions},
    token::{Claims, TokenVerifier},
};

/// The authenticated principal of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: Uuid,
    pub employee_id: String,
    pub email: String,
    pub role: String,
    pub permissions: PermissionSet,
}

impl Identity {
    /// Super-admin role or global wildcard
    pub fn has_universal_access(&self) -> bool {
        self.role == SUPER_ADMIN_ROLE || self.permissions.is_global()
    }

    pub fn covers(&self, required: &str) -> bool {
        self.has_universal_access() || self.permissions.covers(required)
    }

    pub fn covers_any(&self, required: &[&str]) -> bool {
        self.has_universal_access() || self.permissions.covers_any(required)
    }

    pub fn is_self(&self, employee_id: &str) -> bool {
        self.employee_id == employee_id
    }

    /// Own records, or anyone's with `employees.view.all`
    pub fn can_view_records_of(&self, employee_id: &str) -> bool {
        self.is_self(employee_id) || self.covers("employees.view.all")
    }
}

/// Read access to login accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch an account by user id
    async fn find_account(&self, user_id: Uuid) -> Result<Option<UserAccount>>;
}

/// Turn verified claims into an identity.
///
/// The account must exist and be active, and its role must resolve. A role
/// that does not resolve is an authentication failure, never an empty grant.
pub async fn resolve_identity(
    claims: &Claims,
    users: &dyn UserStore,
    roles: &dyn RoleStore,
) -> AccessResult<Identity> {
    let account = users
        .find_account(claims.sub)
        .await?
        .filter(|account| account.is_active)
        .ok_or_else(|| AccessError::Unauthenticated("User not found or inactive.".to_string()))?;

    let permissions = match effective_permissions(roles, &account.role_id).await {
        Ok(permissions) => permissions,
        Err(AccessError::RoleNotFound(role_id)) => {
            warn!("User {} has unresolvable role {}", account.id, role_id);
            return Err(AccessError::Unauthenticated(format!(
                "Role '{}' could not be resolved.",
                role_id
            )));
        }
        Err(e) => return Err(e),
    };

    Ok(Identity {
        id: account.id,
        employee_id: account.employee_id,
        email: account.email,
        role: account.role_id,
        permissions,
    })
}

/// Verifies bearer tokens and resolves them into identities
#[derive(Clone)]
pub struct Authenticator {
    verifier: TokenVerifier,
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
}

impl Authenticator {
    pub fn new(
        verifier: TokenVerifier,
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
    ) -> Self {
        Self {
            verifier,
            users,
            roles,
        }
    }

    /// Authenticate a raw bearer token
    pub async fn authenticate(&self, token: &str) -> AccessResult<Identity> {
        let claims = self.verifier.verify(token).map_err(|e| {
            warn!("Failed to validate token: {}", e);
            AccessError::Unauthenticated("Invalid token.".to_string())
        })?;

        resolve_identity(&claims, self.users.as_ref(), self.roles.as_ref()).await
    }
}
