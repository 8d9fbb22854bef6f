//! Common library for the HRMS services
//!
//! This crate holds the access-control core shared by the authentication and
//! HR services: permission matching, role resolution, the request guard, the
//! organization hierarchy and reporting chains. It also carries the shared
//! models, database plumbing and token verification.

pub mod chain;
pub mod database;
pub mod error;
pub mod guard;
pub mod hierarchy;
pub mod identity;
pub mod models;
pub mod permission;
pub mod rate_limit;
pub mod repositories;
pub mod response;
pub mod roles;
pub mod settings;
pub mod token;

pub use error::{AccessError, AccessResult, DatabaseError, HierarchyError};
pub use identity::Identity;
pub use permission::PermissionSet;

/// Example usage of the access-control core
///
/// ```rust,no_run
/// use common::database::{DatabaseConfig, init_pool};
/// use common::guard::{Decision, authorize};
/// use common::identity::{Authenticator, Identity};
/// use common::repositories::{PgRoleRepository, PgUserRepository};
/// use common::token::TokenVerifier;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig::from_env()?;
///     let pool = init_pool(&config).await?;
///     let authenticator = Authenticator::new(
///         TokenVerifier::from_env()?,
///         Arc::new(PgUserRepository::new(pool.clone())),
///         Arc::new(PgRoleRepository::new(pool)),
///     );
///     let identity: Identity = authenticator.authenticate("token").await?;
///     assert_eq!(authorize(Some(&identity), &["employees.view.all"]), Decision::Allow);
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
