//! Custom error types for the common library
//!
//! This module defines the error types shared by the services: storage
//! failures, authorization denials, role catalogue problems and hierarchy
//! traversal failures.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Reasons an identity can be refused access.
///
/// The HTTP layers flatten these into 401/403/400 responses, but every denial
/// keeps its own variant so logs and tests can tell them apart.
#[derive(Error, Debug)]
pub enum AccessError {
    /// No identity, or a credential that could not be verified
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated, but none of the required permissions is held
    #[error("Access denied. Insufficient permissions.")]
    InsufficientPermissions,

    /// Authenticated and permitted, but the target resource is outside the
    /// identity's scope (team, department or self)
    #[error("{0}")]
    OutOfScope(String),

    /// The role referenced by an identity does not exist
    #[error("Role not found: {0}")]
    RoleNotFound(String),

    /// Every field of an edit request was removed by the scope's field filter
    #[error("No editable fields provided")]
    NoEditableFields,

    /// Malformed or incomplete input
    #[error("{0}")]
    Validation(String),

    /// Storage lookup failed while evaluating access
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Type alias for Result with AccessError
pub type AccessResult<T> = Result<T, AccessError>;

/// Problems found in a role catalogue before it is stored.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RoleDefinitionError {
    /// A role inherits from an id that is not part of the catalogue
    #[error("Role '{role}' inherits from unknown role '{parent}'")]
    UnknownParent { role: String, parent: String },

    /// The inherits-from graph loops back on itself
    #[error("Role inheritance cycle: {}", .0.join(" -> "))]
    InheritanceCycle(Vec<String>),
}

/// Failures while walking the reporting hierarchy.
#[derive(Error, Debug)]
pub enum HierarchyError {
    /// Manager links loop back to an employee already on the chain
    #[error("Manager cycle detected at employee {0}")]
    ManagerCycle(String),

    /// Storage lookup failed during the walk
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
