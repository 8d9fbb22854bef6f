//! Application state shared across handlers

use common::{identity::Authenticator, rate_limit::ClientRateLimiter};

use crate::repositories::{DepartmentRepository, DocumentRepository, EmployeeRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Authenticator,
    pub employees: EmployeeRepository,
    pub departments: DepartmentRepository,
    pub documents: DocumentRepository,
    pub rate_limiter: ClientRateLimiter,
}
