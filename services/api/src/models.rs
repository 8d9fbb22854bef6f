//! Request and response shapes of the HR API

use common::{
    hierarchy::HierarchyNode,
    models::{Department, Employee, EmployeeSnapshot, EmployeeStatus},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const SEARCH_LIMIT: i64 = 50;

/// Query string of the employee list
#[derive(Debug, Default, Deserialize)]
pub struct EmployeeListQuery {
    pub department: Option<String>,
    pub status: Option<EmployeeStatus>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl EmployeeListQuery {
    /// Page number and size, clamped to sane bounds
    pub fn page_window(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (page, limit)
    }
}

/// Which employees a list request may see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    All,
    ReportsOf(String),
    Department(String),
    /// Just the one employee
    Only(String),
}

/// Resolved employee list filter
#[derive(Debug, Clone)]
pub struct EmployeeFilter {
    pub scope: ListScope,
    pub department: Option<String>,
    pub status: Option<EmployeeStatus>,
    pub search: Option<String>,
    pub page: i64,
    pub limit: i64,
}

impl EmployeeFilter {
    /// Rows to skip; saturates for absurdly large pages
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        Self {
            page,
            limit,
            total,
            pages: (total + limit - 1) / limit,
        }
    }
}

/// Paged employee list response
#[derive(Debug, Serialize)]
pub struct EmployeeListResponse {
    pub success: bool,
    pub data: Vec<Employee>,
    pub pagination: Pagination,
}

/// Manager candidate of a department
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerEntry {
    pub id: String,
    pub name: String,
    pub position: String,
    pub role_id: Option<String>,
}

/// Query string of the organization search
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
    pub position: Option<String>,
}

/// Organization structure read model
#[derive(Debug, Serialize)]
pub struct OrganizationStructure {
    pub hierarchy: Vec<HierarchyNode>,
    pub departments: Vec<Department>,
    pub employees: Vec<EmployeeSnapshot>,
}

/// Department member with its manager's name
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentMember {
    #[serde(flatten)]
    pub employee: EmployeeSnapshot,
    pub manager_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DepartmentDetails {
    pub department: Department,
    pub employees: Vec<DepartmentMember>,
}

/// Uploaded employee document with its owner's name
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDocument {
    pub id: Uuid,
    pub employee_id: String,
    pub document_type: String,
    pub file_name: String,
    pub original_name: String,
    pub mime_type: String,
    pub file_size: i64,
    pub file_path: String,
    pub status: String,
    pub uploaded_at: DateTime<Utc>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub comments: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window_defaults_and_bounds() {
        assert_eq!(EmployeeListQuery::default().page_window(), (1, 10));

        let query = EmployeeListQuery {
            page: Some(0),
            limit: Some(500),
            ..Default::default()
        };
        assert_eq!(query.page_window(), (1, MAX_PAGE_SIZE));
    }

    #[test]
    fn test_pagination_rounds_pages_up() {
        assert_eq!(Pagination::new(1, 10, 0).pages, 0);
        assert_eq!(Pagination::new(1, 10, 10).pages, 1);
        assert_eq!(Pagination::new(2, 10, 21).pages, 3);
    }

    #[test]
    fn test_filter_offset() {
        let filter = EmployeeFilter {
            scope: ListScope::All,
            department: None,
            status: None,
            search: None,
            page: 3,
            limit: 20,
        };
        assert_eq!(filter.offset(), 40);
    }

    #[test]
    fn test_huge_page_does_not_overflow_offset() {
        let query: EmployeeListQuery =
            serde_json::from_value(serde_json::json!({ "page": i64::MAX, "limit": 100 }))
                .expect("valid");
        let (page, limit) = query.page_window();

        let filter = EmployeeFilter {
            scope: ListScope::All,
            department: None,
            status: None,
            search: None,
            page,
            limit,
        };
        assert_eq!(filter.offset(), i64::MAX);
        assert!(filter.offset() >= 0);
    }

    #[test]
    fn test_list_query_parses_status_text() {
        let query: EmployeeListQuery =
            serde_json::from_value(serde_json::json!({ "status": "On Leave" })).expect("valid");
        assert_eq!(query.status, Some(EmployeeStatus::OnLeave));
    }
}
