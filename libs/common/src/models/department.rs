//! Department model

use serde::{Deserialize, Serialize};

/// Department entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Title of the heading position, informational only
    pub head_role: Option<String>,
    /// Employee heading the department
    pub head_employee_id: Option<String>,
    /// Joined from the head employee, null when unset
    pub head_name: Option<String>,
    pub budget: Option<f64>,
    pub location: Option<String>,
    pub functions: Vec<String>,
}
