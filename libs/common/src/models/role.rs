//! Role model

use serde::{Deserialize, Serialize};

/// Role entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Informational rank, higher is more senior
    pub level: i32,
    pub permissions: Vec<String>,
    /// Parent role ids whose permissions are unioned in (one level only)
    #[serde(default)]
    pub inherits_from: Vec<String>,
}
