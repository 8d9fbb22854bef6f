//! User account model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Login account linked to an employee record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: Uuid,
    pub employee_id: String,
    pub email: String,
    pub role_id: String,
    pub is_active: bool,
}
