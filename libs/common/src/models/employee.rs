//! Employee model, snapshots and the typed partial update

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Employment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmployeeStatus {
    Active,
    Inactive,
    #[serde(rename = "Pending Onboarding")]
    PendingOnboarding,
    #[serde(rename = "On Leave")]
    OnLeave,
    Terminated,
}

/// Statuses that count as part of the live organization
pub const ORGANIZATION_STATUSES: [EmployeeStatus; 2] =
    [EmployeeStatus::Active, EmployeeStatus::PendingOnboarding];

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "Active",
            EmployeeStatus::Inactive => "Inactive",
            EmployeeStatus::PendingOnboarding => "Pending Onboarding",
            EmployeeStatus::OnLeave => "On Leave",
            EmployeeStatus::Terminated => "Terminated",
        }
    }

    /// Whether employees in this status appear in org charts and chains
    pub fn in_organization(&self) -> bool {
        ORGANIZATION_STATUSES.contains(self)
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown employee status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for EmployeeStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(EmployeeStatus::Active),
            "Inactive" => Ok(EmployeeStatus::Inactive),
            "Pending Onboarding" => Ok(EmployeeStatus::PendingOnboarding),
            "On Leave" => Ok(EmployeeStatus::OnLeave),
            "Terminated" => Ok(EmployeeStatus::Terminated),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub name: String,
    pub relationship: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub account_number: String,
    pub bank_name: String,
    pub ifsc_code: String,
    pub account_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub year: i32,
    #[serde(default)]
    pub grade: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    pub issue_date: String,
    #[serde(default)]
    pub expiry_date: Option<String>,
}

/// The slice of an employee record the hierarchy algorithms work on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSnapshot {
    pub id: String,
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub role_id: Option<String>,
    pub department_id: Option<String>,
    /// Joined department name, null when the department is missing
    pub department_name: Option<String>,
    pub manager_id: Option<String>,
    pub status: EmployeeStatus,
    pub hire_date: Option<NaiveDate>,
}

impl EmployeeSnapshot {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Full employee record as returned by the detail and list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<Address>,
    pub department_id: Option<String>,
    /// Joined department name
    pub department: Option<String>,
    pub position: String,
    pub role: Option<String>,
    pub manager_id: Option<String>,
    /// Joined manager full name
    pub manager_name: Option<String>,
    pub hire_date: NaiveDate,
    pub employment_type: String,
    pub salary: Option<f64>,
    pub status: EmployeeStatus,
    pub emergency_contact: Option<EmergencyContact>,
    pub bank_details: Option<BankDetails>,
    pub skills: Vec<String>,
    pub education: Vec<Education>,
    pub certifications: Vec<Certification>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New employee creation payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    pub department_id: String,
    pub position: String,
    #[serde(default)]
    pub role_id: Option<String>,
    pub hire_date: NaiveDate,
    pub employment_type: String,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub status: Option<EmployeeStatus>,
    #[serde(default)]
    pub manager_id: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

impl NewEmployee {
    /// Check the required text fields are not blank
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("departmentId", &self.department_id),
            ("position", &self.position),
            ("employmentType", &self.employment_type),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("Missing required fields: {}", missing.join(", ")))
        }
    }
}

/// Every field a partial update may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmployeeField {
    FirstName,
    LastName,
    Email,
    Phone,
    DateOfBirth,
    Gender,
    Address,
    DepartmentId,
    Position,
    RoleId,
    ManagerId,
    HireDate,
    EmploymentType,
    Salary,
    Status,
    EmergencyContact,
    BankDetails,
    Skills,
    Education,
    Certifications,
}

impl EmployeeField {
    /// Column backing the field
    pub fn column(&self) -> &'static str {
        match self {
            EmployeeField::FirstName => "first_name",
            EmployeeField::LastName => "last_name",
            EmployeeField::Email => "email",
            EmployeeField::Phone => "phone",
            EmployeeField::DateOfBirth => "date_of_birth",
            EmployeeField::Gender => "gender",
            EmployeeField::Address => "address",
            EmployeeField::DepartmentId => "department_id",
            EmployeeField::Position => "position",
            EmployeeField::RoleId => "role_id",
            EmployeeField::ManagerId => "manager_id",
            EmployeeField::HireDate => "hire_date",
            EmployeeField::EmploymentType => "employment_type",
            EmployeeField::Salary => "salary",
            EmployeeField::Status => "status",
            EmployeeField::EmergencyContact => "emergency_contact",
            EmployeeField::BankDetails => "bank_details",
            EmployeeField::Skills => "skills",
            EmployeeField::Education => "education",
            EmployeeField::Certifications => "certifications",
        }
    }
}

/// Fields a manager may change on a direct report or on themselves
pub const MANAGER_EDITABLE_FIELDS: &[EmployeeField] = &[
    EmployeeField::Phone,
    EmployeeField::Address,
    EmployeeField::EmergencyContact,
    EmployeeField::Skills,
    EmployeeField::Education,
    EmployeeField::Certifications,
];

/// Fields any employee may change on their own record
pub const SELF_EDITABLE_FIELDS: &[EmployeeField] = &[
    EmployeeField::Phone,
    EmployeeField::Address,
    EmployeeField::EmergencyContact,
    EmployeeField::BankDetails,
    EmployeeField::Skills,
    EmployeeField::Education,
    EmployeeField::Certifications,
];

/// Distinguishes an absent key (`None`) from an explicit null (`Some(None)`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial employee update.
///
/// Unknown keys are rejected at deserialization. For `phone`, `gender`,
/// `roleId` and `managerId` an explicit null clears the column.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EmployeeUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub gender: Option<Option<String>>,
    pub address: Option<Address>,
    pub department_id: Option<String>,
    pub position: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub role_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub manager_id: Option<Option<String>>,
    pub hire_date: Option<NaiveDate>,
    pub employment_type: Option<String>,
    pub salary: Option<f64>,
    pub status: Option<EmployeeStatus>,
    pub emergency_contact: Option<EmergencyContact>,
    pub bank_details: Option<BankDetails>,
    pub skills: Option<Vec<String>>,
    pub education: Option<Vec<Education>>,
    pub certifications: Option<Vec<Certification>>,
}

impl EmployeeUpdate {
    /// Fields present in the update, in column order
    pub fn fields(&self) -> Vec<EmployeeField> {
        let present = [
            (EmployeeField::FirstName, self.first_name.is_some()),
            (EmployeeField::LastName, self.last_name.is_some()),
            (EmployeeField::Email, self.email.is_some()),
            (EmployeeField::Phone, self.phone.is_some()),
            (EmployeeField::DateOfBirth, self.date_of_birth.is_some()),
            (EmployeeField::Gender, self.gender.is_some()),
            (EmployeeField::Address, self.address.is_some()),
            (EmployeeField::DepartmentId, self.department_id.is_some()),
            (EmployeeField::Position, self.position.is_some()),
            (EmployeeField::RoleId, self.role_id.is_some()),
            (EmployeeField::ManagerId, self.manager_id.is_some()),
            (EmployeeField::HireDate, self.hire_date.is_some()),
            (EmployeeField::EmploymentType, self.employment_type.is_some()),
            (EmployeeField::Salary, self.salary.is_some()),
            (EmployeeField::Status, self.status.is_some()),
            (EmployeeField::EmergencyContact, self.emergency_contact.is_some()),
            (EmployeeField::BankDetails, self.bank_details.is_some()),
            (EmployeeField::Skills, self.skills.is_some()),
            (EmployeeField::Education, self.education.is_some()),
            (EmployeeField::Certifications, self.certifications.is_some()),
        ];

        present
            .into_iter()
            .filter_map(|(field, is_set)| is_set.then_some(field))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Drop a field from the update
    pub fn clear(&mut self, field: EmployeeField) {
        match field {
            EmployeeField::FirstName => self.first_name = None,
            EmployeeField::LastName => self.last_name = None,
            EmployeeField::Email => self.email = None,
            EmployeeField::Phone => self.phone = None,
            EmployeeField::DateOfBirth => self.date_of_birth = None,
            EmployeeField::Gender => self.gender = None,
            EmployeeField::Address => self.address = None,
            EmployeeField::DepartmentId => self.department_id = None,
            EmployeeField::Position => self.position = None,
            EmployeeField::RoleId => self.role_id = None,
            EmployeeField::ManagerId => self.manager_id = None,
            EmployeeField::HireDate => self.hire_date = None,
            EmployeeField::EmploymentType => self.employment_type = None,
            EmployeeField::Salary => self.salary = None,
            EmployeeField::Status => self.status = None,
            EmployeeField::EmergencyContact => self.emergency_contact = None,
            EmployeeField::BankDetails => self.bank_details = None,
            EmployeeField::Skills => self.skills = None,
            EmployeeField::Education => self.education = None,
            EmployeeField::Certifications => self.certifications = None,
        }
    }

    /// Keep only the fields in `allowed`, returning the ones removed
    pub fn retain_fields(&mut self, allowed: &[EmployeeField]) -> Vec<EmployeeField> {
        let removed: Vec<EmployeeField> = self
            .fields()
            .into_iter()
            .filter(|field| !allowed.contains(field))
            .collect();

        for field in &removed {
            self.clear(*field);
        }

        removed
    }

    /// Turn empty strings on nullable columns into explicit nulls
    pub fn normalize(&mut self) {
        for slot in [
            &mut self.phone,
            &mut self.gender,
            &mut self.role_id,
            &mut self.manager_id,
        ] {
            if matches!(slot, Some(Some(value)) if value.trim().is_empty()) {
                *slot = Some(None);
            }
        }
    }

    /// The requested manager link, if the update changes it
    pub fn manager_change(&self) -> Option<Option<&str>> {
        self.manager_id.as_ref().map(|manager| manager.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_round_trips_through_text() {
        let status: EmployeeStatus = "Pending Onboarding".parse().expect("known status");
        assert_eq!(status, EmployeeStatus::PendingOnboarding);
        assert_eq!(status.as_str(), "Pending Onboarding");
        assert!("Retired".parse::<EmployeeStatus>().is_err());
    }

    #[test]
    fn test_only_active_and_onboarding_are_in_organization() {
        assert!(EmployeeStatus::Active.in_organization());
        assert!(EmployeeStatus::PendingOnboarding.in_organization());
        assert!(!EmployeeStatus::Inactive.in_organization());
        assert!(!EmployeeStatus::Terminated.in_organization());
    }

    #[test]
    fn test_update_rejects_unknown_keys() {
        let result = serde_json::from_value::<EmployeeUpdate>(json!({ "nickname": "Bob" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let update: EmployeeUpdate =
            serde_json::from_value(json!({ "managerId": null })).expect("valid update");
        assert_eq!(update.manager_id, Some(None));
        assert_eq!(update.phone, None);
        assert_eq!(update.fields(), vec![EmployeeField::ManagerId]);
        assert_eq!(update.manager_change(), Some(None));
    }

    #[test]
    fn test_retain_fields_strips_disallowed() {
        let mut update: EmployeeUpdate =
            serde_json::from_value(json!({ "phone": "555-0100", "salary": 100000 }))
                .expect("valid update");

        let removed = update.retain_fields(MANAGER_EDITABLE_FIELDS);

        assert_eq!(removed, vec![EmployeeField::Salary]);
        assert_eq!(update.fields(), vec![EmployeeField::Phone]);
        assert_eq!(update.salary, None);
    }

    #[test]
    fn test_normalize_turns_blank_strings_into_null() {
        let mut update: EmployeeUpdate =
            serde_json::from_value(json!({ "phone": "", "roleId": "manager", "managerId": " " }))
                .expect("valid update");

        update.normalize();

        assert_eq!(update.phone, Some(None));
        assert_eq!(update.role_id, Some(Some("manager".to_string())));
        assert_eq!(update.manager_id, Some(None));
    }

    #[test]
    fn test_new_employee_reports_blank_required_fields() {
        let employee: NewEmployee = serde_json::from_value(json!({
            "firstName": "Ada",
            "lastName": " ",
            "email": "ada@example.com",
            "departmentId": "",
            "position": "Engineer",
            "hireDate": "2024-01-15",
            "employmentType": "Full-time"
        }))
        .expect("valid payload");

        let error = employee.validate().expect_err("blank fields");
        assert_eq!(error, "Missing required fields: lastName, departmentId");
    }
}
