//! Request-time access decisions
//!
//! [`authorize`] answers "may this identity use this operation at all".
//! [`authorize_employee`] layers the resource scope on top: which employee
//! records the identity may view or edit, and which fields an edit may touch.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::{
    error::{AccessError, AccessResult},
    identity::Identity,
    models::{
        EmployeeUpdate,
        employee::{EmployeeField, MANAGER_EDITABLE_FIELDS, SELF_EDITABLE_FIELDS},
    },
    roles::RoleTier,
};

/// Why a request was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    InsufficientPermissions,
}

/// Outcome of an operation-level permission check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl From<DenyReason> for AccessError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthenticated => {
                AccessError::Unauthenticated("Authentication required.".to_string())
            }
            DenyReason::InsufficientPermissions => AccessError::InsufficientPermissions,
        }
    }
}

/// Check that an identity holds at least one of `required`.
///
/// An empty `required` list means no permission check was requested: any
/// authenticated identity is allowed.
pub fn authorize(identity: Option<&Identity>, required: &[&str]) -> Decision {
    let Some(identity) = identity else {
        return Decision::Deny(DenyReason::Unauthenticated);
    };

    if required.is_empty() || identity.covers_any(required) {
        Decision::Allow
    } else {
        info!(
            "Denied user {} ({}): requires one of {:?}",
            identity.id, identity.role, required
        );
        Decision::Deny(DenyReason::InsufficientPermissions)
    }
}

/// Same as [`authorize`], as a `Result`
pub fn require(identity: Option<&Identity>, required: &[&str]) -> AccessResult<()> {
    match authorize(identity, required) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => Err(reason.into()),
    }
}

/// Lookups the scope rules need about employees
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Manager id of an employee; `None` when the employee is unknown or has no manager
    async fn manager_of(&self, employee_id: &str) -> Result<Option<String>>;

    /// Department id of an employee; `None` when unknown or unassigned
    async fn department_of(&self, employee_id: &str) -> Result<Option<String>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeAction {
    View,
    Edit,
}

/// Which fields an edit may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAccess {
    All,
    Only(&'static [EmployeeField]),
}

impl FieldAccess {
    /// Project an update onto the allowed fields.
    ///
    /// A restricted update that loses every field is rejected with
    /// [`AccessError::NoEditableFields`].
    pub fn apply(&self, mut update: EmployeeUpdate) -> AccessResult<EmployeeUpdate> {
        if let FieldAccess::Only(allowed) = self {
            let removed = update.retain_fields(allowed);
            if !removed.is_empty() {
                info!("Stripped fields outside edit scope: {:?}", removed);
            }
            if update.is_empty() {
                return Err(AccessError::NoEditableFields);
            }
        }

        Ok(update)
    }
}

async fn is_direct_report(
    directory: &dyn EmployeeDirectory,
    target: &str,
    manager: &str,
) -> Result<bool> {
    Ok(directory.manager_of(target).await?.as_deref() == Some(manager))
}

async fn shares_department(
    directory: &dyn EmployeeDirectory,
    target: &str,
    actor: &str,
) -> Result<bool> {
    let Some(own) = directory.department_of(actor).await? else {
        return Ok(false);
    };
    Ok(directory.department_of(target).await?.as_deref() == Some(own.as_str()))
}

/// Decide whether `identity` may view or edit the employee `target`.
///
/// Returns the field access for the action; for views it is always
/// [`FieldAccess::All`].
pub async fn authorize_employee(
    identity: &Identity,
    target: &str,
    action: EmployeeAction,
    directory: &dyn EmployeeDirectory,
) -> AccessResult<FieldAccess> {
    let tier = if identity.has_universal_access() {
        RoleTier::SuperAdmin
    } else {
        RoleTier::from_role_id(&identity.role)
    };
    let own_record = identity.is_self(target);

    let denied = |message: &str| {
        info!(
            "Denied user {} ({}) {:?} on employee {}",
            identity.id, identity.role, action, target
        );
        Err(AccessError::OutOfScope(message.to_string()))
    };

    match (action, tier) {
        (_, RoleTier::SuperAdmin | RoleTier::HrAdmin) => Ok(FieldAccess::All),
        (EmployeeAction::View, RoleTier::HrSpecialist) => Ok(FieldAccess::All),
        (EmployeeAction::View, RoleTier::Manager) => {
            if own_record || is_direct_report(directory, target, &identity.employee_id).await? {
                Ok(FieldAccess::All)
            } else {
                denied("Access denied. Can only view team members.")
            }
        }
        (EmployeeAction::View, RoleTier::DepartmentHead) => {
            if own_record || shares_department(directory, target, &identity.employee_id).await? {
                Ok(FieldAccess::All)
            } else {
                denied("Access denied. Can only view department members.")
            }
        }
        (EmployeeAction::View, RoleTier::Other) => {
            if own_record {
                Ok(FieldAccess::All)
            } else {
                denied("Access denied. Can only view own profile.")
            }
        }
        (EmployeeAction::Edit, RoleTier::Manager) => {
            if own_record || is_direct_report(directory, target, &identity.employee_id).await? {
                Ok(FieldAccess::Only(MANAGER_EDITABLE_FIELDS))
            } else {
                denied("Access denied. Can only edit team members.")
            }
        }
        (EmployeeAction::Edit, _) => {
            if own_record {
                Ok(FieldAccess::Only(SELF_EDITABLE_FIELDS))
            } else {
                denied("Access denied. Can only edit own profile.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::PermissionSet;
    use serde_json::json;
    use std::collections::HashMap;
    use uuid::Uuid;

    /// employee id -> (manager id, department id)
    struct Directory(HashMap<&'static str, (Option<&'static str>, Option<&'static str>)>);

    #[async_trait]
    impl EmployeeDirectory for Directory {
        async fn manager_of(&self, employee_id: &str) -> Result<Option<String>> {
            Ok(self
                .0
                .get(employee_id)
                .and_then(|(manager, _)| manager.map(str::to_string)))
        }

        async fn department_of(&self, employee_id: &str) -> Result<Option<String>> {
            Ok(self
                .0
                .get(employee_id)
                .and_then(|(_, department)| department.map(str::to_string)))
        }
    }

    fn directory() -> Directory {
        Directory(HashMap::from([
            ("EMP001", (None, Some("exec"))),
            ("EMP002", (Some("EMP001"), Some("eng"))),
            ("EMP003", (Some("EMP002"), Some("eng"))),
            ("EMP004", (Some("EMP002"), Some("sales"))),
            ("EMP005", (Some("EMP001"), None)),
        ]))
    }

    fn identity(role: &str, employee_id: &str, permissions: &[&str]) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            employee_id: employee_id.to_string(),
            email: format!("{employee_id}@example.com"),
            role: role.to_string(),
            permissions: permissions.iter().copied().collect::<PermissionSet>(),
        }
    }

    #[test]
    fn test_missing_identity_is_unauthenticated() {
        assert_eq!(
            authorize(None, &["employees.view.all"]),
            Decision::Deny(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn test_super_admin_bypasses_permission_lists() {
        let admin = identity("super-admin", "EMP001", &[]);
        assert_eq!(authorize(Some(&admin), &["payroll.process"]), Decision::Allow);

        let global = identity("auditor", "EMP009", &["system.*"]);
        assert_eq!(authorize(Some(&global), &["payroll.process"]), Decision::Allow);
    }

    #[test]
    fn test_missing_permission_is_denied() {
        let employee = identity("employee", "EMP003", &["employees.view.self"]);
        assert_eq!(
            authorize(Some(&employee), &["employees.view.all"]),
            Decision::Deny(DenyReason::InsufficientPermissions)
        );
        assert!(matches!(
            require(Some(&employee), &["employees.create"]),
            Err(AccessError::InsufficientPermissions)
        ));
    }

    #[test]
    fn test_wildcard_permission_is_allowed() {
        let hr = identity("hr-admin", "EMP010", &["employees.*"]);
        assert_eq!(authorize(Some(&hr), &["employees.view.all"]), Decision::Allow);
    }

    #[test]
    fn test_empty_requirement_allows_any_authenticated_identity() {
        let employee = identity("employee", "EMP003", &[]);
        assert_eq!(authorize(Some(&employee), &[]), Decision::Allow);
        assert_eq!(authorize(None, &[]), Decision::Deny(DenyReason::Unauthenticated));
    }

    #[tokio::test]
    async fn test_manager_views_self_and_direct_reports_only() {
        let manager = identity("manager", "EMP002", &[]);
        let dir = directory();

        for target in ["EMP002", "EMP003", "EMP004"] {
            assert!(
                authorize_employee(&manager, target, EmployeeAction::View, &dir)
                    .await
                    .is_ok()
            );
        }

        let result = authorize_employee(&manager, "EMP001", EmployeeAction::View, &dir).await;
        assert!(matches!(result, Err(AccessError::OutOfScope(_))));
    }

    #[tokio::test]
    async fn test_department_head_views_own_department() {
        let head = identity("department-head", "EMP002", &[]);
        let dir = directory();

        assert!(
            authorize_employee(&head, "EMP003", EmployeeAction::View, &dir)
                .await
                .is_ok()
        );
        let result = authorize_employee(&head, "EMP004", EmployeeAction::View, &dir).await;
        assert!(matches!(result, Err(AccessError::OutOfScope(_))));
    }

    #[tokio::test]
    async fn test_department_head_without_department_sees_only_self() {
        let head = identity("department-head", "EMP005", &[]);
        let dir = directory();

        assert!(
            authorize_employee(&head, "EMP005", EmployeeAction::View, &dir)
                .await
                .is_ok()
        );
        assert!(
            authorize_employee(&head, "EMP003", EmployeeAction::View, &dir)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_hr_specialist_views_anyone_but_edits_only_self() {
        let specialist = identity("hr-specialist", "EMP004", &[]);
        let dir = directory();

        assert_eq!(
            authorize_employee(&specialist, "EMP001", EmployeeAction::View, &dir)
                .await
                .expect("view allowed"),
            FieldAccess::All
        );
        assert!(
            authorize_employee(&specialist, "EMP001", EmployeeAction::Edit, &dir)
                .await
                .is_err()
        );
        assert_eq!(
            authorize_employee(&specialist, "EMP004", EmployeeAction::Edit, &dir)
                .await
                .expect("self edit allowed"),
            FieldAccess::Only(SELF_EDITABLE_FIELDS)
        );
    }

    #[tokio::test]
    async fn test_other_roles_are_limited_to_self() {
        let employee = identity("employee", "EMP003", &[]);
        let dir = directory();

        assert!(
            authorize_employee(&employee, "EMP003", EmployeeAction::View, &dir)
                .await
                .is_ok()
        );
        assert!(
            authorize_employee(&employee, "EMP004", EmployeeAction::View, &dir)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_hr_admin_edits_any_field_of_anyone() {
        let hr = identity("hr-admin", "EMP010", &[]);
        let access = authorize_employee(&hr, "EMP003", EmployeeAction::Edit, &directory())
            .await
            .expect("edit allowed");

        let update: EmployeeUpdate =
            serde_json::from_value(json!({ "salary": 90000 })).expect("valid update");
        let update = access.apply(update).expect("salary allowed");
        assert_eq!(update.salary, Some(90000.0));
    }

    #[tokio::test]
    async fn test_manager_salary_edit_has_no_editable_fields() {
        let manager = identity("manager", "EMP002", &[]);
        let access = authorize_employee(&manager, "EMP003", EmployeeAction::Edit, &directory())
            .await
            .expect("team member is editable");

        let update: EmployeeUpdate =
            serde_json::from_value(json!({ "salary": 100000 })).expect("valid update");
        let result = access.apply(update);

        assert!(matches!(result, Err(AccessError::NoEditableFields)));
        assert_eq!(
            AccessError::NoEditableFields.to_string(),
            "No editable fields provided"
        );
    }

    #[tokio::test]
    async fn test_manager_edit_is_stripped_to_allowed_fields() {
        let manager = identity("manager", "EMP002", &[]);
        let access = authorize_employee(&manager, "EMP003", EmployeeAction::Edit, &directory())
            .await
            .expect("team member is editable");

        let update: EmployeeUpdate = serde_json::from_value(json!({
            "phone": "555-0100",
            "salary": 100000,
            "skills": ["rust"]
        }))
        .expect("valid update");
        let update = access.apply(update).expect("phone and skills remain");

        assert_eq!(
            update.fields(),
            vec![EmployeeField::Phone, EmployeeField::Skills]
        );
    }

    #[tokio::test]
    async fn test_manager_cannot_edit_outside_team() {
        let manager = identity("manager", "EMP002", &[]);
        let result =
            authorize_employee(&manager, "EMP005", EmployeeAction::Edit, &directory()).await;

        assert!(
            matches!(result, Err(AccessError::OutOfScope(message)) if message.contains("team members"))
        );
    }
}
