//! Role resolution and the built-in role catalogue
//!
//! A role's effective permissions are its own permission list unioned with
//! the lists of the roles it directly inherits from. Inheritance is resolved
//! one level deep: a parent's own parents are not followed.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::{
    error::{AccessError, AccessResult, RoleDefinitionError},
    models::Role,
    permission::{GLOBAL_WILDCARD, PermissionSet, SUPER_ADMIN_ROLE},
};

pub const HR_ADMIN_ROLE: &str = "hr-admin";
pub const HR_SPECIALIST_ROLE: &str = "hr-specialist";
pub const DEPARTMENT_HEAD_ROLE: &str = "department-head";
pub const MANAGER_ROLE: &str = "manager";
pub const EMPLOYEE_ROLE: &str = "employee";

/// Read access to role records
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Fetch a role by id
    async fn find_role(&self, role_id: &str) -> Result<Option<Role>>;
}

/// Compute the deduplicated effective permission set of a role.
///
/// Fails with [`AccessError::RoleNotFound`] when `role_id` does not resolve.
/// A parent id that does not resolve contributes nothing.
pub async fn effective_permissions(
    store: &dyn RoleStore,
    role_id: &str,
) -> AccessResult<PermissionSet> {
    let role = store
        .find_role(role_id)
        .await?
        .ok_or_else(|| AccessError::RoleNotFound(role_id.to_string()))?;

    let mut permissions: PermissionSet = role.permissions.into_iter().collect();

    for parent_id in &role.inherits_from {
        match store.find_role(parent_id).await? {
            Some(parent) => permissions.extend(parent.permissions),
            None => warn!("Role {} inherits from missing role {}", role_id, parent_id),
        }
    }

    Ok(permissions)
}

/// Check a role catalogue before it is stored: every parent must exist and
/// the inherits-from graph must be acyclic.
pub fn validate_role_definitions(roles: &[Role]) -> Result<(), RoleDefinitionError> {
    let by_id: HashMap<&str, &Role> = roles.iter().map(|role| (role.id.as_str(), role)).collect();

    for role in roles {
        for parent in &role.inherits_from {
            if !by_id.contains_key(parent.as_str()) {
                return Err(RoleDefinitionError::UnknownParent {
                    role: role.id.clone(),
                    parent: parent.clone(),
                });
            }
        }
    }

    let mut done: HashSet<&str> = HashSet::new();
    for role in roles {
        let mut path = Vec::new();
        visit_role(role.id.as_str(), &by_id, &mut path, &mut done)?;
    }

    Ok(())
}

fn visit_role<'a>(
    id: &'a str,
    by_id: &HashMap<&'a str, &'a Role>,
    path: &mut Vec<&'a str>,
    done: &mut HashSet<&'a str>,
) -> Result<(), RoleDefinitionError> {
    if done.contains(id) {
        return Ok(());
    }

    if let Some(start) = path.iter().position(|on_path| *on_path == id) {
        let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
        cycle.push(id.to_string());
        return Err(RoleDefinitionError::InheritanceCycle(cycle));
    }

    path.push(id);
    if let Some(&role) = by_id.get(id) {
        for parent in &role.inherits_from {
            visit_role(parent.as_str(), by_id, path, done)?;
        }
    }
    path.pop();
    done.insert(id);

    Ok(())
}

/// Coarse classification of role ids used by the resource scope rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleTier {
    SuperAdmin,
    HrAdmin,
    HrSpecialist,
    DepartmentHead,
    Manager,
    Other,
}

impl RoleTier {
    pub fn from_role_id(role_id: &str) -> Self {
        match role_id {
            SUPER_ADMIN_ROLE => RoleTier::SuperAdmin,
            HR_ADMIN_ROLE => RoleTier::HrAdmin,
            HR_SPECIALIST_ROLE => RoleTier::HrSpecialist,
            DEPARTMENT_HEAD_ROLE => RoleTier::DepartmentHead,
            MANAGER_ROLE => RoleTier::Manager,
            _ => RoleTier::Other,
        }
    }
}

fn role(id: &str, name: &str, level: i32, permissions: &[&str], inherits_from: &[&str]) -> Role {
    Role {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        level,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        inherits_from: inherits_from.iter().map(|p| p.to_string()).collect(),
    }
}

/// The role catalogue seeded into a fresh database.
///
/// Inheritance is one level deep, so roles that need the permissions of a
/// grandparent list it as a direct parent.
pub fn default_roles() -> Vec<Role> {
    vec![
        role(SUPER_ADMIN_ROLE, "Super Administrator", 100, &[GLOBAL_WILDCARD], &[]),
        role(
            HR_ADMIN_ROLE,
            "HR Administrator",
            90,
            &["employees.*", "users.manage", "organization.*"],
            &[HR_SPECIALIST_ROLE, EMPLOYEE_ROLE],
        ),
        role(
            HR_SPECIALIST_ROLE,
            "HR Specialist",
            70,
            &["employees.view.all", "employees.create", "organization.view"],
            &[EMPLOYEE_ROLE],
        ),
        role(
            DEPARTMENT_HEAD_ROLE,
            "Department Head",
            60,
            &["employees.view.department", "organization.view"],
            &[MANAGER_ROLE, EMPLOYEE_ROLE],
        ),
        role(
            MANAGER_ROLE,
            "Manager",
            50,
            &["employees.view.all", "employees.view.team", "employees.edit.team"],
            &[EMPLOYEE_ROLE],
        ),
        role(
            EMPLOYEE_ROLE,
            "Employee",
            10,
            &["employees.view.self", "employees.edit.self"],
            &[],
        ),
    ]
}
