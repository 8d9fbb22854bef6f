//! Permission strings and coverage checks
//!
//! Permissions are dot-delimited tokens of the form `resource.action`, where
//! the action part may itself contain dots (`employees.view.all`). A held
//! `resource.*` covers every action on that resource, and the global
//! `system.*` covers everything.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Role id that is granted every permission regardless of its permission list
pub const SUPER_ADMIN_ROLE: &str = "super-admin";

/// Permission that is granted every permission
pub const GLOBAL_WILDCARD: &str = "system.*";

/// Build the `resource.*` wildcard that covers `required`.
pub fn resource_wildcard(required: &str) -> String {
    let resource = required
        .split_once('.')
        .map_or(required, |(resource, _)| resource);
    format!("{resource}.*")
}

/// A deduplicated set of held permission strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    /// Create an empty permission set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a permission, returning false when it was already held
    pub fn insert(&mut self, permission: impl Into<String>) -> bool {
        self.0.insert(permission.into())
    }

    /// Exact membership, without wildcard expansion
    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the set holds the global wildcard
    pub fn is_global(&self) -> bool {
        self.contains(GLOBAL_WILDCARD)
    }

    /// Whether the set grants `required`, either exactly, through the
    /// `resource.*` wildcard, or through the global wildcard.
    pub fn covers(&self, required: &str) -> bool {
        self.is_global() || self.contains(required) || self.contains(&resource_wildcard(required))
    }

    /// Whether the set grants at least one of `required`.
    ///
    /// This is a plain OR: an empty list is never covered. Callers that want
    /// "no requirement" semantics must handle the empty case themselves.
    pub fn covers_any(&self, required: &[&str]) -> bool {
        required.iter().any(|permission| self.covers(permission))
    }
}

impl Extend<String> for PermissionSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<String> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

impl IntoIterator for PermissionSet {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(permissions: &[&str]) -> PermissionSet {
        permissions.iter().copied().collect()
    }

    #[test]
    fn test_exact_match_covers() {
        let set = held(&["employees.view.self"]);
        assert!(set.covers("employees.view.self"));
        assert!(!set.covers("employees.view.all"));
    }

    #[test]
    fn test_resource_wildcard_covers_dotted_actions() {
        let set = held(&["employees.*"]);
        assert!(set.covers("employees.view.all"));
        assert!(set.covers("employees.create"));
        assert!(!set.covers("payroll.view"));
    }

    #[test]
    fn test_wildcard_is_built_from_first_segment() {
        assert_eq!(resource_wildcard("employees.view.all"), "employees.*");
        assert_eq!(resource_wildcard("reports"), "reports.*");
    }

    #[test]
    fn test_global_wildcard_covers_everything() {
        let set = held(&[GLOBAL_WILDCARD]);
        assert!(set.covers("payroll.process"));
        assert!(set.covers("anything"));
    }

    #[test]
    fn test_covers_any_is_logical_or() {
        let set = held(&["employees.view.self"]);
        assert!(set.covers_any(&["employees.view.all", "employees.view.self"]));
        assert!(!set.covers_any(&["employees.view.all", "employees.create"]));
    }

    #[test]
    fn test_covers_any_with_empty_requirement_is_false() {
        let set = held(&[GLOBAL_WILDCARD]);
        assert!(!set.covers_any(&[]));
    }

    #[test]
    fn test_duplicates_collapse() {
        let mut set = held(&["a.b", "a.b"]);
        assert_eq!(set.len(), 1);
        assert!(!set.insert("a.b"));
        assert!(set.insert("a.c"));
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let set = held(&["b.x", "a.y"]);
        let json = serde_json::to_value(&set).expect("serialize permission set");
        assert_eq!(json, serde_json::json!(["a.y", "b.x"]));
    }
}
