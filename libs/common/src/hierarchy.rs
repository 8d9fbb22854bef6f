//! Organization forest built from manager links
//!
//! Nodes are assembled fresh on every call from employee snapshots; nothing
//! here is persisted or cached.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::{error::HierarchyError, models::EmployeeSnapshot};

/// Summary of a node's immediate manager
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagerSummary {
    pub id: String,
    pub name: String,
    pub position: String,
}

/// An employee with its direct reports
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyNode {
    #[serde(flatten)]
    pub employee: EmployeeSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<ManagerSummary>,
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    /// Number of nodes in this subtree, including this one
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

// Flatten before dropping so deep chains do not recurse
impl Drop for HierarchyNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Build the reporting forest.
///
/// Employees without a manager, or whose manager is not in `employees`, are
/// roots. Roots and children keep the input order. Employees sitting on a
/// manager cycle are unreachable from any root and are left out.
pub fn build_forest(employees: &[EmployeeSnapshot]) -> Vec<HierarchyNode> {
    let index: HashMap<&str, &EmployeeSnapshot> = employees
        .iter()
        .map(|employee| (employee.id.as_str(), employee))
        .collect();

    let mut children_of: HashMap<&str, Vec<&EmployeeSnapshot>> = HashMap::new();
    let mut roots = Vec::new();

    for employee in employees {
        match employee.manager_id.as_deref() {
            Some(manager_id) if index.contains_key(manager_id) => {
                children_of.entry(manager_id).or_default().push(employee);
            }
            _ => roots.push(employee),
        }
    }

    let forest: Vec<HierarchyNode> = roots
        .into_iter()
        .filter_map(|root| assemble(root, &children_of))
        .collect();

    let placed: usize = forest.iter().map(HierarchyNode::size).sum();
    if placed < employees.len() {
        let reachable = collect_ids(&forest);
        let stranded: Vec<&str> = employees
            .iter()
            .map(|employee| employee.id.as_str())
            .filter(|id| !reachable.contains(id))
            .collect();
        warn!("Manager cycle detected, leaving out of hierarchy: {:?}", stranded);
    }

    forest
}

struct Frame<'a> {
    employee: &'a EmployeeSnapshot,
    manager: Option<ManagerSummary>,
    reports: &'a [&'a EmployeeSnapshot],
    next: usize,
    children: Vec<HierarchyNode>,
}

impl<'a> Frame<'a> {
    fn new(
        employee: &'a EmployeeSnapshot,
        manager: Option<ManagerSummary>,
        children_of: &'a HashMap<&'a str, Vec<&'a EmployeeSnapshot>>,
    ) -> Self {
        let reports = children_of
            .get(employee.id.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();

        Self {
            employee,
            manager,
            reports,
            next: 0,
            children: Vec::with_capacity(reports.len()),
        }
    }

    fn summary(&self) -> ManagerSummary {
        ManagerSummary {
            id: self.employee.id.clone(),
            name: self.employee.full_name(),
            position: self.employee.position.clone(),
        }
    }
}

/// Depth-first assembly with an explicit stack of open nodes
fn assemble<'a>(
    root: &'a EmployeeSnapshot,
    children_of: &'a HashMap<&'a str, Vec<&'a EmployeeSnapshot>>,
) -> Option<HierarchyNode> {
    let mut stack = vec![Frame::new(root, None, children_of)];

    while let Some(top) = stack.last_mut() {
        if let Some(report) = top.reports.get(top.next).copied() {
            top.next += 1;
            let summary = top.summary();
            stack.push(Frame::new(report, Some(summary), children_of));
            continue;
        }

        let done = stack.pop()?;
        let node = HierarchyNode {
            employee: done.employee.clone(),
            manager: done.manager,
            children: done.children,
        };

        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => return Some(node),
        }
    }

    None
}

fn collect_ids<'a>(forest: &'a [HierarchyNode]) -> HashSet<&'a str> {
    let mut ids = HashSet::new();
    let mut stack: Vec<&HierarchyNode> = forest.iter().collect();
    while let Some(node) = stack.pop() {
        ids.insert(node.employee.id.as_str());
        stack.extend(node.children.iter());
    }
    ids
}

/// Find a cycle in a set of `(employee, manager)` links.
///
/// Returns the employee ids on the first cycle found, starting and ending
/// with the same id.
pub fn find_manager_cycle<'a, I>(links: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let links: Vec<(&str, Option<&str>)> = links.into_iter().collect();
    let manager_of: HashMap<&str, Option<&str>> = links.iter().copied().collect();
    let mut settled: HashSet<&str> = HashSet::new();

    for (start, _) in &links {
        let mut path: Vec<&str> = Vec::new();
        let mut on_path: HashSet<&str> = HashSet::new();
        let mut current = Some(*start);

        while let Some(id) = current {
            if settled.contains(id) {
                break;
            }
            if on_path.contains(id) {
                let begin = path.iter().position(|p| *p == id).unwrap_or(0);
                let mut cycle: Vec<String> = path[begin..].iter().map(|p| p.to_string()).collect();
                cycle.push(id.to_string());
                return Some(cycle);
            }
            path.push(id);
            on_path.insert(id);
            current = manager_of.get(id).copied().flatten();
        }

        settled.extend(path);
    }

    None
}

/// Check that pointing `employee_id` at `new_manager` keeps the manager links acyclic.
pub fn ensure_acyclic_change<'a, I>(
    links: I,
    employee_id: &'a str,
    new_manager: Option<&'a str>,
) -> Result<(), HierarchyError>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let changed = links
        .into_iter()
        .filter(|(id, _)| *id != employee_id)
        .chain(std::iter::once((employee_id, new_manager)));

    match find_manager_cycle(changed) {
        Some(cycle) => Err(HierarchyError::ManagerCycle(cycle.join(" -> "))),
        None => Ok(()),
    }
}

/// Position titles eligible as department managers
pub const MANAGERIAL_POSITIONS: &[&str] = &[
    "CEO",
    "VP of Engineering",
    "VP of Product",
    "VP of Sales",
    "HR Director",
    "CFO",
    "Engineering Director",
    "HR Manager",
    "Payroll Manager",
    "Finance Manager",
    "Team Lead",
];

/// Seniority rank of a position title, 1 is most senior
pub fn position_rank(position: &str) -> u8 {
    match position {
        "CEO" => 1,
        p if p.starts_with("VP") => 2,
        p if p.ends_with("Director") => 3,
        p if p.ends_with("Manager") => 4,
        "Team Lead" => 5,
        _ => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmployeeStatus;

    fn snapshot(id: &str, manager_id: Option<&str>) -> EmployeeSnapshot {
        EmployeeSnapshot {
            id: id.to_string(),
            employee_id: format!("TC{id}"),
            first_name: "First".to_string(),
            last_name: id.to_string(),
            position: format!("Position {id}"),
            role_id: Some("employee".to_string()),
            department_id: Some("eng".to_string()),
            department_name: Some("Engineering".to_string()),
            manager_id: manager_id.map(str::to_string),
            status: EmployeeStatus::Active,
            hire_date: None,
        }
    }

    fn edges(forest: &[HierarchyNode]) -> Vec<(String, String)> {
        let mut edges = Vec::new();
        let mut stack: Vec<&HierarchyNode> = forest.iter().collect();
        while let Some(node) = stack.pop() {
            for child in &node.children {
                edges.push((node.employee.id.clone(), child.employee.id.clone()));
                stack.push(child);
            }
        }
        edges.sort();
        edges
    }

    #[test]
    fn test_three_level_chain_builds_single_tree() {
        let forest = build_forest(&[
            snapshot("1", None),
            snapshot("2", Some("1")),
            snapshot("3", Some("2")),
        ]);

        assert_eq!(forest.len(), 1);
        let root = &forest[0];
        assert_eq!(root.employee.id, "1");
        assert!(root.manager.is_none());
        assert_eq!(root.children.len(), 1);

        let middle = &root.children[0];
        assert_eq!(middle.employee.id, "2");
        assert_eq!(
            middle.manager,
            Some(ManagerSummary {
                id: "1".to_string(),
                name: "First 1".to_string(),
                position: "Position 1".to_string(),
            })
        );
        assert_eq!(middle.children[0].employee.id, "3");
    }

    #[test]
    fn test_edges_do_not_depend_on_input_order() {
        let ordered = vec![
            snapshot("1", None),
            snapshot("2", Some("1")),
            snapshot("3", Some("1")),
            snapshot("4", Some("2")),
            snapshot("5", None),
        ];
        let mut reversed = ordered.clone();
        reversed.reverse();

        assert_eq!(edges(&build_forest(&ordered)), edges(&build_forest(&reversed)));
    }

    #[test]
    fn test_missing_manager_becomes_root() {
        let forest = build_forest(&[snapshot("2", Some("gone")), snapshot("3", Some("2"))]);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].employee.id, "2");
        assert!(forest[0].manager.is_none());
        assert_eq!(forest[0].size(), 2);
    }

    #[test]
    fn test_every_employee_placed_exactly_once() {
        let employees = vec![
            snapshot("1", None),
            snapshot("2", Some("1")),
            snapshot("3", Some("1")),
            snapshot("4", Some("3")),
            snapshot("5", None),
        ];
        let forest = build_forest(&employees);

        assert_eq!(forest.iter().map(HierarchyNode::size).sum::<usize>(), 5);
        assert_eq!(collect_ids(&forest).len(), 5);
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn test_cycle_members_are_left_out() {
        let forest = build_forest(&[
            snapshot("1", None),
            snapshot("2", Some("3")),
            snapshot("3", Some("2")),
        ]);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].employee.id, "1");
    }

    #[test]
    fn test_node_serializes_flat_with_children() {
        let forest = build_forest(&[snapshot("1", None), snapshot("2", Some("1"))]);
        let value = serde_json::to_value(&forest[0]).expect("serializable");

        assert_eq!(value["id"], "1");
        assert_eq!(value["firstName"], "First");
        assert!(value.get("manager").is_none());
        assert_eq!(value["children"][0]["manager"]["name"], "First 1");
    }

    #[test]
    fn test_find_manager_cycle() {
        let acyclic = [("1", None), ("2", Some("1")), ("3", Some("2"))];
        assert_eq!(find_manager_cycle(acyclic), None);

        let cyclic = [("1", Some("3")), ("2", Some("1")), ("3", Some("2")), ("4", Some("1"))];
        let cycle = find_manager_cycle(cyclic).expect("cycle found");
        assert_eq!(cycle.first(), cycle.last());
        assert_eq!(cycle.len(), 4);

        assert!(find_manager_cycle([("1", Some("1"))]).is_some());
    }

    #[test]
    fn test_change_closing_a_loop_is_rejected() {
        let links = [("1", None), ("2", Some("1")), ("3", Some("2"))];

        assert!(ensure_acyclic_change(links, "3", Some("1")).is_ok());
        assert!(matches!(
            ensure_acyclic_change(links, "1", Some("3")),
            Err(HierarchyError::ManagerCycle(_))
        ));
    }

    #[test]
    fn test_position_rank_ordering() {
        assert_eq!(position_rank("CEO"), 1);
        assert_eq!(position_rank("VP of Sales"), 2);
        assert_eq!(position_rank("HR Director"), 3);
        assert_eq!(position_rank("Payroll Manager"), 4);
        assert_eq!(position_rank("Team Lead"), 5);
        assert_eq!(position_rank("CFO"), 6);
    }

    #[test]
    fn test_very_deep_chain_builds_without_recursion() {
        let depth = 200_000;
        let employees: Vec<EmployeeSnapshot> = (0..depth)
            .map(|level| {
                let manager = (level > 0).then(|| (level - 1).to_string());
                snapshot(&level.to_string(), manager.as_deref())
            })
            .collect();

        let forest = build_forest(&employees);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].size(), depth);

        let mut levels = 1;
        let mut node = &forest[0];
        while let Some(child) = node.children.first() {
            let manager = child.manager.as_ref().map(|m| m.id.as_str());
            assert_eq!(manager, Some(node.employee.id.as_str()));
            node = child;
            levels += 1;
        }
        assert_eq!(levels, depth);
        assert_eq!(node.employee.id, (depth - 1).to_string());
    }
}
