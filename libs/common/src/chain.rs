//! Upward and downward reporting chains
//!
//! Each hop is one lookup through [`ChainSource`].

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use tracing::warn;

use crate::{error::HierarchyError, models::EmployeeSnapshot};

/// Employee lookups used by the chain walkers
#[async_trait]
pub trait ChainSource: Send + Sync {
    async fn find_employee(&self, id: &str) -> Result<Option<EmployeeSnapshot>>;

    /// Employees whose manager is `manager_id`
    async fn direct_reports(&self, manager_id: &str) -> Result<Vec<EmployeeSnapshot>>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainEntry {
    pub id: String,
    pub name: String,
    pub position: String,
    pub department: Option<String>,
    pub role: Option<String>,
    /// Set on downward entries only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
}

impl ChainEntry {
    fn from_snapshot(employee: &EmployeeSnapshot, manager_id: Option<&str>) -> Self {
        Self {
            id: employee.id.clone(),
            name: employee.full_name(),
            position: employee.position.clone(),
            department: employee.department_name.clone(),
            role: employee.role_id.clone(),
            manager_id: manager_id.map(str::to_string),
        }
    }
}

/// Path from the top of the organization down to `employee_id`, inclusive.
///
/// Empty when `employee_id` does not exist. The walk stops at an employee
/// with no manager or whose manager cannot be found.
pub async fn upward(
    source: &dyn ChainSource,
    employee_id: &str,
) -> Result<Vec<ChainEntry>, HierarchyError> {
    let mut chain = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut current = Some(employee_id.to_string());

    while let Some(id) = current {
        if !seen.insert(id.clone()) {
            warn!("Manager cycle detected while walking up from {}", employee_id);
            return Err(HierarchyError::ManagerCycle(id));
        }

        let Some(employee) = source.find_employee(&id).await? else {
            break;
        };

        chain.push(ChainEntry::from_snapshot(&employee, None));
        current = employee.manager_id;
    }

    chain.reverse();
    Ok(chain)
}

/// All transitive reports of `employee_id`, breadth-first.
///
/// Only employees in the live organization (Active or Pending Onboarding)
/// are reported or expanded.
pub async fn downward(
    source: &dyn ChainSource,
    employee_id: &str,
) -> Result<Vec<ChainEntry>, HierarchyError> {
    let mut chain = Vec::new();
    let mut visited: HashSet<String> = HashSet::from([employee_id.to_string()]);
    let mut queue: VecDeque<String> = VecDeque::from([employee_id.to_string()]);

    while let Some(current) = queue.pop_front() {
        for report in source.direct_reports(&current).await? {
            if !report.status.in_organization() || !visited.insert(report.id.clone()) {
                continue;
            }
            chain.push(ChainEntry::from_snapshot(&report, Some(&current)));
            queue.push_back(report.id);
        }
    }

    Ok(chain)
}

/// Reporting chain read model
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportingChain {
    pub employee_id: String,
    pub upward: Vec<ChainEntry>,
    pub downward: Vec<ChainEntry>,
}

pub async fn reporting_chain(
    source: &dyn ChainSource,
    employee_id: &str,
) -> Result<ReportingChain, HierarchyError> {
    Ok(ReportingChain {
        employee_id: employee_id.to_string(),
        upward: upward(source, employee_id).await?,
        downward: downward(source, employee_id).await?,
    })
}
