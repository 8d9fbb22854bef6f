//! Department repository for database operations

use anyhow::Result;
use common::models::{Department, employee::ORGANIZATION_STATUSES};
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};

use super::employee::snapshot_from_row;
use crate::models::DepartmentMember;

const DEPARTMENT_COLUMNS: &str = r#"
    SELECT d.id, d.name, d.description, d.head_role, d.head_employee_id,
           CASE WHEN h.id IS NULL THEN NULL ELSE h.first_name || ' ' || h.last_name END
               AS head_name,
           d.budget, d.location, d.functions
    FROM departments d
    LEFT JOIN employees h ON d.head_employee_id = h.id
"#;

fn department_from_row(row: &PgRow) -> Result<Department> {
    let functions: Json<Vec<String>> = row.try_get("functions")?;

    Ok(Department {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        head_role: row.try_get("head_role")?,
        head_employee_id: row.try_get("head_employee_id")?,
        head_name: row.try_get("head_name")?,
        budget: row.try_get("budget")?,
        location: row.try_get("location")?,
        functions: functions.0,
    })
}

/// Department repository
#[derive(Clone)]
pub struct DepartmentRepository {
    pool: PgPool,
}

impl DepartmentRepository {
    /// Create a new department repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All departments ordered by name
    pub async fn list(&self) -> Result<Vec<Department>> {
        let rows = sqlx::query(&format!("{} ORDER BY d.name", DEPARTMENT_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(department_from_row).collect()
    }

    /// Get a department by ID
    pub async fn find(&self, id: &str) -> Result<Option<Department>> {
        let row = sqlx::query(&format!("{} WHERE d.id = $1", DEPARTMENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(department_from_row).transpose()
    }

    /// Members of a department still in the organization, with manager names
    pub async fn members(&self, department_id: &str) -> Result<Vec<DepartmentMember>> {
        let statuses: Vec<String> = ORGANIZATION_STATUSES
            .iter()
            .map(|status| status.as_str().to_string())
            .collect();

        let rows = sqlx::query(
            r#"
            SELECT e.id, e.employee_id, e.first_name, e.last_name, e.position, e.role_id,
                   e.department_id, d.name AS department_name, e.manager_id, e.status,
                   e.hire_date,
                   CASE WHEN m.id IS NULL THEN NULL ELSE m.first_name || ' ' || m.last_name END
                       AS manager_name
            FROM employees e
            LEFT JOIN departments d ON e.department_id = d.id
            LEFT JOIN employees m ON e.manager_id = m.id
            WHERE e.department_id = $1 AND e.status = ANY($2)
            ORDER BY e.position, e.first_name, e.last_name
            "#,
        )
        .bind(department_id)
        .bind(statuses)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<DepartmentMember> {
                Ok(DepartmentMember {
                    employee: snapshot_from_row(row)?,
                    manager_name: row.try_get("manager_name")?,
                })
            })
            .collect()
    }
}
