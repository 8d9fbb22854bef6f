//! Employee repository for database operations

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use common::{
    chain::ChainSource,
    guard::EmployeeDirectory,
    hierarchy::{MANAGERIAL_POSITIONS, position_rank},
    models::{
        Address, BankDetails, Certification, Education, EmergencyContact, Employee,
        EmployeeField, EmployeeSnapshot, EmployeeStatus, EmployeeUpdate, NewEmployee,
        employee::ORGANIZATION_STATUSES,
    },
};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow, types::Json};
use tracing::info;

use crate::models::{EmployeeFilter, ListScope, ManagerEntry, SEARCH_LIMIT, SearchQuery};

const EMPLOYEE_COLUMNS: &str = r#"
    SELECT e.id, e.employee_id, e.first_name, e.last_name, e.email, e.phone,
           e.date_of_birth, e.gender, e.address, e.department_id,
           d.name AS department_name, e.position, e.role_id, e.manager_id,
           CASE WHEN m.id IS NULL THEN NULL ELSE m.first_name || ' ' || m.last_name END
               AS manager_name,
           e.hire_date, e.employment_type, e.salary, e.status, e.emergency_contact,
           e.bank_details, e.skills, e.education, e.certifications,
           e.created_at, e.updated_at
    FROM employees e
    LEFT JOIN departments d ON e.department_id = d.id
    LEFT JOIN employees m ON e.manager_id = m.id
"#;

const SNAPSHOT_COLUMNS: &str = r#"
    SELECT e.id, e.employee_id, e.first_name, e.last_name, e.position, e.role_id,
           e.department_id, d.name AS department_name, e.manager_id, e.status, e.hire_date
    FROM employees e
    LEFT JOIN departments d ON e.department_id = d.id
"#;

fn status_from_row(row: &PgRow) -> Result<EmployeeStatus> {
    let status: String = row.try_get("status")?;
    Ok(status.parse::<EmployeeStatus>()?)
}

fn employee_from_row(row: &PgRow) -> Result<Employee> {
    let skills: Json<Vec<String>> = row.try_get("skills")?;
    let education: Json<Vec<Education>> = row.try_get("education")?;
    let certifications: Json<Vec<Certification>> = row.try_get("certifications")?;

    Ok(Employee {
        id: row.try_get("id")?,
        employee_id: row.try_get("employee_id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        date_of_birth: row.try_get("date_of_birth")?,
        gender: row.try_get("gender")?,
        address: row.try_get::<Option<Json<Address>>, _>("address")?.map(|a| a.0),
        department_id: row.try_get("department_id")?,
        department: row.try_get("department_name")?,
        position: row.try_get("position")?,
        role: row.try_get("role_id")?,
        manager_id: row.try_get("manager_id")?,
        manager_name: row.try_get("manager_name")?,
        hire_date: row.try_get("hire_date")?,
        employment_type: row.try_get("employment_type")?,
        salary: row.try_get("salary")?,
        status: status_from_row(row)?,
        emergency_contact: row
            .try_get::<Option<Json<EmergencyContact>>, _>("emergency_contact")?
            .map(|c| c.0),
        bank_details: row.try_get::<Option<Json<BankDetails>>, _>("bank_details")?.map(|b| b.0),
        skills: skills.0,
        education: education.0,
        certifications: certifications.0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn snapshot_from_row(row: &PgRow) -> Result<EmployeeSnapshot> {
    Ok(EmployeeSnapshot {
        id: row.try_get("id")?,
        employee_id: row.try_get("employee_id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        position: row.try_get("position")?,
        role_id: row.try_get("role_id")?,
        department_id: row.try_get("department_id")?,
        department_name: row.try_get("department_name")?,
        manager_id: row.try_get("manager_id")?,
        status: status_from_row(row)?,
        hire_date: row.try_get("hire_date")?,
    })
}

fn organization_statuses() -> Vec<String> {
    ORGANIZATION_STATUSES
        .iter()
        .map(|status| status.as_str().to_string())
        .collect()
}

/// Next identifier after `max` with a three digit minimum width, e.g. `EMP007`
pub(crate) fn next_code(prefix: &str, max: i64) -> String {
    format!("{}{:03}", prefix, max + 1)
}

/// Managerial candidates ordered by seniority and then by name
pub(crate) fn order_managers(mut candidates: Vec<EmployeeSnapshot>) -> Vec<ManagerEntry> {
    candidates.sort_by(|a, b| {
        position_rank(&a.position)
            .cmp(&position_rank(&b.position))
            .then_with(|| a.first_name.cmp(&b.first_name))
            .then_with(|| a.last_name.cmp(&b.last_name))
    });

    candidates
        .into_iter()
        .map(|e| ManagerEntry {
            name: e.full_name(),
            id: e.id,
            position: e.position,
            role_id: e.role_id,
        })
        .collect()
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &EmployeeFilter) {
    builder.push(" WHERE TRUE");

    match &filter.scope {
        ListScope::All => {}
        ListScope::ReportsOf(manager_id) => {
            builder.push(" AND e.manager_id = ").push_bind(manager_id.clone());
        }
        ListScope::Department(department_id) => {
            builder
                .push(" AND e.department_id = ")
                .push_bind(department_id.clone());
        }
        ListScope::Only(id) => {
            builder.push(" AND e.id = ").push_bind(id.clone());
        }
    }

    if let Some(department) = &filter.department {
        builder
            .push(" AND e.department_id = ")
            .push_bind(department.clone());
    }

    if let Some(status) = &filter.status {
        builder.push(" AND e.status = ").push_bind(status.as_str());
    }

    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        builder
            .push(" AND (e.first_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR e.last_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR e.email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Search across every employee regardless of status
fn search_query(query: &SearchQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new(SNAPSHOT_COLUMNS);
    builder.push(" WHERE TRUE");

    if let Some(q) = query.q.as_deref().filter(|q| !q.trim().is_empty()) {
        let pattern = format!("%{}%", q.trim());
        builder
            .push(" AND (e.first_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR e.last_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR (e.first_name || ' ' || e.last_name) ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR e.position ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(department) = &query.department {
        builder
            .push(" AND e.department_id = ")
            .push_bind(department.clone());
    }
    if let Some(role) = &query.role {
        builder.push(" AND e.role_id = ").push_bind(role.clone());
    }
    if let Some(position) = &query.position {
        builder
            .push(" AND e.position ILIKE ")
            .push_bind(format!("%{}%", position));
    }

    builder
        .push(" ORDER BY e.first_name, e.last_name LIMIT ")
        .push_bind(SEARCH_LIMIT);
    builder
}

macro_rules! set_column {
    ($set:expr, $field:expr, $value:expr) => {
        if let Some(value) = $value {
            $set.push(format!("{} = ", $field.column()));
            $set.push_bind_unseparated(value);
        }
    };
}

/// Employee repository for database operations
#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    /// Create a new employee repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One page of employees plus the total number of matches
    pub async fn list(&self, filter: &EmployeeFilter) -> Result<(Vec<Employee>, i64)> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM employees e");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query.build().fetch_one(&self.pool).await?.try_get(0)?;

        let mut page_query = QueryBuilder::<Postgres>::new(EMPLOYEE_COLUMNS);
        push_filters(&mut page_query, filter);
        page_query
            .push(" ORDER BY e.created_at DESC LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset());

        let rows = page_query.build().fetch_all(&self.pool).await?;
        let employees = rows.iter().map(employee_from_row).collect::<Result<_>>()?;

        Ok((employees, total))
    }

    /// Get an employee by ID
    pub async fn find(&self, id: &str) -> Result<Option<Employee>> {
        let row = sqlx::query(&format!("{} WHERE e.id = $1", EMPLOYEE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(employee_from_row).transpose()
    }

    pub async fn exists(&self, id: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM employees WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Insert a new employee, generating its `EMP###` id and `TC###` code
    pub async fn create(&self, new: &NewEmployee) -> Result<Employee> {
        let mut tx = self.pool.begin().await?;

        // Serializes id generation between concurrent inserts
        sqlx::query("LOCK TABLE employees IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(MAX(CASE WHEN id ~ '^EMP[0-9]+$'
                    THEN CAST(SUBSTRING(id FROM 4) AS BIGINT) END), 0) AS max_id,
                COALESCE(MAX(CASE WHEN employee_id ~ '^TC[0-9]+$'
                    THEN CAST(SUBSTRING(employee_id FROM 3) AS BIGINT) END), 0) AS max_code
            FROM employees
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        let id = next_code("EMP", row.try_get("max_id")?);
        let employee_code = next_code("TC", row.try_get("max_code")?);
        let status = new.status.unwrap_or(EmployeeStatus::Active);

        sqlx::query(
            r#"
            INSERT INTO employees (
                id, employee_id, first_name, last_name, email, phone, date_of_birth, gender,
                department_id, position, role_id, manager_id, hire_date, employment_type,
                salary, status, address
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(&id)
        .bind(&employee_code)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(new.date_of_birth)
        .bind(&new.gender)
        .bind(&new.department_id)
        .bind(&new.position)
        .bind(&new.role_id)
        .bind(new.manager_id.as_deref().filter(|m| !m.trim().is_empty()))
        .bind(new.hire_date)
        .bind(&new.employment_type)
        .bind(new.salary)
        .bind(status.as_str())
        .bind(new.address.as_ref().map(Json))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Created employee {} ({})", id, employee_code);

        self.find(&id)
            .await?
            .ok_or_else(|| anyhow!("Employee {} missing after insert", id))
    }

    /// Apply a partial update and return the stored record
    pub async fn update(&self, id: &str, update: &EmployeeUpdate) -> Result<Option<Employee>> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE employees SET ");
        let mut set = builder.separated(", ");

        set_column!(set, EmployeeField::FirstName, update.first_name.clone());
        set_column!(set, EmployeeField::LastName, update.last_name.clone());
        set_column!(set, EmployeeField::Email, update.email.clone());
        set_column!(set, EmployeeField::Phone, update.phone.clone());
        set_column!(set, EmployeeField::DateOfBirth, update.date_of_birth);
        set_column!(set, EmployeeField::Gender, update.gender.clone());
        set_column!(set, EmployeeField::Address, update.address.clone().map(Json));
        set_column!(set, EmployeeField::DepartmentId, update.department_id.clone());
        set_column!(set, EmployeeField::Position, update.position.clone());
        set_column!(set, EmployeeField::RoleId, update.role_id.clone());
        set_column!(set, EmployeeField::ManagerId, update.manager_id.clone());
        set_column!(set, EmployeeField::HireDate, update.hire_date);
        set_column!(set, EmployeeField::EmploymentType, update.employment_type.clone());
        set_column!(set, EmployeeField::Salary, update.salary);
        set_column!(set, EmployeeField::Status, update.status.map(|s| s.as_str()));
        set_column!(
            set,
            EmployeeField::EmergencyContact,
            update.emergency_contact.clone().map(Json)
        );
        set_column!(set, EmployeeField::BankDetails, update.bank_details.clone().map(Json));
        set_column!(set, EmployeeField::Skills, update.skills.clone().map(Json));
        set_column!(set, EmployeeField::Education, update.education.clone().map(Json));
        set_column!(
            set,
            EmployeeField::Certifications,
            update.certifications.clone().map(Json)
        );
        set.push("updated_at = NOW()");

        builder.push(" WHERE id = ").push_bind(id.to_string());

        let result = builder.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        info!("Updated employee {}: {:?}", id, update.fields());
        self.find(id).await
    }

    /// Every `(employee, manager)` link in the organization
    pub async fn manager_links(&self) -> Result<Vec<(String, Option<String>)>> {
        let rows = sqlx::query("SELECT id, manager_id FROM employees")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<(String, Option<String>)> {
                Ok((row.try_get("id")?, row.try_get("manager_id")?))
            })
            .collect()
    }

    /// Active holders of a managerial position in a department
    pub async fn managers_in_department(&self, department_id: &str) -> Result<Vec<ManagerEntry>> {
        let positions: Vec<String> = MANAGERIAL_POSITIONS.iter().map(|p| p.to_string()).collect();

        let rows = sqlx::query(&format!(
            "{} WHERE e.department_id = $1 AND e.status = $2 AND e.position = ANY($3)",
            SNAPSHOT_COLUMNS
        ))
        .bind(department_id)
        .bind(EmployeeStatus::Active.as_str())
        .bind(positions)
        .fetch_all(&self.pool)
        .await?;

        let candidates = rows.iter().map(snapshot_from_row).collect::<Result<_>>()?;
        Ok(order_managers(candidates))
    }

    /// Everyone currently part of the organization, earliest hires first
    pub async fn organization_members(&self) -> Result<Vec<EmployeeSnapshot>> {
        let rows = sqlx::query(&format!(
            "{} WHERE e.status = ANY($1) ORDER BY e.hire_date ASC, e.id ASC",
            SNAPSHOT_COLUMNS
        ))
        .bind(organization_statuses())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(snapshot_from_row).collect()
    }

    /// Name or position search with optional exact filters
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<EmployeeSnapshot>> {
        let mut builder = search_query(query);
        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(snapshot_from_row).collect()
    }
}

#[async_trait]
impl EmployeeDirectory for EmployeeRepository {
    async fn manager_of(&self, employee_id: &str) -> Result<Option<String>> {
        let manager: Option<Option<String>> =
            sqlx::query_scalar("SELECT manager_id FROM employees WHERE id = $1")
                .bind(employee_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(manager.flatten())
    }

    async fn department_of(&self, employee_id: &str) -> Result<Option<String>> {
        let department: Option<Option<String>> =
            sqlx::query_scalar("SELECT department_id FROM employees WHERE id = $1")
                .bind(employee_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(department.flatten())
    }
}

#[async_trait]
impl ChainSource for EmployeeRepository {
    async fn find_employee(&self, id: &str) -> Result<Option<EmployeeSnapshot>> {
        let row = sqlx::query(&format!("{} WHERE e.id = $1", SNAPSHOT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(snapshot_from_row).transpose()
    }

    async fn direct_reports(&self, manager_id: &str) -> Result<Vec<EmployeeSnapshot>> {
        let rows = sqlx::query(&format!(
            "{} WHERE e.manager_id = $1 AND e.status = ANY($2) ORDER BY e.first_name, e.last_name",
            SNAPSHOT_COLUMNS
        ))
        .bind(manager_id)
        .bind(organization_statuses())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(snapshot_from_row).collect()
    }
}
