//! Login credentials joined with the linked employee record

use anyhow::Result;
use chrono::{DateTime, Utc};
use common::models::EmployeeStatus;
use serde::Serialize;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

/// A login account with what sign-in needs from its employee
#[derive(Debug, Clone)]
pub struct Credential {
    pub user_id: Uuid,
    pub employee_id: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: String,
    pub is_active: bool,
    pub first_name: String,
    pub last_name: String,
    pub employee_status: EmployeeStatus,
}

/// Current user profile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub employee_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub department: Option<String>,
    pub role: String,
    pub status: EmployeeStatus,
    pub last_login: Option<DateTime<Utc>>,
}

fn credential_from_row(row: &PgRow) -> Result<Credential> {
    let status: String = row.get("status");

    Ok(Credential {
        user_id: row.get("id"),
        employee_id: row.get("employee_id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role_id: row.get("role_id"),
        is_active: row.get("is_active"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        employee_status: status.parse()?,
    })
}

/// Credential repository
#[derive(Clone)]
pub struct CredentialRepository {
    pool: PgPool,
}

impl CredentialRepository {
    /// Create a new credential repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the account registered under an email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Credential>> {
        info!("Finding credentials by email: {}", email);

        let row = sqlx::query(
            r#"
            SELECT u.id, u.employee_id, u.email, u.password_hash, u.role_id, u.is_active,
                   e.first_name, e.last_name, e.status
            FROM users u
            JOIN employees e ON u.employee_id = e.id
            WHERE u.email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(credential_from_row).transpose()
    }

    /// Find an account by user id
    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<Credential>> {
        let row = sqlx::query(
            r#"
            SELECT u.id, u.employee_id, u.email, u.password_hash, u.role_id, u.is_active,
                   e.first_name, e.last_name, e.status
            FROM users u
            JOIN employees e ON u.employee_id = e.id
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(credential_from_row).transpose()
    }

    /// Record a successful sign-in
    pub async fn touch_last_login(&self, user_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Replace the password hash of an account
    pub async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<()> {
        info!("Updating password for user: {}", user_id);

        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Replace the password hash of the account linked to an employee.
    ///
    /// Returns false when the employee has no account.
    pub async fn reset_password_for_employee(
        &self,
        employee_id: &str,
        password_hash: &str,
    ) -> Result<bool> {
        info!("Resetting password for employee: {}", employee_id);

        let result = sqlx::query(
            "UPDATE users SET password_hash = $1, updated_at = NOW() WHERE employee_id = $2",
        )
        .bind(password_hash)
        .bind(employee_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Load the profile shown to the signed-in user
    pub async fn profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query(
            r#"
            SELECT u.id, u.employee_id, u.email, u.role_id, u.last_login,
                   e.first_name, e.last_name, e.position, e.status,
                   d.name AS department_name
            FROM users u
            JOIN employees e ON u.employee_id = e.id
            LEFT JOIN departments d ON e.department_id = d.id
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let status: String = row.get("status");
        Ok(Some(Profile {
            id: row.get("id"),
            employee_id: row.get("employee_id"),
            email: row.get("email"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            position: row.get("position"),
            department: row.get("department_name"),
            role: row.get("role_id"),
            status: status.parse()?,
            last_login: row.get("last_login"),
        }))
    }
}
