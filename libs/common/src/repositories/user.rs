//! Login account lookups shared by the services

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::{identity::UserStore, models::UserAccount};

/// User account repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user account repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn find_account(&self, user_id: Uuid) -> Result<Option<UserAccount>> {
        let row = sqlx::query(
            r#"
            SELECT id, employee_id, email, role_id, is_active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| UserAccount {
            id: row.get("id"),
            employee_id: row.get("employee_id"),
            email: row.get("email"),
            role_id: row.get("role_id"),
            is_active: row.get("is_active"),
        }))
    }
}
