//! Role repository for database operations

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use tracing::info;

use crate::{models::Role, roles::RoleStore};

/// Role repository
#[derive(Clone)]
pub struct PgRoleRepository {
    pool: PgPool,
}

fn role_from_row(row: &PgRow) -> Role {
    let permissions: Json<Vec<String>> = row.get("permissions");
    let inherits_from: Json<Vec<String>> = row.get("inherits_from");

    Role {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        level: row.get("level"),
        permissions: permissions.0,
        inherits_from: inherits_from.0,
    }
}

impl PgRoleRepository {
    /// Create a new role repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or replace a role definition
    pub async fn upsert(&self, role: &Role) -> Result<()> {
        info!("Upserting role: {}", role.id);

        sqlx::query(
            r#"
            INSERT INTO roles (id, name, description, level, permissions, inherits_from)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                level = EXCLUDED.level,
                permissions = EXCLUDED.permissions,
                inherits_from = EXCLUDED.inherits_from
            "#,
        )
        .bind(&role.id)
        .bind(&role.name)
        .bind(&role.description)
        .bind(role.level)
        .bind(Json(&role.permissions))
        .bind(Json(&role.inherits_from))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl RoleStore for PgRoleRepository {
    async fn find_role(&self, role_id: &str) -> Result<Option<Role>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, level, permissions, inherits_from
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(role_from_row))
    }
}
