//! Employee documents

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::models::EmployeeDocument;

fn document_from_row(row: &PgRow) -> Result<EmployeeDocument> {
    Ok(EmployeeDocument {
        id: row.try_get("id")?,
        employee_id: row.try_get("employee_id")?,
        document_type: row.try_get("document_type")?,
        file_name: row.try_get("file_name")?,
        original_name: row.try_get("original_name")?,
        mime_type: row.try_get("mime_type")?,
        file_size: row.try_get("file_size")?,
        file_path: row.try_get("file_path")?,
        status: row.try_get("status")?,
        uploaded_at: row.try_get("uploaded_at")?,
        reviewed_by: row.try_get("reviewed_by")?,
        reviewed_at: row.try_get("reviewed_at")?,
        comments: row.try_get("comments")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
    })
}

/// Document repository
#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Documents of one employee, newest upload first
    pub async fn for_employee(&self, employee_id: &str) -> Result<Vec<EmployeeDocument>> {
        let rows = sqlx::query(
            r#"
            SELECT d.id, d.employee_id, d.document_type, d.file_name, d.original_name,
                   d.mime_type, d.file_size, d.file_path, d.status, d.uploaded_at,
                   d.reviewed_by, d.reviewed_at, d.comments,
                   e.first_name, e.last_name
            FROM documents d
            JOIN employees e ON d.employee_id = e.id
            WHERE d.employee_id = $1
            ORDER BY d.uploaded_at DESC
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(document_from_row).collect()
    }
}
