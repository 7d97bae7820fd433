//! Workflow CRUD operations.

use sqlx::{PgConnection, PgPool};

use crate::{models::WorkflowRow, DbError};

const COLUMNS: &str = "id, name, definition, created_at";

/// Insert a workflow row.
///
/// A primary-key collision surfaces as [`DbError::DuplicateId`].
pub async fn insert_workflow(conn: &mut PgConnection, row: &WorkflowRow) -> Result<(), DbError> {
    let result = sqlx::query(
        r#"
        INSERT INTO workflows (id, name, definition, created_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(&row.id)
    .bind(&row.name)
    .bind(&row.definition)
    .bind(row.created_at)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::DuplicateId(row.id.clone()));
    }

    Ok(())
}

/// Fetch a single workflow by its primary key.
pub async fn get_workflow(pool: &PgPool, id: &str) -> Result<WorkflowRow, DbError> {
    let row = sqlx::query_as::<_, WorkflowRow>(&format!(
        "SELECT {COLUMNS} FROM workflows WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Return all workflows ordered by creation time (oldest first).
pub async fn list_workflows(pool: &PgPool) -> Result<Vec<WorkflowRow>, DbError> {
    let rows = sqlx::query_as::<_, WorkflowRow>(&format!(
        "SELECT {COLUMNS} FROM workflows ORDER BY created_at ASC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Delete every workflow.
pub async fn delete_all_workflows(conn: &mut PgConnection) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM workflows").execute(conn).await?;
    Ok(result.rows_affected())
}
