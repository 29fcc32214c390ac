use sqlx::SqliteConnection;

use crate::{db::sqlite::SqliteDatabaseError, db_types::AuditLogEntry};

/// Appends an audit entry. There is no update or delete path; the log is append-only by construction.
pub async fn append_audit(
    admin_id: &str,
    action: &str,
    details: &str,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    sqlx::query("INSERT INTO audit_log (admin_id, action, details) VALUES (?, ?, ?)")
        .bind(admin_id)
        .bind(action)
        .bind(details)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn fetch_recent_audit(
    limit: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<AuditLogEntry>, SqliteDatabaseError> {
    let rows = sqlx::query_as::<_, AuditLogEntry>(
        "SELECT id, admin_id, action, details, created_at FROM audit_log ORDER BY id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}
