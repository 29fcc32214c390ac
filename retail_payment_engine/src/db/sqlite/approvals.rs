use log::{debug, trace};
use sqlx::{types::Json, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{AdminActor, ApprovalRequest, ApprovalStatus, NewApprovalRequest},
};

const APPROVAL_COLUMNS: &str = "id, request_id, action_type, action_data, requester_id, requester_name, status, \
                                approver_id, approver_name, rejection_reason, created_at, resolved_at";

pub async fn insert_approval_request(
    request: NewApprovalRequest,
    conn: &mut SqliteConnection,
) -> Result<ApprovalRequest, SqliteDatabaseError> {
    sqlx::query(
        r#"
            INSERT INTO approval_requests (request_id, action_type, action_data, requester_id, requester_name, status)
            VALUES (?, ?, ?, ?, ?, 'Pending')
        "#,
    )
    .bind(&request.request_id)
    .bind(request.action.action_type())
    .bind(Json(&request.action))
    .bind(&request.requester.id)
    .bind(&request.requester.name)
    .execute(&mut *conn)
    .await?;
    debug!("🗃️ Approval request {} ({}) created", request.request_id, request.action.action_type());
    fetch_approval_request(&request.request_id, conn)
        .await?
        .ok_or(SqliteDatabaseError::ApprovalRequestNotFound(request.request_id))
}

pub async fn fetch_approval_request(
    request_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<ApprovalRequest>, SqliteDatabaseError> {
    let sql = format!("SELECT {APPROVAL_COLUMNS} FROM approval_requests WHERE request_id = ?");
    let row = sqlx::query_as::<_, ApprovalRequest>(&sql).bind(request_id).fetch_optional(conn).await?;
    Ok(row)
}

pub async fn fetch_pending_approvals(
    conn: &mut SqliteConnection,
) -> Result<Vec<ApprovalRequest>, SqliteDatabaseError> {
    let sql = format!(
        "SELECT {APPROVAL_COLUMNS} FROM approval_requests WHERE status = 'Pending' ORDER BY created_at DESC, id DESC"
    );
    let rows = sqlx::query_as::<_, ApprovalRequest>(&sql).fetch_all(conn).await?;
    Ok(rows)
}

/// Resolves a request in a single statement conditioned on it still being PENDING. Resolution is terminal: once
/// this statement has landed for a request, no later resolve can touch it again.
pub async fn resolve_approval_request(
    request_id: &str,
    status: ApprovalStatus,
    approver: &AdminActor,
    rejection_reason: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Option<ApprovalRequest>, SqliteDatabaseError> {
    let res = sqlx::query(
        r#"
            UPDATE approval_requests
            SET status = ?, approver_id = ?, approver_name = ?, rejection_reason = ?,
                resolved_at = CURRENT_TIMESTAMP
            WHERE request_id = ? AND status = 'Pending'
        "#,
    )
    .bind(status.to_string())
    .bind(&approver.id)
    .bind(&approver.name)
    .bind(rejection_reason)
    .bind(request_id)
    .execute(&mut *conn)
    .await?;
    if res.rows_affected() == 0 {
        trace!("🗃️ Approval request {request_id} was not pending; resolve skipped");
        return Ok(None);
    }
    fetch_approval_request(request_id, conn).await
}
