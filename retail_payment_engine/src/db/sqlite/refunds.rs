use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{NewRefundRecord, OrderId, RefundRecord},
};

const REFUND_COLUMNS: &str = "id, refund_id, order_id, payment_id, amount, status, refund_type, created_at";

/// Appends a ledger entry. There is no update path for refunds anywhere in this module; the ledger is
/// write-once by construction.
pub async fn insert_refund_record(
    record: NewRefundRecord,
    conn: &mut SqliteConnection,
) -> Result<RefundRecord, SqliteDatabaseError> {
    sqlx::query(
        r#"
            INSERT INTO refunds (refund_id, order_id, payment_id, amount, status, refund_type)
            VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.refund_id)
    .bind(record.order_id.as_str())
    .bind(&record.payment_id)
    .bind(record.amount)
    .bind(record.status.to_string())
    .bind(record.refund_type.to_string())
    .execute(&mut *conn)
    .await?;
    debug!("🗃️ Refund {} recorded for order {}", record.refund_id, record.order_id);
    let sql = format!("SELECT {REFUND_COLUMNS} FROM refunds WHERE refund_id = ?");
    let row = sqlx::query_as::<_, RefundRecord>(&sql).bind(&record.refund_id).fetch_one(conn).await?;
    Ok(row)
}

pub async fn fetch_refunds_for_order(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<RefundRecord>, SqliteDatabaseError> {
    let sql = format!("SELECT {REFUND_COLUMNS} FROM refunds WHERE order_id = ? ORDER BY id DESC");
    let rows = sqlx::query_as::<_, RefundRecord>(&sql).bind(order_id.as_str()).fetch_all(conn).await?;
    Ok(rows)
}
