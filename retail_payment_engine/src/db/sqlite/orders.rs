use log::{debug, trace};
use sqlx::{types::Json, QueryBuilder, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{NewOrder, Order, OrderId, OrderStatusType, OrderUpdate},
};

const ORDER_COLUMNS: &str = "id, order_id, invoice_number, gateway_order_id, payment_id, customer_id, items, \
                             total_price, taxable_amount, cgst, sgst, igst, tax_rate_bps, inter_state, currency, \
                             payment_method, status, refund_status, refund_reason, refund_date, failure_reason, \
                             version, created_at, updated_at";

/// Inserts a new order. The UNIQUE constraint on `order_id` turns an id collision into a hard error rather than
/// a silent overwrite.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, SqliteDatabaseError> {
    let result = sqlx::query(
        r#"
            INSERT INTO orders (
                order_id, invoice_number, gateway_order_id, customer_id, items,
                total_price, taxable_amount, cgst, sgst, igst, tax_rate_bps, inter_state,
                currency, payment_method, status
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(order.order_id.as_str())
    .bind(&order.invoice_number)
    .bind(&order.gateway_order_id)
    .bind(&order.customer_id)
    .bind(Json(&order.items))
    .bind(order.total_price)
    .bind(order.tax.taxable)
    .bind(order.tax.cgst)
    .bind(order.tax.sgst)
    .bind(order.tax.igst)
    .bind(order.tax.rate_bps)
    .bind(order.tax.inter_state)
    .bind(&order.currency)
    .bind(order.payment_method.to_string())
    .bind(order.status.to_string())
    .execute(&mut *conn)
    .await;
    match result {
        Ok(_) => {},
        Err(sqlx::Error::Database(de)) if matches!(de.kind(), sqlx::error::ErrorKind::UniqueViolation) => {
            return Err(SqliteDatabaseError::DuplicateOrder(order.order_id));
        },
        Err(e) => return Err(e.into()),
    }
    debug!("🗃️ Order {} has been saved in the DB", order.order_id);
    fetch_order_by_order_id(&order.order_id, conn)
        .await?
        .ok_or(SqliteDatabaseError::OrderNotFound(order.order_id))
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = ? LIMIT 1");
    let order = sqlx::query_as::<_, Order>(&sql).bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// At most one order should carry a given gateway id. If that invariant is ever violated upstream, the earliest
/// created row wins.
pub async fn fetch_order_by_gateway_id(
    gateway_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE gateway_order_id = ? ORDER BY id ASC LIMIT 1");
    let order = sqlx::query_as::<_, Order>(&sql).bind(gateway_order_id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_all_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, SqliteDatabaseError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC");
    let orders = sqlx::query_as::<_, Order>(&sql).fetch_all(conn).await?;
    Ok(orders)
}

pub async fn fetch_orders_for_customer(
    customer_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, SqliteDatabaseError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = ? ORDER BY created_at DESC, id DESC");
    let orders = sqlx::query_as::<_, Order>(&sql).bind(customer_id).fetch_all(conn).await?;
    Ok(orders)
}

fn push_set_clauses(builder: &mut QueryBuilder<'_, sqlx::Sqlite>, update: OrderUpdate, bump_version: bool) {
    let mut set_clause = builder.separated(", ");
    if let Some(status) = update.status {
        set_clause.push("status = ");
        set_clause.push_bind_unseparated(status.to_string());
    }
    if let Some(refund_status) = update.refund_status {
        set_clause.push("refund_status = ");
        set_clause.push_bind_unseparated(refund_status.to_string());
    }
    if let Some(refund_reason) = update.refund_reason {
        set_clause.push("refund_reason = ");
        set_clause.push_bind_unseparated(refund_reason);
    }
    if let Some(refund_date) = update.refund_date {
        set_clause.push("refund_date = ");
        set_clause.push_bind_unseparated(refund_date);
    }
    if let Some(payment_id) = update.payment_id {
        set_clause.push("payment_id = ");
        set_clause.push_bind_unseparated(payment_id);
    }
    if let Some(failure_reason) = update.failure_reason {
        set_clause.push("failure_reason = ");
        set_clause.push_bind_unseparated(failure_reason);
    }
    if bump_version {
        set_clause.push("version = version + 1");
    }
}

/// Plain merge update. Last-writer-wins; must not be used for financial fields when a race is possible.
pub async fn update_order(
    id: &OrderId,
    update: OrderUpdate,
    conn: &mut SqliteConnection,
) -> Result<Order, SqliteDatabaseError> {
    if update.is_empty() {
        debug!("🗃️ No fields to update for order {id}. Update request skipped.");
        return fetch_order_by_order_id(id, conn).await?.ok_or(SqliteDatabaseError::OrderNotFound(id.clone()));
    }
    let mut builder = QueryBuilder::new("UPDATE orders SET updated_at = CURRENT_TIMESTAMP,");
    push_set_clauses(&mut builder, update, false);
    builder.push(" WHERE order_id = ");
    builder.push_bind(id.as_str());
    trace!("🗃️ Executing query: {}", builder.sql());
    let res = builder.build().execute(&mut *conn).await?;
    if res.rows_affected() == 0 {
        return Err(SqliteDatabaseError::OrderNotFound(id.clone()));
    }
    fetch_order_by_order_id(id, conn).await?.ok_or(SqliteDatabaseError::OrderNotFound(id.clone()))
}

/// Version-checked financial update. The write lands only if `version` is still `expected_version`; the version
/// is bumped in the same statement, so exactly one of two racing transitions can succeed.
pub async fn update_order_financial(
    id: &OrderId,
    expected_version: i64,
    update: OrderUpdate,
    conn: &mut SqliteConnection,
) -> Result<Order, SqliteDatabaseError> {
    let mut builder = QueryBuilder::new("UPDATE orders SET updated_at = CURRENT_TIMESTAMP,");
    push_set_clauses(&mut builder, update, true);
    builder.push(" WHERE order_id = ");
    builder.push_bind(id.as_str());
    builder.push(" AND version = ");
    builder.push_bind(expected_version);
    trace!("🗃️ Executing query: {}", builder.sql());
    let res = builder.build().execute(&mut *conn).await?;
    if res.rows_affected() == 0 {
        return match fetch_order_by_order_id(id, conn).await? {
            Some(_) => Err(SqliteDatabaseError::StaleOrderWrite(id.clone())),
            None => Err(SqliteDatabaseError::OrderNotFound(id.clone())),
        };
    }
    fetch_order_by_order_id(id, conn).await?.ok_or(SqliteDatabaseError::OrderNotFound(id.clone()))
}

/// Status-conditioned transition in a single atomic statement. Returns `None` when the order's current status is
/// not in `from` (lost race, duplicate callback, or plain wrong state), leaving the row untouched.
pub async fn transition_status(
    id: &OrderId,
    from: &[OrderStatusType],
    update: OrderUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let mut builder = QueryBuilder::new("UPDATE orders SET updated_at = CURRENT_TIMESTAMP,");
    push_set_clauses(&mut builder, update, true);
    builder.push(" WHERE order_id = ");
    builder.push_bind(id.as_str());
    let statuses = from.iter().map(|s| format!("'{s}'")).collect::<Vec<_>>().join(",");
    builder.push(format!(" AND status IN ({statuses})"));
    trace!("🗃️ Executing query: {}", builder.sql());
    let res = builder.build().execute(&mut *conn).await?;
    if res.rows_affected() == 0 {
        return Ok(None);
    }
    fetch_order_by_order_id(id, conn).await
}
