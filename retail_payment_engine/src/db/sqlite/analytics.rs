use chrono::NaiveDate;
use log::trace;
use rpg_common::Money;
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{DailyAggregate, PaymentMethod},
};

const AGGREGATE_COLUMNS: &str = "date, total_revenue, total_orders, cod_orders, online_payments";

/// Adds one order to the day's aggregate. A single upsert statement does the whole read-modify-write inside the
/// database, so N concurrent increments always sum to N orders and the exact total revenue, regardless of
/// interleaving.
pub async fn increment_daily(
    date: NaiveDate,
    amount: Money,
    method: PaymentMethod,
    conn: &mut SqliteConnection,
) -> Result<DailyAggregate, SqliteDatabaseError> {
    let (cod, online) = match method {
        PaymentMethod::Cod => (1i64, 0i64),
        PaymentMethod::Online => (0, 1),
    };
    let sql = format!(
        r#"
            INSERT INTO analytics_daily (date, total_revenue, total_orders, cod_orders, online_payments)
            VALUES (?, ?, 1, ?, ?)
            ON CONFLICT (date) DO UPDATE SET
                total_revenue = total_revenue + excluded.total_revenue,
                total_orders = total_orders + 1,
                cod_orders = cod_orders + excluded.cod_orders,
                online_payments = online_payments + excluded.online_payments
            RETURNING {AGGREGATE_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, DailyAggregate>(&sql)
        .bind(date)
        .bind(amount)
        .bind(cod)
        .bind(online)
        .fetch_one(conn)
        .await?;
    trace!("🗃️ Analytics for {date}: {} orders, {}", row.total_orders, row.total_revenue);
    Ok(row)
}

pub async fn fetch_daily(
    date: NaiveDate,
    conn: &mut SqliteConnection,
) -> Result<Option<DailyAggregate>, SqliteDatabaseError> {
    let sql = format!("SELECT {AGGREGATE_COLUMNS} FROM analytics_daily WHERE date = ?");
    let row = sqlx::query_as::<_, DailyAggregate>(&sql).bind(date).fetch_optional(conn).await?;
    Ok(row)
}

pub async fn fetch_range(
    from: NaiveDate,
    to: NaiveDate,
    conn: &mut SqliteConnection,
) -> Result<Vec<DailyAggregate>, SqliteDatabaseError> {
    let sql = format!("SELECT {AGGREGATE_COLUMNS} FROM analytics_daily WHERE date >= ? AND date <= ? ORDER BY date");
    let rows = sqlx::query_as::<_, DailyAggregate>(&sql).bind(from).bind(to).fetch_all(conn).await?;
    Ok(rows)
}
