//! Fires a burst of concurrent analytics increments at a single day's aggregate and checks that nothing is
//! lost. The upsert must be a single atomic statement for this to hold; a read-modify-write would drop counts
//! under this load.

mod common;

use chrono::NaiveDate;
use common::*;
use retail_payment_engine::{db_types::PaymentMethod, traits::AnalyticsStore};
use rpg_common::Money;

const BURST: i64 = 40;

#[tokio::test]
async fn concurrent_increments_conserve_the_daily_totals() {
    let (_dir, db) = new_db().await;
    let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

    let mut handles = Vec::with_capacity(BURST as usize);
    for i in 0..BURST {
        let db = db.clone();
        let method = if i % 2 == 0 { PaymentMethod::Online } else { PaymentMethod::Cod };
        handles.push(tokio::spawn(async move {
            db.increment_daily(date, Money::from_rupees(100 + i), method).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().expect("increment failed under load");
    }

    let aggregate = db.fetch_daily(date).await.unwrap().unwrap();
    assert_eq!(aggregate.total_orders, BURST);
    assert_eq!(aggregate.online_payments, BURST / 2);
    assert_eq!(aggregate.cod_orders, BURST / 2);
    // sum of (100 + i) rupees for i in 0..40
    let expected = Money::from_rupees(100 * BURST + BURST * (BURST - 1) / 2);
    assert_eq!(aggregate.total_revenue, expected);

    // A day with no orders reads back as absent, and ranges are oldest-first
    let empty = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
    assert!(db.fetch_daily(empty).await.unwrap().is_none());
    let range = db.fetch_range(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(), empty).await.unwrap();
    assert_eq!(range.len(), 1);
    assert_eq!(range[0].date, date);
}
