use chrono::{NaiveDate, Utc};
use rpg_common::Money;

use crate::{
    db_types::{DailyAggregate, PaymentMethod},
    traits::{AnalyticsStore, PaymentEngineError},
};

/// Read/write access to the daily revenue counters. All writes funnel into the store's single atomic upsert,
/// so the totals stay exact no matter how many payments land in the same instant.
pub struct AnalyticsApi<B> {
    db: B,
}

impl<B> AnalyticsApi<B>
where B: AnalyticsStore
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Counts one completed order worth `amount` against today's aggregate.
    pub async fn increment(&self, amount: Money, method: PaymentMethod) -> Result<DailyAggregate, PaymentEngineError> {
        self.db.increment_daily(Utc::now().date_naive(), amount, method).await
    }

    pub async fn daily_summary(&self, date: NaiveDate) -> Result<Option<DailyAggregate>, PaymentEngineError> {
        self.db.fetch_daily(date).await
    }

    /// Aggregates for every day in `[from, to]` that saw at least one order, oldest first.
    pub async fn summary_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DailyAggregate>, PaymentEngineError> {
        if from > to {
            return Err(PaymentEngineError::invalid_state(format!("Invalid date range: {from} is after {to}")));
        }
        self.db.fetch_range(from, to).await
    }
}
