use thiserror::Error;

use crate::db_types::OrderId;

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Database query error: {0}")]
    QueryError(String),
    #[error("Database migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Cannot process duplicate order {0}")]
    DuplicateOrder(OrderId),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Stale write for order {0}: another transition won the race")]
    StaleOrderWrite(OrderId),
    #[error("Approval request {0} does not exist")]
    ApprovalRequestNotFound(String),
}

impl From<SqliteDatabaseError> for crate::traits::PaymentEngineError {
    fn from(e: SqliteDatabaseError) -> Self {
        use crate::traits::PaymentEngineError::*;
        match e {
            SqliteDatabaseError::DuplicateOrder(id) => Conflict(format!("Order {id} already exists")),
            SqliteDatabaseError::OrderNotFound(id) => NotFound(format!("Order {id}")),
            SqliteDatabaseError::StaleOrderWrite(id) => {
                Conflict(format!("Order {id} was modified by a concurrent transition"))
            },
            SqliteDatabaseError::ApprovalRequestNotFound(id) => NotFound(format!("Approval request {id}")),
            other => DatabaseError(other.to_string()),
        }
    }
}
