mod ids;
mod signature;
mod tax;

pub use ids::{is_gateway_payment_reference, new_invoice_number, new_order_id, new_refund_id, new_request_id};
pub use signature::{sign_callback, verify_callback};
pub use tax::{TaxCalculator, DEFAULT_GST_RATE_BPS};
