use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Gateway request failed: {0}")]
    RequestError(String),
    #[error("Gateway request timed out")]
    Timeout,
    #[error("Could not deserialize gateway response: {0}")]
    JsonError(String),
    #[error("Gateway returned an error. Status {status}. {description}")]
    GatewayError { status: u16, description: String },
}

impl GatewayApiError {
    /// The HTTP status reported by the gateway, defaulting to 502 when the failure happened before a status was
    /// available (connection errors, timeouts).
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayApiError::GatewayError { status, .. } => *status,
            _ => 502,
        }
    }

    pub fn description(&self) -> String {
        match self {
            GatewayApiError::GatewayError { description, .. } => description.clone(),
            other => other.to_string(),
        }
    }
}
