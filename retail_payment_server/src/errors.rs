use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use retail_payment_engine::PaymentEngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("{0}")]
    EngineError(#[from] PaymentEngineError),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::BAD_REQUEST,
                AuthError::RoleRevoked => StatusCode::FORBIDDEN,
            },
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::EngineError(e) => engine_error_status(e),
            Self::InitializeError(_) |
            Self::BackendError(_) |
            Self::IOError(_) |
            Self::ConfigurationError(_) |
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Every error leaves the server as `{"error": "..."}`. Internal detail (database messages, gateway
    /// payloads) stays in the logs.
    fn error_response(&self) -> HttpResponse {
        let message = match self {
            Self::EngineError(PaymentEngineError::DatabaseError(_)) |
            Self::EngineError(PaymentEngineError::Unexpected(_)) |
            Self::BackendError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": message }).to_string())
    }
}

fn engine_error_status(e: &PaymentEngineError) -> StatusCode {
    match e {
        PaymentEngineError::InvalidAmount => StatusCode::BAD_REQUEST,
        PaymentEngineError::InvalidState(_) => StatusCode::BAD_REQUEST,
        PaymentEngineError::VerificationFailed => StatusCode::BAD_REQUEST,
        PaymentEngineError::NotFound(_) => StatusCode::NOT_FOUND,
        PaymentEngineError::Conflict(_) => StatusCode::CONFLICT,
        PaymentEngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        PaymentEngineError::GatewayError { status_code, .. } => {
            StatusCode::from_u16(*status_code).unwrap_or(StatusCode::BAD_GATEWAY)
        },
        PaymentEngineError::ConfigurationError(_) |
        PaymentEngineError::DatabaseError(_) |
        PaymentEngineError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token provided.")]
    MissingToken,
    #[error("Access token signature is invalid. {0}")]
    ValidationError(String),
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("The role claimed by the token is no longer assigned to this user.")]
    RoleRevoked,
}
