use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use log::error;
use ruvab_payment_engine::{CheckoutError, SqliteDatabaseError};
use thiserror::Error;

use crate::data_objects::JsonResponse;

/// The message shown for any problem the customer can do nothing about.
const GENERIC_FAILURE: &str = "Payment could not be processed, please try again";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("Payment verification failed")]
    InvalidSignature,
    #[error("The payment gateway could not complete the request. {0}")]
    GatewayError(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The request conflicts with the current state of the order. {0}")]
    Conflict(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::GatewayError(_) => StatusCode::BAD_GATEWAY,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    /// Validation, lookup and state errors are shown as they are. Everything that happens behind the server (the
    /// database, configuration and the gateway) is logged in full and summarised for the client.
    fn error_response(&self) -> HttpResponse {
        let message = match self {
            Self::InvalidRequestBody(_) |
            Self::InvalidRequestPath(_) |
            Self::InvalidSignature |
            Self::NoRecordFound(_) |
            Self::Conflict(_) => self.to_string(),
            _ => {
                error!("💻️ {self}");
                GENERIC_FAILURE.to_string()
            },
        };
        HttpResponse::build(self.status_code()).json(JsonResponse::failure(message))
    }
}

impl From<CheckoutError> for ServerError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::GatewayUnavailable | CheckoutError::VerificationUnavailable => {
                Self::ConfigurationError(e.to_string())
            },
            CheckoutError::InvalidRequest(msg) => Self::InvalidRequestBody(msg),
            CheckoutError::InvalidSignature => Self::InvalidSignature,
            CheckoutError::GatewayError(e) => Self::GatewayError(e.to_string()),
            CheckoutError::OrderNotFound(id) => Self::NoRecordFound(format!("Order {id} does not exist")),
            CheckoutError::IllegalTransition { .. } | CheckoutError::OrderUnchanged => Self::Conflict(e.to_string()),
            CheckoutError::PaymentConflict(_) => Self::Conflict(e.to_string()),
            CheckoutError::PaymentNotCaptured { .. } => Self::Conflict(e.to_string()),
            CheckoutError::DatabaseError(s) => Self::BackendError(format!("Database error: {s}")),
        }
    }
}

impl From<SqliteDatabaseError> for ServerError {
    fn from(e: SqliteDatabaseError) -> Self {
        Self::InitializeError(e.to_string())
    }
}

