use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;

use crate::services::payment_gateway::GatewayError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Listing is not available")]
    NotAvailable,

    #[error("You cannot purchase your own listing")]
    SelfPurchase,

    #[error("Listing was already sold")]
    AlreadySold,

    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),

    #[error("Payment gateway is not configured")]
    GatewayUnavailable,

    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Token(_) => StatusCode::UNAUTHORIZED,
            AppError::NotAvailable => StatusCode::BAD_REQUEST,
            AppError::SelfPurchase => StatusCode::BAD_REQUEST,
            AppError::AlreadySold => StatusCode::CONFLICT,
            AppError::DataIntegrity(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::GatewayUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Gateway(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_type = match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Authentication(_) => "AUTHENTICATION_ERROR",
            AppError::Authorization(_) => "AUTHORIZATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Token(_) => "AUTHENTICATION_ERROR",
            AppError::NotAvailable => "LISTING_UNAVAILABLE",
            AppError::SelfPurchase => "SELF_PURCHASE",
            AppError::AlreadySold => "ALREADY_SOLD",
            AppError::DataIntegrity(_) => "DATA_INTEGRITY",
            AppError::GatewayUnavailable => "GATEWAY_UNAVAILABLE",
            AppError::Gateway(_) => "GATEWAY_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        };

        // 5xx bodies must not leak internals
        let message = if status_code.is_server_error() {
            match self {
                AppError::DataIntegrity(_) | AppError::GatewayUnavailable => self.to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        };

        HttpResponse::build(status_code).json(ErrorResponse {
            error: error_type.to_string(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_errors_map_to_contract_statuses() {
        assert_eq!(AppError::NotAvailable.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::SelfPurchase.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::AlreadySold.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::DataIntegrity("ownerless listing".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::GatewayUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn database_errors_do_not_leak_details() {
        let err = AppError::Internal("connection string exposed".into());
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
