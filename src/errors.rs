use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    #[error("Payment processing not configured")]
    PaymentNotConfigured,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound(what) => AppError::NotFound(what),
            DomainError::InvalidInput(msg) => AppError::BadRequest(msg),
            DomainError::Unauthenticated => AppError::Unauthorized,
            DomainError::Forbidden => AppError::Forbidden,
            DomainError::PaymentNotConfigured => AppError::PaymentNotConfigured,
            DomainError::PaymentGateway(msg) => AppError::PaymentFailed(msg),
            DomainError::Persistence(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PaymentFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::PaymentNotConfigured | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Internal(detail) => {
                log::error!("request failed: {detail}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound("Order").error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(err.error_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn payment_errors() {
        assert_eq!(
            AppError::PaymentFailed("declined".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::PaymentNotConfigured.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_display() {
        assert_eq!(AppError::NotFound("Order").to_string(), "Order not found");
    }

    #[test]
    fn domain_invalid_input_maps_to_bad_request() {
        let app_err: AppError = DomainError::InvalidInput("bad value".to_string()).into();
        assert!(matches!(app_err, AppError::BadRequest(_)));
        assert_eq!(app_err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn domain_persistence_maps_to_internal() {
        let app_err: AppError = DomainError::Persistence("oops".to_string()).into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }

    #[test]
    fn domain_gateway_maps_to_payment_failed() {
        let app_err: AppError = DomainError::PaymentGateway("timeout".to_string()).into();
        assert_eq!(app_err.to_string(), "Payment failed: timeout");
    }
}
