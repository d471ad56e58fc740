use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Access denied")]
    Forbidden,
    #[error("Payment processing not configured")]
    PaymentNotConfigured,
    #[error("Payment gateway error: {0}")]
    PaymentGateway(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl DomainError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        DomainError::InvalidInput(msg.into())
    }
}
