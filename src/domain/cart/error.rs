use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

impl From<AppError> for CartError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Storage(msg) => CartError::Storage(msg),
            AppError::Serialization(e) => CartError::InvalidSnapshot(e.to_string()),
            _ => CartError::Storage(err.to_string()),
        }
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::Storage(msg) => AppError::Storage(msg),
            CartError::InvalidSnapshot(msg) => AppError::Storage(msg),
        }
    }
}
