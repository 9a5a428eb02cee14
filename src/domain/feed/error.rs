use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    #[error("listings service error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
}

impl From<AppError> for FeedError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => FeedError::Invalid(msg),
            _ => FeedError::Dependency(err.to_string()),
        }
    }
}

impl From<FeedError> for AppError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::Invalid(msg) => AppError::BadRequest(msg),
            FeedError::Dependency(msg) => AppError::ExternalService(msg),
        }
    }
}
