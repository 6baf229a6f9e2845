// Services layer: business rules between the HTTP handlers and storage
//
// Mutations follow the same order everywhere: fetch the target, report
// NotFound if it is missing, then apply the ownership policy, then write.

pub mod comment;
pub mod news;
pub mod tag;

pub use comment::CommentService;
pub use news::NewsService;
pub use tag::TagService;

use crate::api::common::ApiError;
use crate::storage::{DuplicateKey, NewsRow};
use funpage_core::Owned;

/// Errors raised by the services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("You are not allowed to modify this {0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Storage(anyhow::Error),
}

impl From<anyhow::Error> for ServiceError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<DuplicateKey>() {
            Ok(DuplicateKey(msg)) => ServiceError::Conflict(msg),
            Err(e) => ServiceError::Storage(e),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(_) => ApiError::NotFound(e.to_string()),
            ServiceError::Forbidden(_) => ApiError::Forbidden(e.to_string()),
            ServiceError::Conflict(msg) => ApiError::Conflict(msg),
            ServiceError::Storage(inner) => ApiError::Internal(inner),
        }
    }
}

impl Owned for NewsRow {
    fn owner(&self) -> &str {
        &self.author
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_duplicate_key_becomes_conflict() {
        let err = ServiceError::from(anyhow::Error::from(crate::storage::duplicate_username()));
        assert!(matches!(&err, ServiceError::Conflict(msg) if msg == "Username already taken"));
        assert_eq!(ApiError::from(err).status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_other_storage_errors_stay_internal() {
        let err = ServiceError::from(anyhow::anyhow!("connection reset"));
        assert!(matches!(err, ServiceError::Storage(_)));
        assert_eq!(
            ApiError::from(err).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
