//! Application services orchestrating domain logic and side effects.
pub mod completion;
pub mod form;
pub mod preview;
pub mod registry;
pub mod upload;

/// Convenience alias for service results.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by service operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("form is missing a required file")]
    IncompleteForm,
    #[error("form has invalid fields")]
    InvalidFields,
    #[error("failed to read multipart upload: {0}")]
    Multipart(String),
    #[error("preview not found")]
    PreviewNotFound,
}
