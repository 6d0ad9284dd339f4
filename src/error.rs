use thiserror::Error;

/// Errors surfaced at the store/service boundary. Nothing here is
/// process-fatal; each error is scoped to the single operation that
/// triggered it.
#[derive(Debug, Error)]
pub enum Error {
    /// A feedback append referenced an unknown property/filename or carried
    /// an out-of-enum value.
    #[error("validation error: {0}")]
    Validation(String),

    /// A lookup for a resource that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An opaque classifier failure (network, malformed response, provider
    /// error). Scoped to one image inside the pipeline.
    #[error("classifier failure: {0}")]
    Classifier(String),

    /// Persistence failure in the case/feedback store.
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
