use arbor_types::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("tree error: {0}")]
    Tree(#[from] arbor_tree::TreeError),

    #[error("store error: {0}")]
    Store(#[from] arbor_store::StoreError),

    /// The blocking task running a store call panicked or was cancelled.
    #[error("background task failed: {0}")]
    Runtime(#[from] tokio::task::JoinError),

    /// A callback operation was started outside a Tokio runtime.
    #[error("no Tokio runtime is running")]
    NoRuntime,
}

pub type SdkResult<T> = Result<T, SdkError>;
