//! Error types for the analysis engine
//!
//! Only validation failures (and a failed lookup of the primary component)
//! reach the caller. Graph construction problems, empty enumerations and
//! persistence failures are logged and folded into a valid summary.

use thiserror::Error;

/// Request rejected before any graph work
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("component_ids must not be empty")]
    EmptyComponentSet,

    #[error("primary_component_id is required")]
    MissingPrimaryComponent,

    #[error("primary component '{0}' is not part of component_ids")]
    PrimaryNotSelected(String),

    #[error("primary component '{0}' does not exist")]
    UnknownPrimaryComponent(String),

    #[error("analysis id '{0}' is already in use")]
    AnalysisIdInUse(String),
}

/// Errors that can occur while running an analysis
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("invalid analysis request: {0}")]
    Validation(#[from] ValidationError),

    #[error("component source failed: {0}")]
    Source(#[source] anyhow::Error),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl AnalysisError {
    /// Whether the error is the caller's fault (bad request) rather than ours
    pub fn is_validation(&self) -> bool {
        matches!(self, AnalysisError::Validation(_))
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors raised by the artifact store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] redb::Error),

    #[error("failed to encode or decode artifact: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("analysis '{0}' not found")]
    AnalysisNotFound(String),

    #[error("artifact store unavailable: {0}")]
    Unavailable(String),
}

// redb splits its errors by operation; funnel them into the umbrella type.
macro_rules! impl_from_redb {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for StoreError {
                fn from(err: $ty) -> Self {
                    StoreError::Database(err.into())
                }
            }
        )*
    };
}

impl_from_redb!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

pub type StoreResult<T> = Result<T, StoreError>;
