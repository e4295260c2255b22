use core_types::CoreError;
use thiserror::Error;
use timeseries::StoreError;

/// Why a query did not produce its success payload.
///
/// `NotFound` is folded into the operation's own result at the operation
/// boundary; the other two reject the call.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<CoreError> for QueryError {
    fn from(err: CoreError) -> Self {
        QueryError::InvalidArgument(err.to_string())
    }
}

impl From<StoreError> for QueryError {
    fn from(err: StoreError) -> Self {
        QueryError::StoreUnavailable(err.to_string())
    }
}
