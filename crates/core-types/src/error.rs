use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid year {0}: expected a 4-digit year")]
    InvalidYear(i64),

    #[error("invalid symbol '{0}'")]
    InvalidSymbol(String),
}
