use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("The market data store has not been loaded yet")]
    NotLoaded,

    #[error("Failed to read the market data store: {0}")]
    Database(#[from] database::DbError),
}
