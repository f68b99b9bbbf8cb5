use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy of the lookup and vocabulary services.
///
/// `InvalidInput` and `DuplicateEntry` are caller mistakes and carry a
/// message fit to show verbatim. `NotFound` and `Upstream` are recoverable.
/// `Database` is the internal bucket; callers should log it and show a
/// generic message.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("word not found")]
    NotFound,
    #[error("this word is already saved under that part of speech")]
    DuplicateEntry,
    #[error("the dictionary service is unavailable: {0}")]
    Upstream(String),
    #[error("invalid definition record: {0}")]
    InvalidDefinition(String),
    #[error("storage error: {0}")]
    Database(#[from] sqlx::Error),
}
