use dictionary_api::get_definition;
use thiserror::Error;

mod dictionary;
mod dictionary_api;

pub use dictionary::{Phonetic, Word, WordDefinition, WordMeaning};

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("failed to reach the dictionary service: {0}")]
    Fetch(reqwest::Error),
    #[error("unexpected response from the dictionary service: {0}")]
    Deserialize(reqwest::Error),
    #[error("the dictionary service answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("{0}")]
    NotFound(NotFoundError),
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct NotFoundError {
    pub(crate) message: String,
}

impl NotFoundError {
    pub fn message(&self) -> &str {
        &self.message
    }
}

pub struct Dictionary {
    client: reqwest::Client,
}

impl Dictionary {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub async fn get_definition(&self, word: &str) -> Result<Word, DictionaryError> {
        get_definition(&self.client, word).await
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}
