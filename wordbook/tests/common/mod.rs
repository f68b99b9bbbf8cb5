#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use wordbook::resolver::{DefinitionProvider, ProviderError};
use wordbook::storage::Storage;

/// In-memory stand-in for the dictionary service that records how often it
/// was asked.
#[derive(Clone, Default)]
pub struct MockProvider {
    words: HashMap<String, dictionary::Word>,
    unavailable: bool,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_word(word: dictionary::Word) -> Self {
        let mut provider = Self::default();
        provider.words.insert(word.word.to_lowercase(), word);
        provider
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DefinitionProvider for MockProvider {
    async fn fetch_definitions(
        &self,
        word: &str,
    ) -> Result<dictionary::Word, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(ProviderError::Unavailable("connection refused".to_owned()));
        }
        self.words
            .get(&word.to_lowercase())
            .cloned()
            .ok_or(ProviderError::NotFound)
    }
}

pub async fn storage() -> Storage {
    Storage::in_memory().await.expect("in-memory storage")
}

pub fn provider_word(text: &str, tag: &str, definition: &str) -> dictionary::Word {
    dictionary::Word {
        word: text.to_owned(),
        phonetic: Some(format!("/{text}/")),
        phonetics: Vec::new(),
        meanings: vec![dictionary::WordMeaning {
            part_of_speech: tag.to_owned(),
            definitions: vec![dictionary::WordDefinition {
                definition: definition.to_owned(),
                example: None,
                synonyms: Vec::new(),
                antonyms: Vec::new(),
            }],
            synonyms: Vec::new(),
            antonyms: Vec::new(),
        }],
    }
}

/// The resolver fills the cache on a detached task, so the tests poll for
/// the write instead of assuming it happened before the response.
pub async fn wait_until_cached(storage: &Storage, text: &str) {
    for _ in 0..100 {
        if let Some(word) = storage.find_word_by_text(text).await.expect("lookup") {
            let definitions = storage
                .definitions_for_word(word.id)
                .await
                .expect("definitions");
            if !definitions.is_empty() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("'{text}' never showed up in the canonical store");
}
