use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::grouping::{group_definitions, PartOfSpeechGroup};
use crate::normalize::{normalize, raw_definitions, Definition, RawDefinition};
use crate::storage::{NewWord, Storage};

/// Which tier answered a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    User,
    Canonical,
    External,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::User => "user",
            Source::Canonical => "canonical",
            Source::External => "external",
        }
    }
}

/// The shaped answer of a lookup: the word, its definition groups ordered
/// by display priority, and where the answer came from.
#[derive(Debug)]
pub struct LookupResult {
    pub word: String,
    pub pronunciation: Option<String>,
    pub audio_url: Option<String>,
    pub groups: Vec<PartOfSpeechGroup>,
    pub source: Source,
    pub found_in_cache: bool,
}

/// Seam to the external dictionary. The production implementation is
/// [`dictionary::Dictionary`]; tests substitute a recording mock.
#[async_trait]
pub trait DefinitionProvider: Send + Sync {
    async fn fetch_definitions(&self, word: &str) -> std::result::Result<dictionary::Word, ProviderError>;
}

#[derive(Debug)]
pub enum ProviderError {
    NotFound,
    Unavailable(String),
}

#[async_trait]
impl DefinitionProvider for dictionary::Dictionary {
    async fn fetch_definitions(&self, word: &str) -> std::result::Result<dictionary::Word, ProviderError> {
        self.get_definition(word).await.map_err(|error| match error {
            dictionary::DictionaryError::NotFound(_) => ProviderError::NotFound,
            other => ProviderError::Unavailable(other.to_string()),
        })
    }
}

/// The lookup tiers, cheapest first. `Resolved` and `NotFound` are the
/// terminal outcomes and are expressed as the return value.
#[derive(Debug, Clone, Copy)]
enum ResolveState {
    UserVocabulary,
    CanonicalCache,
    ExternalProvider,
}

pub struct Resolver<P> {
    storage: Storage,
    provider: P,
    provider_timeout: Option<Duration>,
}

impl<P: DefinitionProvider> Resolver<P> {
    pub fn new(storage: Storage, provider: P) -> Self {
        Self {
            storage,
            provider,
            provider_timeout: None,
        }
    }

    /// Bounds the external provider call. The two storage tiers are local
    /// and stay unbounded.
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = Some(timeout);
        self
    }

    /// Resolves `term` through the tiers: the user's vocabulary (when an
    /// identity is present), the canonical cache, then the external
    /// provider. The first tier that answers wins.
    pub async fn resolve(&self, term: &str, user_id: Option<i64>) -> Result<LookupResult> {
        let term = term.trim();
        if term.is_empty() {
            return Err(Error::InvalidInput("a word is required".to_owned()));
        }

        let mut state = match user_id {
            Some(_) => ResolveState::UserVocabulary,
            None => ResolveState::CanonicalCache,
        };
        loop {
            state = match state {
                ResolveState::UserVocabulary => {
                    // a saved entry is authoritative even when sparse; it
                    // never falls through to the deeper tiers
                    if let Some(result) = self.lookup_user_vocabulary(term, user_id).await? {
                        return Ok(result);
                    }
                    ResolveState::CanonicalCache
                }
                ResolveState::CanonicalCache => {
                    if let Some(result) = self.lookup_canonical(term).await? {
                        return Ok(result);
                    }
                    ResolveState::ExternalProvider
                }
                ResolveState::ExternalProvider => {
                    return self.lookup_external(term).await;
                }
            };
        }
    }

    async fn lookup_user_vocabulary(
        &self,
        term: &str,
        user_id: Option<i64>,
    ) -> Result<Option<LookupResult>> {
        let Some(user_id) = user_id else {
            return Ok(None);
        };
        let entries = self.storage.vocabulary_entries_for_word(user_id, term).await?;
        let Some(first) = entries.first() else {
            return Ok(None);
        };
        let word = first.word.clone();
        let pronunciation = first.pronunciation.clone();
        let definitions = self.normalize_all(entries.into_iter().map(|entry| RawDefinition {
            part_of_speech: Some(entry.part_of_speech),
            definition: Some(entry.definition),
            example: entry.example,
            synonyms: Vec::new(),
            antonyms: Vec::new(),
        }));
        if definitions.is_empty() {
            return Err(Error::NotFound);
        }
        Ok(Some(LookupResult {
            word,
            pronunciation,
            audio_url: None,
            groups: group_definitions(definitions),
            source: Source::User,
            found_in_cache: true,
        }))
    }

    async fn lookup_canonical(&self, term: &str) -> Result<Option<LookupResult>> {
        let Some(word) = self.storage.find_word_by_text(term).await? else {
            return Ok(None);
        };
        let rows = self.storage.definitions_for_word(word.id).await?;
        let definitions = self.normalize_all(rows.into_iter().map(|row| row.into_raw()));
        if definitions.is_empty() {
            // a bare word row, e.g. created by enrollment, is a cache miss
            return Ok(None);
        }
        Ok(Some(LookupResult {
            word: word.text,
            pronunciation: word.pronunciation,
            audio_url: word.audio_url,
            groups: group_definitions(definitions),
            source: Source::Canonical,
            found_in_cache: true,
        }))
    }

    async fn lookup_external(&self, term: &str) -> Result<LookupResult> {
        let fetched = match self.provider_timeout {
            Some(timeout) => {
                match tokio::time::timeout(timeout, self.provider.fetch_definitions(term)).await {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!(word = term, ?timeout, "dictionary lookup timed out");
                        return Err(Error::NotFound);
                    }
                }
            }
            None => self.provider.fetch_definitions(term).await,
        };
        let word = match fetched {
            Ok(word) => word,
            Err(ProviderError::NotFound) => return Err(Error::NotFound),
            Err(ProviderError::Unavailable(message)) => return Err(Error::Upstream(message)),
        };

        let record = NewWord {
            text: word.word.clone(),
            pronunciation: word.pronunciation().map(str::to_owned),
            audio_url: word.audio_url().map(str::to_owned),
        };
        let definitions = self.normalize_all(raw_definitions(&word).into_iter());
        if definitions.is_empty() {
            return Err(Error::NotFound);
        }

        self.spawn_cache_fill(record.clone(), definitions.clone());

        Ok(LookupResult {
            word: record.text,
            pronunciation: record.pronunciation,
            audio_url: record.audio_url,
            groups: group_definitions(definitions),
            source: Source::External,
            found_in_cache: false,
        })
    }

    /// Best-effort cache fill. Runs detached from the response; a failure
    /// is logged and swallowed.
    fn spawn_cache_fill(&self, word: NewWord, definitions: Vec<Definition>) {
        let storage = self.storage.clone();
        tokio::spawn(async move {
            if let Err(error) = storage.insert_word_with_definitions(&word, &definitions).await {
                tracing::warn!(word = %word.text, %error, "failed to cache dictionary result");
            }
        });
    }

    /// Normalizes a batch, dropping records with no definition text.
    fn normalize_all(&self, raw: impl Iterator<Item = RawDefinition>) -> Vec<Definition> {
        raw.filter_map(|record| match normalize(record) {
            Ok(definition) => Some(definition),
            Err(error) => {
                tracing::warn!(%error, "skipping malformed definition record");
                None
            }
        })
        .collect()
    }
}
