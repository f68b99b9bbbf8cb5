use crate::error::{Error, Result};
use crate::storage::{is_unique_violation, Storage, VocabularyRow};
use crate::utilities::truncate_chars;

/// How many existing-word suggestions a partial term may produce.
pub const SUGGESTION_LIMIT: u32 = 5;

/// Length of the definition preview attached to a suggestion.
pub const PREVIEW_CHARS: usize = 60;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    /// A word already in the user's vocabulary.
    Existing,
    /// The trailing entry that triggers a fresh dictionary search.
    NewSearch,
}

#[derive(Debug, Clone)]
pub struct Suggestion {
    pub word: String,
    pub kind: SuggestionKind,
    pub part_of_speech: Option<String>,
    pub preview: Option<String>,
}

/// One page of a user's saved words, newest first.
#[derive(Debug)]
pub struct VocabularyPage {
    pub words: Vec<VocabularyRow>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Saves a word into the user's vocabulary.
///
/// The word row is created on demand; an unrecognized part of speech tag is
/// enrolled under the `unknown` sentinel, never as a missing reference. The
/// same (user, word, part of speech) triple cannot be saved twice: the
/// second attempt fails with [`Error::DuplicateEntry`]. The check is the
/// database unique index, so two concurrent enrollments cannot both win.
pub async fn enroll(
    storage: &Storage,
    user_id: i64,
    word_text: &str,
    part_of_speech: &str,
    definition: &str,
    example: Option<&str>,
) -> Result<()> {
    let word_text = word_text.trim();
    if word_text.is_empty() {
        return Err(Error::InvalidInput("a word is required".to_owned()));
    }
    let definition = definition.trim();
    if definition.is_empty() {
        return Err(Error::InvalidInput("a definition is required".to_owned()));
    }
    let tag = part_of_speech.trim().to_lowercase();

    let word = storage.find_or_create_word(word_text).await?;
    let part_of_speech_id = match storage.part_of_speech_id(&tag).await? {
        Some(id) => id,
        None => storage.unknown_part_of_speech_id().await?,
    };
    let example = example.map(str::trim).filter(|example| !example.is_empty());

    storage
        .insert_vocabulary_entry(user_id, word.id, part_of_speech_id, definition, example)
        .await
        .map(|_| ())
        .map_err(|error| {
            if is_unique_violation(&error) {
                Error::DuplicateEntry
            } else {
                Error::Database(error)
            }
        })
}

/// Builds autocomplete suggestions for a partial term from the user's
/// vocabulary. Always ends with exactly one `NewSearch` suggestion carrying
/// the literal term, so the caller can fall back to a dictionary search
/// even when nothing matched, and even when the search itself failed.
pub async fn suggest(storage: &Storage, user_id: i64, partial_term: &str) -> Vec<Suggestion> {
    let mut suggestions = match storage
        .search_vocabulary(user_id, partial_term, SUGGESTION_LIMIT)
        .await
    {
        Ok(rows) => rows
            .into_iter()
            .map(|row| Suggestion {
                word: row.word,
                kind: SuggestionKind::Existing,
                part_of_speech: Some(row.part_of_speech),
                preview: Some(truncate_chars(&row.definition, PREVIEW_CHARS)),
            })
            .collect(),
        Err(error) => {
            tracing::warn!(user_id, %error, "vocabulary search failed, degrading to dictionary search");
            Vec::new()
        }
    };
    suggestions.push(Suggestion {
        word: partial_term.to_owned(),
        kind: SuggestionKind::NewSearch,
        part_of_speech: None,
        preview: None,
    });
    suggestions
}

/// One page of the user's vocabulary with paging totals.
pub async fn vocabulary_page(
    storage: &Storage,
    user_id: i64,
    page: u32,
    page_size: u32,
) -> Result<VocabularyPage> {
    let page = page.max(1);
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    let total = storage.count_vocabulary(user_id).await?;
    let words = storage
        .vocabulary_page(user_id, page_size, (page - 1) * page_size)
        .await?;
    let total_pages = (total as u32).div_ceil(page_size);
    Ok(VocabularyPage {
        words,
        total,
        page,
        page_size,
        total_pages,
    })
}
