use serde::Deserialize;

use crate::dictionary::{Phonetic, Word, WordDefinition, WordMeaning};
use crate::{DictionaryError, NotFoundError};

const DICTIONARY_API_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

pub(crate) async fn get_definition(
    client: &reqwest::Client,
    word: &str,
) -> Result<Word, DictionaryError> {
    let url = format!("{DICTIONARY_API_URL}/{word}");
    let res = client
        .get(&url)
        .send()
        .await
        .map_err(DictionaryError::Fetch)?;
    if res.status() == reqwest::StatusCode::NOT_FOUND {
        let body = res
            .json::<NotFoundResponse>()
            .await
            .unwrap_or_else(|_| NotFoundResponse {
                message: format!("No definitions found for \"{word}\"."),
            });
        return Err(DictionaryError::NotFound(NotFoundError {
            message: body.message,
        }));
    }
    if !res.status().is_success() {
        return Err(DictionaryError::Status(res.status()));
    }
    let entries = res
        .json::<Vec<WordEntry>>()
        .await
        .map_err(DictionaryError::Deserialize)?;
    merge_entries(word, entries)
}

/// The api answers with one entry per homograph. They all describe the same
/// spelling, so the meanings are flattened into a single word.
fn merge_entries(word: &str, entries: Vec<WordEntry>) -> Result<Word, DictionaryError> {
    let mut entries = entries.into_iter();
    let first = entries.next().ok_or_else(|| {
        DictionaryError::NotFound(NotFoundError {
            message: format!("No definitions found for \"{word}\"."),
        })
    })?;
    let mut merged = Word {
        word: first.word,
        phonetic: first.phonetic,
        phonetics: first
            .phonetics
            .into_iter()
            .map(|p| Phonetic {
                text: p.text,
                audio: p.audio,
            })
            .collect(),
        meanings: first.meanings.into_iter().map(WordMeaning::from).collect(),
    };
    for entry in entries {
        merged
            .meanings
            .extend(entry.meanings.into_iter().map(WordMeaning::from));
    }
    Ok(merged)
}

#[derive(Debug, Deserialize)]
struct WordEntry {
    word: String,
    phonetic: Option<String>,
    #[serde(default)]
    phonetics: Vec<PhoneticEntry>,
    #[serde(default)]
    meanings: Vec<MeaningEntry>,
}

#[derive(Debug, Deserialize)]
struct PhoneticEntry {
    text: Option<String>,
    audio: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeaningEntry {
    part_of_speech: String,
    #[serde(default)]
    definitions: Vec<DefinitionEntry>,
    #[serde(default)]
    synonyms: Vec<String>,
    #[serde(default)]
    antonyms: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DefinitionEntry {
    definition: String,
    example: Option<String>,
    #[serde(default)]
    synonyms: Vec<String>,
    #[serde(default)]
    antonyms: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct NotFoundResponse {
    message: String,
}

impl From<MeaningEntry> for WordMeaning {
    fn from(entry: MeaningEntry) -> Self {
        WordMeaning {
            part_of_speech: entry.part_of_speech,
            definitions: entry
                .definitions
                .into_iter()
                .map(|def| WordDefinition {
                    definition: def.definition,
                    example: def.example,
                    synonyms: def.synonyms,
                    antonyms: def.antonyms,
                })
                .collect(),
            synonyms: entry.synonyms,
            antonyms: entry.antonyms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[{
        "word": "run",
        "phonetic": "/ɹʌn/",
        "phonetics": [{"text": "/ɹʌn/", "audio": ""}, {"audio": "https://example.com/run.mp3"}],
        "meanings": [
            {
                "partOfSpeech": "verb",
                "definitions": [
                    {"definition": "To move swiftly.", "synonyms": ["sprint"], "antonyms": []},
                    {"definition": "To flow.", "example": "The river runs."}
                ],
                "synonyms": ["dash"],
                "antonyms": ["walk"]
            }
        ]
    },
    {
        "word": "run",
        "meanings": [
            {"partOfSpeech": "noun", "definitions": [{"definition": "Act of running."}]}
        ]
    }]"#;

    #[test]
    fn parses_and_merges_entries() {
        let entries: Vec<WordEntry> = serde_json::from_str(SAMPLE).unwrap();
        let word = merge_entries("run", entries).unwrap();
        assert_eq!(word.word, "run");
        assert_eq!(word.pronunciation(), Some("/ɹʌn/"));
        assert_eq!(word.audio_url(), Some("https://example.com/run.mp3"));
        assert_eq!(word.meanings.len(), 2);
        assert_eq!(word.meanings[0].part_of_speech, "verb");
        assert_eq!(word.meanings[0].definitions[1].example.as_deref(), Some("The river runs."));
        assert_eq!(word.meanings[1].part_of_speech, "noun");
    }

    #[test]
    fn missing_optional_fields_default() {
        let entries: Vec<WordEntry> =
            serde_json::from_str(r#"[{"word": "x", "meanings": []}]"#).unwrap();
        assert!(entries[0].phonetics.is_empty());
        assert!(entries[0].phonetic.is_none());
    }

    #[test]
    fn no_entries_is_not_found() {
        let error = merge_entries("ghost", Vec::new()).unwrap_err();
        assert!(matches!(error, DictionaryError::NotFound(_)));
    }
}
