use crate::error::{Error, Result};

/// Part of speech tag assigned when a source does not carry one.
pub const UNKNOWN_TAG: &str = "unknown";

/// A definition as it arrives from a source, before any cleanup. Both the
/// dictionary provider and the storage rows are funneled through this shape.
#[derive(Debug, Default, Clone)]
pub struct RawDefinition {
    pub part_of_speech: Option<String>,
    pub definition: Option<String>,
    pub example: Option<String>,
    pub synonyms: Vec<String>,
    pub antonyms: Vec<String>,
}

/// The canonical in-memory definition: trimmed text, lowercased tag, empty
/// collections instead of missing ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub part_of_speech: String,
    pub text: String,
    pub example: Option<String>,
    pub synonyms: Vec<String>,
    pub antonyms: Vec<String>,
}

pub fn normalize(raw: RawDefinition) -> Result<Definition> {
    let text = raw
        .definition
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    if text.is_empty() {
        return Err(Error::InvalidDefinition(
            "definition text is missing".to_owned(),
        ));
    }
    let part_of_speech = raw
        .part_of_speech
        .as_deref()
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .unwrap_or(UNKNOWN_TAG)
        .to_lowercase();
    let example = raw
        .example
        .as_deref()
        .map(str::trim)
        .filter(|example| !example.is_empty())
        .map(str::to_owned);
    Ok(Definition {
        part_of_speech,
        text: text.to_owned(),
        example,
        synonyms: clean_list(raw.synonyms),
        antonyms: clean_list(raw.antonyms),
    })
}

/// Flattens a provider word into raw definitions, carrying the meaning
/// level synonym and antonym lists down onto each definition.
pub fn raw_definitions(word: &dictionary::Word) -> Vec<RawDefinition> {
    word.meanings
        .iter()
        .flat_map(|meaning| {
            meaning.definitions.iter().map(|definition| RawDefinition {
                part_of_speech: Some(meaning.part_of_speech.clone()),
                definition: Some(definition.definition.clone()),
                example: definition.example.clone(),
                synonyms: meaning
                    .synonyms
                    .iter()
                    .chain(definition.synonyms.iter())
                    .cloned()
                    .collect(),
                antonyms: meaning
                    .antonyms
                    .iter()
                    .chain(definition.antonyms.iter())
                    .cloned()
                    .collect(),
            })
        })
        .collect()
}

fn clean_list(list: Vec<String>) -> Vec<String> {
    list.into_iter()
        .map(|entry| entry.trim().to_owned())
        .filter(|entry| !entry.is_empty())
        .collect()
}
