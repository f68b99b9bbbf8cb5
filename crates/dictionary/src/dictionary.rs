#[derive(Debug, Clone)]
pub struct Word {
    pub word: String,
    pub phonetic: Option<String>,
    pub phonetics: Vec<Phonetic>,
    pub meanings: Vec<WordMeaning>,
}

impl Word {
    /// The first phonetic transcription, preferring the top level one.
    pub fn pronunciation(&self) -> Option<&str> {
        self.phonetic
            .as_deref()
            .or_else(|| self.phonetics.iter().find_map(|p| p.text.as_deref()))
    }

    /// The first usable audio url among the phonetic entries. The api
    /// sometimes sends an empty string instead of omitting the field.
    pub fn audio_url(&self) -> Option<&str> {
        self.phonetics
            .iter()
            .find_map(|p| p.audio.as_deref().filter(|audio| !audio.is_empty()))
    }
}

#[derive(Debug, Clone)]
pub struct Phonetic {
    pub text: Option<String>,
    pub audio: Option<String>,
}

/// A sense of the word under a single part of speech tag. Tags are kept as
/// raw strings because the upstream vocabulary is open ended ("noun",
/// "verb", but also things like "exclamation" or "phrasal verb").
#[derive(Debug, Clone)]
pub struct WordMeaning {
    pub part_of_speech: String,
    pub definitions: Vec<WordDefinition>,
    pub synonyms: Vec<String>,
    pub antonyms: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct WordDefinition {
    pub definition: String,
    pub example: Option<String>,
    pub synonyms: Vec<String>,
    pub antonyms: Vec<String>,
}
