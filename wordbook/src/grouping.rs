use std::collections::HashMap;
use std::sync::OnceLock;

use crate::normalize::Definition;

/// Priority assigned to tags that are not in the display table.
pub const UNRANKED_PRIORITY: u32 = 99;

/// How many definitions a group shows before the caller expands it.
pub const PRIMARY_LIMIT: usize = 2;

/// Definitions of one word that share a part of speech, ordered for
/// display. `primary` is the ranked subset shown collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartOfSpeechGroup {
    pub part_of_speech: String,
    pub priority: u32,
    pub definitions: Vec<Definition>,
    pub primary: Vec<Definition>,
}

/// Display order of the common parts of speech. Built once, never mutated.
fn priority_table() -> &'static HashMap<&'static str, u32> {
    static TABLE: OnceLock<HashMap<&'static str, u32>> = OnceLock::new();
    TABLE.get_or_init(|| {
        HashMap::from([
            ("noun", 1),
            ("verb", 2),
            ("adjective", 3),
            ("adverb", 4),
            ("pronoun", 5),
            ("preposition", 6),
            ("conjunction", 7),
            ("interjection", 8),
        ])
    })
}

pub fn priority_for(tag: &str) -> u32 {
    priority_table().get(tag).copied().unwrap_or(UNRANKED_PRIORITY)
}

/// Groups normalized definitions by part of speech and orders the groups by
/// display priority. Within a group, definitions keep the order the source
/// produced them in; groups with equal priority keep first-seen order.
pub fn group_definitions(definitions: Vec<Definition>) -> Vec<PartOfSpeechGroup> {
    let mut groups: Vec<PartOfSpeechGroup> = Vec::new();
    for definition in definitions {
        match groups
            .iter_mut()
            .find(|group| group.part_of_speech == definition.part_of_speech)
        {
            Some(group) => group.definitions.push(definition),
            None => groups.push(PartOfSpeechGroup {
                priority: priority_for(&definition.part_of_speech),
                part_of_speech: definition.part_of_speech.clone(),
                definitions: vec![definition],
                primary: Vec::new(),
            }),
        }
    }
    // sort_by_key is stable, so equal priorities stay in first-seen order
    groups.sort_by_key(|group| group.priority);
    for group in &mut groups {
        group.primary = select_primary(&group.definitions);
    }
    groups
}

/// Ranks a group's definitions for the collapsed view: definitions with an
/// example first, shorter text first among equals, capped at
/// [`PRIMARY_LIMIT`]. The sort is stable so equal keys keep source order.
fn select_primary(definitions: &[Definition]) -> Vec<Definition> {
    let mut ranked = definitions.to_vec();
    ranked.sort_by_key(|definition| (definition.example.is_none(), definition.text.len()));
    ranked.truncate(PRIMARY_LIMIT);
    ranked
}
