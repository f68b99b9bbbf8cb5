mod common;

use common::{provider_word, storage, wait_until_cached, MockProvider};
use wordbook::error::Error;
use wordbook::resolver::{Resolver, Source};
use wordbook::vocabulary;

#[tokio::test]
async fn saved_words_resolve_from_the_user_tier() {
    let storage = storage().await;
    vocabulary::enroll(
        &storage,
        1,
        "ember",
        "noun",
        "a glowing coal fragment, in my own words",
        Some("embers in the fireplace"),
    )
    .await
    .unwrap();

    let provider = MockProvider::empty();
    let resolver = Resolver::new(storage.clone(), provider.clone());
    let result = resolver.resolve("ember", Some(1)).await.unwrap();

    assert_eq!(result.source, Source::User);
    assert!(result.found_in_cache);
    assert_eq!(result.word, "ember");
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].part_of_speech, "noun");
    assert_eq!(
        result.groups[0].definitions[0].example.as_deref(),
        Some("embers in the fireplace")
    );
    // the user tier short-circuits; the provider must never be consulted
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn user_tier_matches_case_insensitively() {
    let storage = storage().await;
    vocabulary::enroll(&storage, 1, "Ember", "noun", "a glowing coal", None)
        .await
        .unwrap();

    let provider = MockProvider::empty();
    let resolver = Resolver::new(storage.clone(), provider.clone());
    let result = resolver.resolve("EMBER", Some(1)).await.unwrap();

    assert_eq!(result.source, Source::User);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn user_entries_across_parts_of_speech_become_groups() {
    let storage = storage().await;
    vocabulary::enroll(&storage, 1, "run", "verb", "to move fast", None)
        .await
        .unwrap();
    vocabulary::enroll(&storage, 1, "run", "noun", "a short trip", None)
        .await
        .unwrap();

    let resolver = Resolver::new(storage.clone(), MockProvider::empty());
    let result = resolver.resolve("run", Some(1)).await.unwrap();

    let tags: Vec<&str> = result
        .groups
        .iter()
        .map(|group| group.part_of_speech.as_str())
        .collect();
    assert_eq!(tags, ["noun", "verb"]);
}

#[tokio::test]
async fn canonical_words_resolve_without_the_provider() {
    let storage = storage().await;
    let provider = MockProvider::with_word(provider_word("lantern", "noun", "a portable light"));
    let resolver = Resolver::new(storage.clone(), provider.clone());

    // first resolve goes external and fills the cache
    let result = resolver.resolve("lantern", None).await.unwrap();
    assert_eq!(result.source, Source::External);
    assert!(!result.found_in_cache);
    assert_eq!(provider.calls(), 1);

    wait_until_cached(&storage, "lantern").await;

    // second resolve is served from the canonical store
    let result = resolver.resolve("lantern", None).await.unwrap();
    assert_eq!(result.source, Source::Canonical);
    assert!(result.found_in_cache);
    assert_eq!(result.pronunciation.as_deref(), Some("/lantern/"));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn anonymous_lookups_skip_the_user_tier() {
    let storage = storage().await;
    vocabulary::enroll(&storage, 1, "ember", "noun", "a glowing coal", None)
        .await
        .unwrap();

    // enrollment created a bare word row with no canonical definitions, so
    // an anonymous lookup has to go all the way to the provider
    let provider = MockProvider::with_word(provider_word("ember", "noun", "a small piece of burning coal"));
    let resolver = Resolver::new(storage.clone(), provider.clone());
    let result = resolver.resolve("ember", None).await.unwrap();

    assert_eq!(result.source, Source::External);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn unknown_words_are_not_found() {
    let storage = storage().await;
    let provider = MockProvider::empty();
    let resolver = Resolver::new(storage.clone(), provider.clone());

    let error = resolver.resolve("zzzzzz", None).await.unwrap_err();
    assert!(matches!(error, Error::NotFound));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn provider_transport_failures_are_distinct_from_not_found() {
    let storage = storage().await;
    let resolver = Resolver::new(storage.clone(), MockProvider::unavailable());

    let error = resolver.resolve("ember", None).await.unwrap_err();
    assert!(matches!(error, Error::Upstream(_)));
}

#[tokio::test]
async fn empty_terms_are_rejected_before_any_tier() {
    let storage = storage().await;
    let provider = MockProvider::empty();
    let resolver = Resolver::new(storage.clone(), provider.clone());

    assert!(matches!(
        resolver.resolve("", None).await.unwrap_err(),
        Error::InvalidInput(_)
    ));
    assert!(matches!(
        resolver.resolve("   ", Some(1)).await.unwrap_err(),
        Error::InvalidInput(_)
    ));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn grouping_orders_and_ranks_external_results() {
    let storage = storage().await;
    let word = dictionary::Word {
        word: "light".to_owned(),
        phonetic: None,
        phonetics: vec![dictionary::Phonetic {
            text: Some("/laɪt/".to_owned()),
            audio: Some("https://example.com/light.mp3".to_owned()),
        }],
        meanings: vec![
            dictionary::WordMeaning {
                part_of_speech: "adjective".to_owned(),
                definitions: vec![dictionary::WordDefinition {
                    definition: "having little weight".to_owned(),
                    example: None,
                    synonyms: vec!["weightless".to_owned()],
                    antonyms: vec!["heavy".to_owned()],
                }],
                synonyms: Vec::new(),
                antonyms: Vec::new(),
            },
            dictionary::WordMeaning {
                part_of_speech: "noun".to_owned(),
                definitions: vec![
                    dictionary::WordDefinition {
                        definition: "the natural agent that stimulates sight and makes things visible"
                            .to_owned(),
                        example: None,
                        synonyms: Vec::new(),
                        antonyms: Vec::new(),
                    },
                    dictionary::WordDefinition {
                        definition: "a source of illumination".to_owned(),
                        example: Some("turn on the light".to_owned()),
                        synonyms: Vec::new(),
                        antonyms: Vec::new(),
                    },
                ],
                synonyms: Vec::new(),
                antonyms: Vec::new(),
            },
        ],
    };
    let resolver = Resolver::new(storage.clone(), MockProvider::with_word(word));
    let result = resolver.resolve("light", None).await.unwrap();

    // noun outranks adjective even though the provider sent it second
    assert_eq!(result.groups[0].part_of_speech, "noun");
    assert_eq!(result.groups[1].part_of_speech, "adjective");
    // the definition with an example leads the primary subset
    assert_eq!(
        result.groups[0].primary[0].text,
        "a source of illumination"
    );
    assert_eq!(result.audio_url.as_deref(), Some("https://example.com/light.mp3"));
}
