use std::time::Duration;

use dictionary::Dictionary;
use tracing_subscriber::EnvFilter;

use wordbook::error::Error;
use wordbook::resolver::{LookupResult, Resolver, Source};
use wordbook::storage::Storage;
use wordbook::utilities::{input, str_to_bool};
use wordbook::vocabulary::{self, SuggestionKind, DEFAULT_PAGE_SIZE};

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let user = match std::env::args().nth(1) {
        Some(argument) => Some(argument.parse::<i64>().map_err(|_| {
            anyhow::anyhow!("the user id must be a number, got {argument:?}")
        })?),
        None => None,
    };

    let storage = Storage::initialize().await?;
    let resolver = Resolver::new(storage.clone(), Dictionary::new())
        .with_provider_timeout(PROVIDER_TIMEOUT);

    loop {
        let line = input(">> ")?;
        if line.is_empty() {
            // stdin closed
            break;
        }
        let line = line.trim();
        let mut command_parts = line.split_ascii_whitespace();
        if let Some(command) = command_parts.next() {
            let rest = command_parts.collect::<Vec<&str>>().join(" ");
            match command {
                "exit" | "leave" | "quit" | "e" | "q" | "l" => {
                    break;
                }
                "define" | "find" => {
                    define_word(&resolver, &storage, user, &rest).await?;
                }
                "suggest" => match user {
                    Some(user) => print_suggestions(&storage, user, &rest).await,
                    None => println!("Suggestions need a user id (pass one as the first argument)."),
                },
                "list" => match user {
                    Some(user) => {
                        let page = rest.parse::<u32>().unwrap_or(1);
                        print_vocabulary_page(&storage, user, page).await?;
                    }
                    None => println!("The vocabulary list needs a user id."),
                },
                _ => {
                    println!("Unknown command {command}.");
                }
            }
        }
    }
    Ok(())
}

async fn define_word<P: wordbook::resolver::DefinitionProvider>(
    resolver: &Resolver<P>,
    storage: &Storage,
    user: Option<i64>,
    word: &str,
) -> anyhow::Result<()> {
    match resolver.resolve(word, user).await {
        Ok(result) => {
            print_lookup(&result);
            if let Some(user) = user {
                if result.source != Source::User {
                    offer_to_save(storage, user, &result).await?;
                }
            }
        }
        Err(Error::NotFound) => {
            println!("Couldn't find the word you were looking for.");
        }
        Err(Error::InvalidInput(message)) => {
            println!("{message}");
        }
        Err(Error::Upstream(message)) => {
            println!("The dictionary service is unreachable right now: {message}");
        }
        Err(error) => {
            tracing::error!(%error, "lookup failed");
            println!("Something went wrong while looking up the word.");
        }
    }
    Ok(())
}

async fn offer_to_save(storage: &Storage, user: i64, result: &LookupResult) -> anyhow::Result<()> {
    let Some(group) = result.groups.first() else {
        return Ok(());
    };
    let Some(definition) = group.primary.first().or_else(|| group.definitions.first()) else {
        return Ok(());
    };
    let answer = input("Save this word to your vocabulary? (Y/n): ")?;
    if !str_to_bool(&answer).unwrap_or(false) {
        return Ok(());
    }
    let saved = vocabulary::enroll(
        storage,
        user,
        &result.word,
        &group.part_of_speech,
        &definition.text,
        definition.example.as_deref(),
    )
    .await;
    match saved {
        Ok(()) => println!("Saved the word successfully."),
        Err(Error::DuplicateEntry) => {
            println!("This word is already in your vocabulary for that part of speech.");
        }
        Err(error) => {
            tracing::error!(%error, "enrollment failed");
            println!("Failed to save the word.");
        }
    }
    Ok(())
}

async fn print_suggestions(storage: &Storage, user: i64, partial: &str) {
    let partial = partial.trim();
    if partial.chars().count() < 2 {
        println!("Type at least two characters to get suggestions.");
        return;
    }
    for suggestion in vocabulary::suggest(storage, user, partial).await {
        match suggestion.kind {
            SuggestionKind::Existing => {
                let tag = suggestion.part_of_speech.as_deref().unwrap_or("unknown");
                let preview = suggestion.preview.unwrap_or_default();
                println!("  {} ({tag}): {preview}", suggestion.word);
            }
            SuggestionKind::NewSearch => {
                println!("  search the dictionary for '{}'", suggestion.word);
            }
        }
    }
}

async fn print_vocabulary_page(storage: &Storage, user: i64, page: u32) -> anyhow::Result<()> {
    let page = vocabulary::vocabulary_page(storage, user, page, DEFAULT_PAGE_SIZE).await?;
    if page.words.is_empty() {
        println!("No saved words on this page.");
        return Ok(());
    }
    for entry in &page.words {
        println!("  {} ({}): {}", entry.word, entry.part_of_speech, entry.definition);
        if let Some(example) = &entry.example {
            println!("      example: {example}");
        }
    }
    println!(
        "Page {}/{} ({} words total).",
        page.page, page.total_pages, page.total
    );
    Ok(())
}

fn print_lookup(result: &LookupResult) {
    println!("Showing definition for '{}':", result.word);
    if let Some(pronunciation) = &result.pronunciation {
        println!("  pronunciation: {pronunciation}");
    }
    for group in &result.groups {
        println!("    {}:", group.part_of_speech);
        for definition in &group.definitions {
            println!("        {}", definition.text);
            if let Some(example) = &definition.example {
                println!("          example: {example}");
            }
            if !definition.synonyms.is_empty() {
                println!("          synonyms: {}", definition.synonyms.join(", "));
            }
            if !definition.antonyms.is_empty() {
                println!("          antonyms: {}", definition.antonyms.join(", "));
            }
        }
    }
    let origin = match result.source {
        Source::User => "your vocabulary",
        Source::Canonical => "the local dictionary",
        Source::External => "the online dictionary",
    };
    println!("  (from {origin})");
}
