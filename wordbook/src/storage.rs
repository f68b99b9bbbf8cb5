use chrono::NaiveDateTime;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{migrate::MigrateDatabase, query, query_as, FromRow, Pool, Sqlite, SqlitePool};

use crate::normalize::{Definition, RawDefinition, UNKNOWN_TAG};

const DB_URL: &str = "sqlite://wordbook.db";

/// A row of the canonical `words` table.
#[derive(Debug, FromRow)]
pub struct WordRow {
    pub id: i64,
    pub text: String,
    pub pronunciation: Option<String>,
    pub audio_url: Option<String>,
}

/// A canonical definition row, joined with its part of speech tag.
#[derive(Debug, FromRow)]
pub struct DefinitionRow {
    pub id: i64,
    pub part_of_speech: String,
    pub definition: String,
    pub example: Option<String>,
    pub synonyms: String,
    pub antonyms: String,
}

impl DefinitionRow {
    /// Stored rows go back through the normalizer like any other source, so
    /// the synonym lists are decoded here without failing the row.
    pub fn into_raw(self) -> RawDefinition {
        RawDefinition {
            part_of_speech: Some(self.part_of_speech),
            definition: Some(self.definition),
            example: self.example,
            synonyms: decode_list(&self.synonyms),
            antonyms: decode_list(&self.antonyms),
        }
    }
}

/// One saved word of one user, joined with the word and tag tables.
#[derive(Debug, FromRow)]
pub struct VocabularyRow {
    pub id: i64,
    pub word: String,
    pub pronunciation: Option<String>,
    pub part_of_speech: String,
    pub definition: String,
    pub example: Option<String>,
    pub added_at: NaiveDateTime,
}

/// The fields of a word the resolver wants cached after an external hit.
#[derive(Debug, Clone)]
pub struct NewWord {
    pub text: String,
    pub pronunciation: Option<String>,
    pub audio_url: Option<String>,
}

const VOCABULARY_SELECT: &str = "
    SELECT v.id, w.text AS word, w.pronunciation, pos.tag AS part_of_speech,
           v.definition, v.example, v.added_at
    FROM vocabulary v
    JOIN words w ON w.id = v.word_id
    JOIN parts_of_speech pos ON pos.id = v.part_of_speech_id
";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn initialize() -> sqlx::Result<Self> {
        let url = std::env::var("WORDBOOK_DB").unwrap_or_else(|_| DB_URL.to_owned());
        if !Sqlite::database_exists(&url).await.unwrap_or(false) {
            Sqlite::create_database(&url).await?;
        }
        Self::connect(&url).await
    }

    pub async fn connect(url: &str) -> sqlx::Result<Self> {
        let pool = SqlitePool::connect(url).await?;
        sqlx::migrate!().run(&pool).await?;
        Ok(Self { pool })
    }

    /// A private in-memory database, used by the tests. The pool is capped
    /// at a single connection because every sqlite `:memory:` connection is
    /// its own database.
    pub async fn in_memory() -> sqlx::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        sqlx::migrate!().run(&pool).await?;
        Ok(Self { pool })
    }
}

impl Storage {
    pub async fn find_word_by_text(&self, text: &str) -> sqlx::Result<Option<WordRow>> {
        query_as::<_, WordRow>(
            "SELECT id, text, pronunciation, audio_url FROM words WHERE text = ?1 COLLATE NOCASE",
        )
        .bind(text)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn definitions_for_word(&self, word_id: i64) -> sqlx::Result<Vec<DefinitionRow>> {
        query_as::<_, DefinitionRow>(
            "
            SELECT d.id, pos.tag AS part_of_speech, d.definition, d.example, d.synonyms, d.antonyms
            FROM definitions d
            JOIN parts_of_speech pos ON pos.id = d.part_of_speech_id
            WHERE d.word_id = ?1
            ORDER BY d.id
            ",
        )
        .bind(word_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Cache fill after an external hit. Leaves existing words untouched; a
    /// concurrent fill of the same word surfaces as a constraint error the
    /// caller is expected to swallow.
    pub async fn insert_word_with_definitions(
        &self,
        word: &NewWord,
        definitions: &[Definition],
    ) -> sqlx::Result<()> {
        let mut tx = self.pool.begin().await?;
        let existing: Option<(i64,)> =
            query_as("SELECT id FROM words WHERE text = ?1 COLLATE NOCASE")
                .bind(&word.text)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_some() {
            return Ok(());
        }
        let word_id = query("INSERT INTO words(text, pronunciation, audio_url) VALUES (?1, ?2, ?3)")
            .bind(&word.text)
            .bind(&word.pronunciation)
            .bind(&word.audio_url)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
        for definition in definitions {
            let tag_id: Option<(i64,)> = query_as("SELECT id FROM parts_of_speech WHERE tag = ?1")
                .bind(&definition.part_of_speech)
                .fetch_optional(&mut *tx)
                .await?;
            let part_of_speech_id = match tag_id {
                Some((id,)) => id,
                None => {
                    let (id,): (i64,) = query_as("SELECT id FROM parts_of_speech WHERE tag = ?1")
                        .bind(UNKNOWN_TAG)
                        .fetch_one(&mut *tx)
                        .await?;
                    id
                }
            };
            query(
                "
                INSERT INTO definitions(word_id, part_of_speech_id, definition, example, synonyms, antonyms)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
            )
            .bind(word_id)
            .bind(part_of_speech_id)
            .bind(&definition.text)
            .bind(&definition.example)
            .bind(encode_list(&definition.synonyms))
            .bind(encode_list(&definition.antonyms))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }

    /// Finds the word row for `text` or creates a bare one. Tolerates a
    /// concurrent create by re-reading after a constraint error.
    pub async fn find_or_create_word(&self, text: &str) -> sqlx::Result<WordRow> {
        if let Some(word) = self.find_word_by_text(text).await? {
            return Ok(word);
        }
        let inserted = query("INSERT INTO words(text) VALUES (?1)")
            .bind(text)
            .execute(&self.pool)
            .await;
        match inserted {
            Ok(_) => {}
            Err(error) if is_unique_violation(&error) => {}
            Err(error) => return Err(error),
        }
        self.find_word_by_text(text)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn part_of_speech_id(&self, tag: &str) -> sqlx::Result<Option<i64>> {
        let row: Option<(i64,)> = query_as("SELECT id FROM parts_of_speech WHERE tag = ?1")
            .bind(tag)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(id,)| id))
    }

    /// The sentinel id every unrecognized tag is enrolled under.
    pub async fn unknown_part_of_speech_id(&self) -> sqlx::Result<i64> {
        let (id,): (i64,) = query_as("SELECT id FROM parts_of_speech WHERE tag = ?1")
            .bind(UNKNOWN_TAG)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    /// Inserting the same (user, word, part of speech) triple twice fails
    /// with a unique constraint violation from the database, never with a
    /// silent overwrite.
    pub async fn insert_vocabulary_entry(
        &self,
        user_id: i64,
        word_id: i64,
        part_of_speech_id: i64,
        definition: &str,
        example: Option<&str>,
    ) -> sqlx::Result<i64> {
        let result = query(
            "
            INSERT INTO vocabulary(user_id, word_id, part_of_speech_id, definition, example)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(user_id)
        .bind(word_id)
        .bind(part_of_speech_id)
        .bind(definition)
        .bind(example)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn find_vocabulary_entry(
        &self,
        user_id: i64,
        word_id: i64,
        part_of_speech_id: i64,
    ) -> sqlx::Result<Option<VocabularyRow>> {
        query_as::<_, VocabularyRow>(&format!(
            "{VOCABULARY_SELECT}
            WHERE v.user_id = ?1 AND v.word_id = ?2 AND v.part_of_speech_id = ?3"
        ))
        .bind(user_id)
        .bind(word_id)
        .bind(part_of_speech_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Every entry a user saved for a word, across parts of speech.
    pub async fn vocabulary_entries_for_word(
        &self,
        user_id: i64,
        text: &str,
    ) -> sqlx::Result<Vec<VocabularyRow>> {
        query_as::<_, VocabularyRow>(&format!(
            "{VOCABULARY_SELECT}
            WHERE v.user_id = ?1 AND w.text = ?2 COLLATE NOCASE
            ORDER BY v.added_at, v.id"
        ))
        .bind(user_id)
        .bind(text)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn search_vocabulary(
        &self,
        user_id: i64,
        term: &str,
        limit: u32,
    ) -> sqlx::Result<Vec<VocabularyRow>> {
        query_as::<_, VocabularyRow>(&format!(
            "{VOCABULARY_SELECT}
            WHERE v.user_id = ?1 AND w.text LIKE ?2 ESCAPE '\\'
            ORDER BY w.text COLLATE NOCASE, v.id
            LIMIT ?3"
        ))
        .bind(user_id)
        .bind(format!("{}%", escape_like(term)))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn vocabulary_page(
        &self,
        user_id: i64,
        limit: u32,
        offset: u32,
    ) -> sqlx::Result<Vec<VocabularyRow>> {
        query_as::<_, VocabularyRow>(&format!(
            "{VOCABULARY_SELECT}
            WHERE v.user_id = ?1
            ORDER BY v.added_at DESC, v.id DESC
            LIMIT ?2 OFFSET ?3"
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_vocabulary(&self, user_id: i64) -> sqlx::Result<i64> {
        let (count,): (i64,) = query_as("SELECT COUNT(*) FROM vocabulary WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Returns whether a storage error is the unique constraint firing.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db) if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
    )
}

fn encode_list(list: &[String]) -> String {
    serde_json::to_string(list).unwrap_or_else(|_| "[]".to_owned())
}

fn decode_list(json: &str) -> Vec<String> {
    serde_json::from_str(json).unwrap_or_default()
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
