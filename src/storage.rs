//! Persistence backends: pipe-delimited flat files or a single SQLite table.

use crate::types::{CollectionId, WordRecord};
use chrono::{DateTime, Utc};
use eyre::{Context, Result};
use rusqlite::{Connection, params};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

const WORDS_FILE: &str = "words.txt";
const BIN_FILE: &str = "bin.txt";
const IMPT_FILE: &str = "impt.txt";

/// Flat-file field separator; input carrying it is rejected at the router so
/// every record survives an encode/parse round trip.
pub const DELIMITER: char = '|';

/// Durable backing for the record store. One backend per session.
///
/// `insert` is the append-one-record write mode, used whenever a key newly
/// enters a collection; `rewrite` is the full-snapshot mode, used whenever a
/// key leaves one or a record mutates in place.
pub trait Repository {
    fn load_all(&mut self, collection: CollectionId) -> Result<Vec<WordRecord>>;
    fn insert(&mut self, collection: CollectionId, record: &WordRecord) -> Result<()>;
    fn rewrite(&mut self, collection: CollectionId, records: &[WordRecord]) -> Result<()>;
}

/// One text file per collection, `word|meaning|created|last_reviewed|reviews`
/// per line with RFC 3339 timestamps.
pub struct FlatFileRepository {
    dir: PathBuf,
}

impl FlatFileRepository {
    pub fn new(dir: &Path) -> Self {
        Self { dir: dir.to_path_buf() }
    }

    fn file_path(&self, collection: CollectionId) -> PathBuf {
        let name = match collection {
            CollectionId::Active => WORDS_FILE,
            CollectionId::Bin => BIN_FILE,
            CollectionId::Important => IMPT_FILE,
        };
        self.dir.join(name)
    }
}

impl Repository for FlatFileRepository {
    fn load_all(&mut self, collection: CollectionId) -> Result<Vec<WordRecord>> {
        let path = self.file_path(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();
        for (line_number, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    log::warn!("Failed to read line {} of {}: {}", line_number + 1, path.display(), e);
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_record(&line) {
                Some(record) => records.push(record),
                None => {
                    log::warn!(
                        "Skipping malformed record at line {} of {}",
                        line_number + 1,
                        path.display()
                    );
                }
            }
        }

        Ok(records)
    }

    fn insert(&mut self, collection: CollectionId, record: &WordRecord) -> Result<()> {
        let path = self.file_path(collection);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open {} for append", path.display()))?;

        writeln!(file, "{}", encode_record(record))
            .with_context(|| format!("Failed to write to {}", path.display()))?;
        file.sync_all()
            .with_context(|| format!("Failed to sync {}", path.display()))?;

        Ok(())
    }

    fn rewrite(&mut self, collection: CollectionId, records: &[WordRecord]) -> Result<()> {
        let path = self.file_path(collection);
        let mut file = File::create(&path)
            .with_context(|| format!("Failed to truncate {}", path.display()))?;

        for record in records {
            writeln!(file, "{}", encode_record(record))
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        file.sync_all()
            .with_context(|| format!("Failed to sync {}", path.display()))?;

        Ok(())
    }
}

/// Encode one record as a delimited line.
fn encode_record(record: &WordRecord) -> String {
    [
        record.word.as_str(),
        record.meaning.as_str(),
        &record.created_at.to_rfc3339(),
        &record.last_reviewed_at.to_rfc3339(),
        &record.review_count.to_string(),
    ]
    .join(&DELIMITER.to_string())
}

/// Parse one delimited line. Lines carrying only word, meaning and creation
/// time (the oldest file layout) get a zero review count and a review clock
/// equal to the creation time.
fn parse_record(line: &str) -> Option<WordRecord> {
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    if fields.len() < 3 {
        return None;
    }

    let created_at = parse_timestamp(fields[2])?;
    let last_reviewed_at = fields
        .get(3)
        .and_then(|s| parse_timestamp(s))
        .unwrap_or(created_at);
    let review_count = fields.get(4).and_then(|s| s.parse().ok()).unwrap_or(0);

    Some(WordRecord {
        word: fields[0].to_string(),
        meaning: fields[1].to_string(),
        created_at,
        last_reviewed_at,
        review_count,
    })
}

/// RFC 3339, with a fallback for files written by older tools.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S %z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Single-table SQLite backend. Active rows have `deleted = 0`, binned rows
/// `deleted = 1`; uniqueness is enforced only among non-deleted rows. The
/// important collection is not modeled by this backend.
pub struct SqliteRepository {
    db: Connection,
}

impl SqliteRepository {
    pub fn open(path: &Path) -> Result<Self> {
        let db = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database {}", path.display()))?;
        let repo = Self { db };
        repo.init_schema()?;
        Ok(repo)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let repo = Self { db };
        repo.init_schema()?;
        Ok(repo)
    }

    fn init_schema(&self) -> Result<()> {
        self.db
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS words (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    word TEXT NOT NULL,
                    meaning TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    last_reviewed_at TEXT NOT NULL,
                    review_count INTEGER NOT NULL DEFAULT 0,
                    deleted INTEGER NOT NULL DEFAULT 0
                );
                CREATE UNIQUE INDEX IF NOT EXISTS idx_words_live
                    ON words(word) WHERE deleted = 0;
            "#,
            )
            .context("Failed to initialize schema")?;
        Ok(())
    }

    /// Which `deleted` flag a collection maps onto.
    fn deleted_flag(collection: CollectionId) -> Result<i64> {
        match collection {
            CollectionId::Active => Ok(0),
            CollectionId::Bin => Ok(1),
            CollectionId::Important => {
                eyre::bail!("important words are not supported by the sqlite backend")
            }
        }
    }
}

impl Repository for SqliteRepository {
    fn load_all(&mut self, collection: CollectionId) -> Result<Vec<WordRecord>> {
        // Nothing to load for the unmodeled collection; the session simply
        // starts with an empty important set.
        if collection == CollectionId::Important {
            return Ok(Vec::new());
        }
        let flag = Self::deleted_flag(collection)?;

        let mut stmt = self.db.prepare(
            r#"
            SELECT word, meaning, created_at, last_reviewed_at, review_count
            FROM words WHERE deleted = ? ORDER BY id
            "#,
        )?;

        let records: Vec<WordRecord> = stmt
            .query_map(params![flag], |row| {
                let created_at: String = row.get(2)?;
                let last_reviewed_at: String = row.get(3)?;
                Ok(WordRecord {
                    word: row.get(0)?,
                    meaning: row.get(1)?,
                    created_at: parse_timestamp(&created_at).unwrap_or_else(Utc::now),
                    last_reviewed_at: parse_timestamp(&last_reviewed_at).unwrap_or_else(Utc::now),
                    review_count: row.get(4)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(records)
    }

    fn insert(&mut self, collection: CollectionId, record: &WordRecord) -> Result<()> {
        let flag = Self::deleted_flag(collection)?;
        self.db
            .execute(
                r#"
                INSERT INTO words (word, meaning, created_at, last_reviewed_at, review_count, deleted)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
                params![
                    record.word,
                    record.meaning,
                    record.created_at.to_rfc3339(),
                    record.last_reviewed_at.to_rfc3339(),
                    record.review_count,
                    flag,
                ],
            )
            .context("Failed to insert word")?;
        Ok(())
    }

    fn rewrite(&mut self, collection: CollectionId, records: &[WordRecord]) -> Result<()> {
        let flag = Self::deleted_flag(collection)?;
        let tx = self.db.transaction().context("Failed to begin transaction")?;

        tx.execute("DELETE FROM words WHERE deleted = ?", params![flag])
            .context("Failed to clear collection rows")?;
        for record in records {
            tx.execute(
                r#"
                INSERT INTO words (word, meaning, created_at, last_reviewed_at, review_count, deleted)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
                params![
                    record.word,
                    record.meaning,
                    record.created_at.to_rfc3339(),
                    record.last_reviewed_at.to_rfc3339(),
                    record.review_count,
                    flag,
                ],
            )
            .context("Failed to insert word")?;
        }

        tx.commit().context("Failed to commit rewrite")?;
        Ok(())
    }
}
