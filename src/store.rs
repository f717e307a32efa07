//! In-memory record store: the three word collections.

use crate::types::{CollectionId, WordRecord};
use std::collections::BTreeMap;

/// Errors produced by record-store operations.
#[derive(Debug)]
pub enum BookError {
    /// Word absent from the collection it was expected in.
    NotFound { collection: CollectionId, word: String },
    /// Destination collection already holds the word.
    AlreadyExists {
        collection: CollectionId,
        word: String,
        meaning: String,
    },
    /// A create was attempted without a meaning.
    MissingMeaning,
    /// Word or meaning contains the flat-file field separator.
    ReservedCharacter(char),
    /// Both move endpoints were empty; internal invariant violation.
    InvalidMove,
    /// Durable write failed; the operation was rolled back.
    Persistence(eyre::Report),
}

impl std::fmt::Display for BookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookError::NotFound { collection, word } => {
                write!(f, "Word not found in {}: {}", collection, word)
            }
            BookError::AlreadyExists {
                collection,
                word,
                meaning,
            } => {
                write!(
                    f,
                    "Word {} already exists in {} with meaning {}",
                    word, collection, meaning
                )
            }
            BookError::MissingMeaning => write!(f, "A new word needs a meaning"),
            BookError::ReservedCharacter(c) => {
                write!(f, "Words and meanings cannot contain '{}'", c)
            }
            BookError::InvalidMove => write!(f, "Tried to move from nowhere to nowhere"),
            BookError::Persistence(e) => write!(f, "Persistence error: {}", e),
        }
    }
}

impl std::error::Error for BookError {}

/// The three disjoint collections, keyed by word.
#[derive(Debug, Default)]
pub struct Collections {
    active: BTreeMap<String, WordRecord>,
    bin: BTreeMap<String, WordRecord>,
    important: BTreeMap<String, WordRecord>,
}

impl Collections {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, id: CollectionId) -> &BTreeMap<String, WordRecord> {
        match id {
            CollectionId::Active => &self.active,
            CollectionId::Bin => &self.bin,
            CollectionId::Important => &self.important,
        }
    }

    fn map_mut(&mut self, id: CollectionId) -> &mut BTreeMap<String, WordRecord> {
        match id {
            CollectionId::Active => &mut self.active,
            CollectionId::Bin => &mut self.bin,
            CollectionId::Important => &mut self.important,
        }
    }

    /// Look up a record by word.
    pub fn get(&self, id: CollectionId, word: &str) -> Option<&WordRecord> {
        self.map(id).get(word)
    }

    /// Mutable lookup, used by review to bump counters in place.
    pub fn get_mut(&mut self, id: CollectionId, word: &str) -> Option<&mut WordRecord> {
        self.map_mut(id).get_mut(word)
    }

    pub fn contains(&self, id: CollectionId, word: &str) -> bool {
        self.map(id).contains_key(word)
    }

    /// Insert a record; the word must not already be present.
    pub fn put(&mut self, id: CollectionId, record: WordRecord) -> Result<(), BookError> {
        if let Some(existing) = self.map(id).get(&record.word) {
            return Err(BookError::AlreadyExists {
                collection: id,
                word: record.word.clone(),
                meaning: existing.meaning.clone(),
            });
        }
        self.map_mut(id).insert(record.word.clone(), record);
        Ok(())
    }

    /// Remove and return a record, if present.
    pub fn remove(&mut self, id: CollectionId, word: &str) -> Option<WordRecord> {
        self.map_mut(id).remove(word)
    }

    /// Iterate the records of one collection.
    pub fn iter(&self, id: CollectionId) -> impl Iterator<Item = &WordRecord> {
        self.map(id).values()
    }

    /// Snapshot of one collection, used for full rewrites.
    pub fn snapshot(&self, id: CollectionId) -> Vec<WordRecord> {
        self.map(id).values().cloned().collect()
    }

    pub fn len(&self, id: CollectionId) -> usize {
        self.map(id).len()
    }

    pub fn is_empty(&self, id: CollectionId) -> bool {
        self.map(id).is_empty()
    }

    /// How many of the three collections hold this word.
    pub fn membership_count(&self, word: &str) -> usize {
        [CollectionId::Active, CollectionId::Bin, CollectionId::Important]
            .iter()
            .filter(|id| self.contains(**id, word))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(word: &str, meaning: &str) -> WordRecord {
        WordRecord::new(word, meaning, Utc::now())
    }

    #[test]
    fn test_put_and_get() {
        let mut collections = Collections::new();
        collections.put(CollectionId::Active, record("hello", "world")).unwrap();

        let found = collections.get(CollectionId::Active, "hello").unwrap();
        assert_eq!(found.meaning, "world");
        assert!(collections.get(CollectionId::Bin, "hello").is_none());
    }

    #[test]
    fn test_put_duplicate_keeps_original() {
        let mut collections = Collections::new();
        collections.put(CollectionId::Active, record("hello", "world")).unwrap();

        let err = collections
            .put(CollectionId::Active, record("hello", "other"))
            .unwrap_err();
        match err {
            BookError::AlreadyExists { word, meaning, .. } => {
                assert_eq!(word, "hello");
                assert_eq!(meaning, "world");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(collections.get(CollectionId::Active, "hello").unwrap().meaning, "world");
    }

    #[test]
    fn test_remove() {
        let mut collections = Collections::new();
        collections.put(CollectionId::Bin, record("hello", "world")).unwrap();

        let removed = collections.remove(CollectionId::Bin, "hello").unwrap();
        assert_eq!(removed.meaning, "world");
        assert!(collections.remove(CollectionId::Bin, "hello").is_none());
    }

    #[test]
    fn test_same_word_in_different_collections_counted() {
        let mut collections = Collections::new();
        collections.put(CollectionId::Active, record("hello", "world")).unwrap();
        assert_eq!(collections.membership_count("hello"), 1);
        assert_eq!(collections.membership_count("missing"), 0);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut collections = Collections::new();
        collections.put(CollectionId::Active, record("hello", "world")).unwrap();

        let snapshot = collections.snapshot(CollectionId::Active);
        collections.remove(CollectionId::Active, "hello");
        assert_eq!(snapshot.len(), 1);
        assert!(collections.is_empty(CollectionId::Active));
    }
}
