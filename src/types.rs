//! Core data types for the word book.

use chrono::{DateTime, Utc};

/// A single vocabulary entry.
#[derive(Debug, Clone, PartialEq)]
pub struct WordRecord {
    /// The word itself, unique within the collection that holds it
    pub word: String,

    /// Its meaning, free text
    pub meaning: String,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// Last time the word was reviewed (creation time until then)
    pub last_reviewed_at: DateTime<Utc>,

    /// How many reviews have been logged
    pub review_count: u32,
}

impl WordRecord {
    /// Create a fresh record; the review clock starts at creation.
    pub fn new(word: &str, meaning: &str, now: DateTime<Utc>) -> Self {
        Self {
            word: word.to_string(),
            meaning: meaning.to_string(),
            created_at: now,
            last_reviewed_at: now,
            review_count: 0,
        }
    }
}

/// The three disjoint collections a word can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionId {
    Active,
    Bin,
    Important,
}

impl CollectionId {
    /// Label used in user-facing messages.
    pub const fn label(self) -> &'static str {
        match self {
            CollectionId::Active => "words",
            CollectionId::Bin => "bin",
            CollectionId::Important => "important",
        }
    }

    /// Resolve a `-f` source selector.
    pub fn from_selector(selector: &str) -> Option<Self> {
        match selector {
            "words" => Some(CollectionId::Active),
            "bin" => Some(CollectionId::Bin),
            "impt" => Some(CollectionId::Important),
            _ => None,
        }
    }
}

impl std::fmt::Display for CollectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_defaults() {
        let now = Utc::now();
        let record = WordRecord::new("hello", "world", now);
        assert_eq!(record.word, "hello");
        assert_eq!(record.meaning, "world");
        assert_eq!(record.created_at, now);
        assert_eq!(record.last_reviewed_at, now);
        assert_eq!(record.review_count, 0);
    }

    #[test]
    fn test_collection_labels() {
        assert_eq!(CollectionId::Active.label(), "words");
        assert_eq!(CollectionId::Bin.label(), "bin");
        assert_eq!(CollectionId::Important.label(), "important");
    }

    #[test]
    fn test_from_selector() {
        assert_eq!(CollectionId::from_selector("words"), Some(CollectionId::Active));
        assert_eq!(CollectionId::from_selector("bin"), Some(CollectionId::Bin));
        assert_eq!(CollectionId::from_selector("impt"), Some(CollectionId::Important));
        assert_eq!(CollectionId::from_selector("junk"), None);
    }
}
