//! Shared test infrastructure for word book integration tests.
//!
//! Provides TestEnv helper for consistent test setup/teardown.

#![allow(dead_code)]

use tempfile::TempDir;
use wordbook::{CollectionId, FlatFileRepository, Outcome, SqliteRepository, WordBook};

/// Test environment with automatic cleanup.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub book: WordBook,
}

impl TestEnv {
    /// Create a new test environment over the flat-file backend.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = FlatFileRepository::new(temp_dir.path());
        let book = WordBook::new(Box::new(repo)).expect("Failed to load word book");
        Self { temp_dir, book }
    }

    /// Create a new test environment over the sqlite backend.
    pub fn new_sqlite() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = SqliteRepository::open(&temp_dir.path().join("wordbook.db"))
            .expect("Failed to open sqlite backend");
        let book = WordBook::new(Box::new(repo)).expect("Failed to load word book");
        Self { temp_dir, book }
    }

    /// Reload a fresh book over the same flat-file data directory.
    pub fn reopen(&mut self) {
        let repo = FlatFileRepository::new(self.temp_dir.path());
        self.book = WordBook::new(Box::new(repo)).expect("Failed to reload word book");
    }

    /// Reload a fresh book over the same sqlite database.
    pub fn reopen_sqlite(&mut self) {
        let repo = SqliteRepository::open(&self.temp_dir.path().join("wordbook.db"))
            .expect("Failed to reopen sqlite backend");
        self.book = WordBook::new(Box::new(repo)).expect("Failed to reload word book");
    }

    /// Run one input line and collect its output lines.
    pub fn run(&mut self, input: &str) -> Vec<String> {
        match self.book.handle(input) {
            Outcome::Output(lines) => lines,
            Outcome::Quit => panic!("unexpected quit for input: {input}"),
        }
    }

    /// Run one input line and assert it produced exactly one expected line.
    pub fn expect_line(&mut self, input: &str, expected: &str) {
        let lines = self.run(input);
        assert_eq!(lines, vec![expected.to_string()], "input: {input}");
    }

    /// Assert a word's meaning in a collection.
    pub fn assert_meaning(&self, collection: CollectionId, word: &str, meaning: &str) {
        let record = self
            .book
            .collections()
            .get(collection, word)
            .unwrap_or_else(|| panic!("expected {word} in {collection}"));
        assert_eq!(record.meaning, meaning, "meaning of {word} in {collection}");
    }

    /// Assert a word is absent from a collection.
    pub fn assert_absent(&self, collection: CollectionId, word: &str) {
        assert!(
            self.book.collections().get(collection, word).is_none(),
            "expected {word} to be absent from {collection}"
        );
    }

    /// Assert a word lives in exactly one collection.
    pub fn assert_exclusive(&self, word: &str) {
        assert_eq!(
            self.book.collections().membership_count(word),
            1,
            "expected {word} in exactly one collection"
        );
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
