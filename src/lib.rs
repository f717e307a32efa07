//! WordBook: a personal vocabulary book with undo/redo.
//!
//! Words live in one of three disjoint collections (active words, bin,
//! important). Every mutating command is a move between collections, recorded
//! in an operation log so it can be undone and redone. A spaced-repetition
//! scheduler decides when a word is due for review.
//!
//! # Example
//!
//! ```no_run
//! use wordbook::{FlatFileRepository, Outcome, WordBook};
//! use std::path::Path;
//!
//! let repo = FlatFileRepository::new(Path::new("."));
//! let mut book = WordBook::new(Box::new(repo)).unwrap();
//!
//! for input in ["new hello world", "list -a", "remove hello", "undo"] {
//!     if let Outcome::Output(lines) = book.handle(input) {
//!         for line in lines {
//!             println!("{line}");
//!         }
//!     }
//! }
//! ```

mod book;
mod command;
mod history;
mod scheduler;
mod storage;
mod store;
mod types;

// Re-export public API
pub use book::{Outcome, WordBook};
pub use command::{ALL_COMMANDS, Command, Options};
pub use history::{History, HistoryEntry};
pub use scheduler::{day_word, days_until_review, is_due};
pub use storage::{FlatFileRepository, Repository, SqliteRepository};
pub use store::{BookError, Collections};
pub use types::{CollectionId, WordRecord};
