//! The word book session: command dispatch, the move primitive and undo/redo.

use crate::command::{ALL_COMMANDS, Command, Options};
use crate::history::History;
use crate::scheduler;
use crate::storage::{DELIMITER, Repository};
use crate::store::{BookError, Collections};
use crate::types::{CollectionId, WordRecord};
use chrono::Utc;
use eyre::Result;
use rand::seq::{IndexedRandom, SliceRandom};

/// Result of handling one input line.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// Lines to print, possibly none.
    Output(Vec<String>),
    /// The user asked to exit.
    Quit,
}

/// One interactive session over a repository.
///
/// Owns the three collections, the undo/redo history and the key sequence of
/// the most recent listing. One command is fully applied, durable write
/// included, before the next is handled.
pub struct WordBook {
    collections: Collections,
    repo: Box<dyn Repository>,
    history: History,
    last_listed: Vec<String>,
}

impl WordBook {
    /// Load all collections from the repository and start a fresh session.
    pub fn new(mut repo: Box<dyn Repository>) -> Result<Self> {
        let mut collections = Collections::new();
        let ids = [CollectionId::Active, CollectionId::Bin, CollectionId::Important];
        for id in ids {
            for record in repo.load_all(id)? {
                // Last occurrence wins, within a file and across collections.
                // A cross-collection duplicate is the residue of a move that
                // appended to one file but never rewrote the other.
                for other in ids {
                    if other != id && collections.remove(other, &record.word).is_some() {
                        log::warn!("Dropping duplicate of {} from {}", record.word, other);
                    }
                }
                collections.remove(id, &record.word);
                collections
                    .put(id, record)
                    .map_err(|e| eyre::eyre!(e.to_string()))?;
            }
        }
        Ok(Self {
            collections,
            repo,
            history: History::new(),
            last_listed: Vec::new(),
        })
    }

    /// Handle one input line: tokenize, route, execute.
    pub fn handle(&mut self, input: &str) -> Outcome {
        let mut tokens = input.split_whitespace();
        let Some(name) = tokens.next() else {
            return Outcome::Output(Vec::new());
        };
        let args: Vec<&str> = tokens.collect();

        let Some(command) = Command::parse(name) else {
            return Outcome::Output(vec![format!(
                "Unknown command {name}. Type 'help' for a list of commands."
            )]);
        };
        if command == Command::Quit {
            return Outcome::Quit;
        }

        let options = Options::parse(&args);
        Outcome::Output(self.execute(command, options))
    }

    fn execute(&mut self, command: Command, options: Options) -> Vec<String> {
        if let Some(usage) = command.check_usage(&options) {
            return vec![usage.to_string()];
        }
        match command {
            Command::List => self.list(&options),
            Command::Help => self.help(&options),
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            Command::Quit => Vec::new(),
            _ => self.apply(command, &options, true),
        }
    }

    /// Run a mutating command, optionally recording it for undo.
    fn apply(&mut self, command: Command, options: &Options, record: bool) -> Vec<String> {
        // The delimiter would shear a record line in two on reload; creates
        // are rejected before either side of the command touches state.
        if matches!(command, Command::New | Command::Update)
            && [&options.word, &options.meaning]
                .into_iter()
                .flatten()
                .any(|text| text.contains(DELIMITER))
        {
            return vec![BookError::ReservedCharacter(DELIMITER).to_string()];
        }
        match command {
            Command::New => {
                self.move_and_log(command, None, Some(CollectionId::Active), options, record).0
            }
            Command::Remove => self
                .move_and_log(
                    command,
                    Some(CollectionId::Active),
                    Some(CollectionId::Bin),
                    options,
                    record,
                )
                .0,
            Command::Mark => self
                .move_and_log(
                    command,
                    Some(CollectionId::Active),
                    Some(CollectionId::Important),
                    options,
                    record,
                )
                .0,
            Command::Update => self.update(options, record),
            Command::Review => self.review(options, record),
            _ => Vec::new(),
        }
    }

    /// Perform a move, print the status line and log the command.
    ///
    /// With the cancel flag set the endpoints swap and the verb flips from
    /// "Applied" to "Restored", which is what makes every move invertible by
    /// flag inversion alone.
    fn move_and_log(
        &mut self,
        command: Command,
        from: Option<CollectionId>,
        to: Option<CollectionId>,
        options: &Options,
        record: bool,
    ) -> (Vec<String>, bool) {
        let Some(word) = options.word.clone() else {
            return (vec![command.usage().to_string()], false);
        };

        let (action, from, to) = if options.cancel {
            ("Restored", to, from)
        } else {
            ("Applied", from, to)
        };

        match self.move_record(from, to, &word, options.meaning.as_deref()) {
            Ok(()) => {
                let meaning = match to {
                    Some(t) => self
                        .collections
                        .get(t, &word)
                        .map(|r| r.meaning.clone())
                        .unwrap_or_default(),
                    // Inverting a create leaves no record behind.
                    None => options.meaning.clone().unwrap_or_default(),
                };
                if record {
                    self.history.record(command, options);
                }
                (vec![format!("{action} {command}: {word} - {meaning}")], true)
            }
            Err(BookError::MissingMeaning) => (vec![Command::New.usage().to_string()], false),
            Err(e) => (vec![e.to_string()], false),
        }
    }

    /// The sole mutation primitive: a 4-way state machine on the endpoints.
    ///
    /// The in-memory change happens first; if the durable write fails it is
    /// rolled back so memory never runs ahead of the backing store.
    fn move_record(
        &mut self,
        from: Option<CollectionId>,
        to: Option<CollectionId>,
        word: &str,
        meaning: Option<&str>,
    ) -> Result<(), BookError> {
        if let Some(f) = from
            && !self.collections.contains(f, word)
        {
            return Err(BookError::NotFound {
                collection: f,
                word: word.to_string(),
            });
        }
        if let Some(t) = to
            && let Some(existing) = self.collections.get(t, word)
        {
            return Err(BookError::AlreadyExists {
                collection: t,
                word: word.to_string(),
                meaning: existing.meaning.clone(),
            });
        }

        match (from, to) {
            (Some(f), Some(t)) => {
                let record = self
                    .collections
                    .remove(f, word)
                    .ok_or(BookError::InvalidMove)?;
                let clone = record.clone();
                // Checked above, the destination cannot collide.
                let _ = self.collections.put(t, record);

                if let Err(e) = self.persist_insert(t, &clone).and_then(|_| self.persist_rewrite(f)) {
                    if let Some(r) = self.collections.remove(t, word) {
                        let _ = self.collections.put(f, r);
                    }
                    return Err(BookError::Persistence(e));
                }
            }
            (None, Some(t)) => {
                let Some(meaning) = meaning else {
                    return Err(BookError::MissingMeaning);
                };
                let record = WordRecord::new(word, meaning, Utc::now());
                let clone = record.clone();
                let _ = self.collections.put(t, record);

                if let Err(e) = self.persist_insert(t, &clone) {
                    self.collections.remove(t, word);
                    return Err(BookError::Persistence(e));
                }
            }
            (Some(f), None) => {
                let record = self
                    .collections
                    .remove(f, word)
                    .ok_or(BookError::InvalidMove)?;

                if let Err(e) = self.persist_rewrite(f) {
                    let _ = self.collections.put(f, record);
                    return Err(BookError::Persistence(e));
                }
            }
            (None, None) => return Err(BookError::InvalidMove),
        }

        Ok(())
    }

    fn persist_insert(&mut self, collection: CollectionId, record: &WordRecord) -> Result<()> {
        self.repo.insert(collection, record)
    }

    fn persist_rewrite(&mut self, collection: CollectionId) -> Result<()> {
        let snapshot = self.collections.snapshot(collection);
        self.repo.rewrite(collection, &snapshot)
    }

    /// `update WORD NEW_MEANING`: retire the old record to the bin, then
    /// create a fresh one. Cancel polarity drops the fresh record and pulls
    /// the old one back out of the bin.
    fn update(&mut self, options: &Options, record: bool) -> Vec<String> {
        let mut lines = Vec::new();

        if options.cancel
            && let Some(word) = options.word.as_deref()
            // The fresh record only makes way once the binned original is
            // actually there to restore; otherwise the move below rejects the
            // command and nothing may change.
            && self.collections.contains(CollectionId::Bin, word)
            && self.collections.remove(CollectionId::Active, word).is_some()
            && let Err(e) = self.persist_rewrite(CollectionId::Active)
        {
            // Put nothing back: the restore below is what matters, but
            // surface the failed write.
            lines.push(BookError::Persistence(e).to_string());
        }

        let (mut move_lines, moved) = self.move_and_log(
            Command::Update,
            Some(CollectionId::Active),
            Some(CollectionId::Bin),
            options,
            record,
        );
        lines.append(&mut move_lines);

        if moved
            && !options.cancel
            && let (Some(word), Some(meaning)) = (options.word.as_deref(), options.meaning.as_deref())
        {
            let fresh = WordRecord::new(word, meaning, Utc::now());
            let clone = fresh.clone();
            // The old record just left Active, so the slot is free.
            let _ = self.collections.put(CollectionId::Active, fresh);
            if let Err(e) = self.persist_insert(CollectionId::Active, &clone) {
                self.collections.remove(CollectionId::Active, word);
                lines.push(BookError::Persistence(e).to_string());
            }
        }

        lines
    }

    /// Bump (or, under cancel, decrement) the review counter of one word or
    /// of everything the last `list` produced.
    fn review(&mut self, options: &Options, record: bool) -> Vec<String> {
        let words: Vec<String> = if let Some(word) = &options.word {
            vec![word.clone()]
        } else {
            match options.from.as_deref() {
                Some("list") => self.last_listed.clone(),
                Some(other) => return vec![format!("Unknown argument: -f {other}")],
                None => return vec![Command::Review.usage().to_string()],
            }
        };

        let now = Utc::now();
        let mut lines = Vec::new();
        let mut touched: Vec<WordRecord> = Vec::new();

        for word in &words {
            match self.collections.get_mut(CollectionId::Active, word) {
                Some(rec) => {
                    touched.push(rec.clone());
                    if options.cancel {
                        rec.review_count = rec.review_count.saturating_sub(1);
                    } else {
                        rec.review_count += 1;
                    }
                    rec.last_reviewed_at = now;
                    lines.push(format!("Reviewed: {word}, total reviews: {}", rec.review_count));
                }
                None => lines.push(format!("Word not found: {word}")),
            }
        }

        if touched.is_empty() {
            return lines;
        }

        if let Err(e) = self.persist_rewrite(CollectionId::Active) {
            // Roll the counters back so memory matches the durable state.
            for original in touched {
                if let Some(rec) = self.collections.get_mut(CollectionId::Active, &original.word) {
                    *rec = original;
                }
            }
            return vec![BookError::Persistence(e).to_string()];
        }

        if record {
            self.history.record(Command::Review, options);
        }
        lines
    }

    /// Select, filter, order and truncate one collection for display. The key
    /// sequence shown is remembered for `review -f list`.
    fn list(&mut self, options: &Options) -> Vec<String> {
        let source = match options.from.as_deref() {
            None => CollectionId::Active,
            Some(selector) => match CollectionId::from_selector(selector) {
                Some(id) => id,
                None => return vec![format!("Unknown source: {selector}")],
            },
        };

        let now = Utc::now();
        let mut records: Vec<&WordRecord> = self.collections.iter(source).collect();
        if options.review {
            records.retain(|r| scheduler::is_due(r, now));
        }

        if options.random {
            let mut rng = rand::rng();
            match options.count {
                Some(count) => {
                    records = records.choose_multiple(&mut rng, count).copied().collect();
                }
                None => records.shuffle(&mut rng),
            }
        } else {
            records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            if let Some(count) = options.count {
                records.truncate(count);
            }
        }

        self.last_listed = records.iter().map(|r| r.word.clone()).collect();

        let width = records.iter().map(|r| r.word.chars().count()).max().unwrap_or(0);
        records
            .iter()
            .map(|r| {
                let days = scheduler::days_until_review(r, now);
                format!(
                    "{:<width$} - {} - {} {}",
                    r.word,
                    r.meaning,
                    days,
                    scheduler::day_word(days)
                )
            })
            .collect()
    }

    fn help(&self, options: &Options) -> Vec<String> {
        match options.word.as_deref() {
            None => ALL_COMMANDS.iter().map(|c| c.usage().to_string()).collect(),
            Some(name) => match Command::parse(name) {
                Some(command) => vec![command.usage().to_string()],
                None => vec![format!("No help available for {name}")],
            },
        }
    }

    /// Pop the newest applied entry, park it on the redo stack and replay it
    /// with inverted polarity. Nothing is recorded during the replay, so the
    /// applied stack shrinks by exactly one.
    fn undo(&mut self) -> Vec<String> {
        let Some(entry) = self.history.pop_applied() else {
            return Vec::new();
        };
        self.history.push_undone(entry.clone());

        let mut options = entry.options;
        options.cancel = !options.cancel;
        self.apply(entry.command, &options, false)
    }

    /// Replay the newest undone entry with its original polarity, recording
    /// it again so it can be undone once more.
    fn redo(&mut self) -> Vec<String> {
        let Some(entry) = self.history.pop_undone() else {
            return Vec::new();
        };
        self.apply(entry.command, &entry.options, true)
    }

    // Accessors used by the test suite and the front end.

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn last_listed(&self) -> &[String] {
        &self.last_listed
    }
}
