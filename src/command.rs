//! Command names, option parsing and usage text for the REPL.

use std::fmt;

/// The closed set of REPL commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    New,
    Remove,
    Update,
    Mark,
    List,
    Review,
    Undo,
    Redo,
    Help,
    Quit,
}

/// Display order for `help` with no arguments.
pub const ALL_COMMANDS: [Command; 10] = [
    Command::New,
    Command::Remove,
    Command::Update,
    Command::Mark,
    Command::Review,
    Command::List,
    Command::Undo,
    Command::Redo,
    Command::Help,
    Command::Quit,
];

const LIST_USAGE: &str = "Usage: list [OPTIONS]
  Options:
    N|-a   - Number of words / All of the words
    -r     - Random order
    -v     - List review words
    -f     - From bin, words or impt";

impl Command {
    /// Resolve a command word, case-insensitively. Unknown names are rejected
    /// here; nothing is ever dispatched by raw user string.
    pub fn parse(name: &str) -> Option<Command> {
        match name.to_ascii_lowercase().as_str() {
            "new" => Some(Command::New),
            "remove" => Some(Command::Remove),
            "update" => Some(Command::Update),
            "mark" => Some(Command::Mark),
            "list" => Some(Command::List),
            "review" => Some(Command::Review),
            "undo" => Some(Command::Undo),
            "redo" => Some(Command::Redo),
            "help" => Some(Command::Help),
            "quit" => Some(Command::Quit),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Command::New => "new",
            Command::Remove => "remove",
            Command::Update => "update",
            Command::Mark => "mark",
            Command::List => "list",
            Command::Review => "review",
            Command::Undo => "undo",
            Command::Redo => "redo",
            Command::Help => "help",
            Command::Quit => "quit",
        }
    }

    /// Usage string, reproduced verbatim by `help`.
    pub const fn usage(self) -> &'static str {
        match self {
            Command::New => "Usage: new WORD MEANING - Add a new word with its meaning",
            Command::Remove => "Usage: remove WORD - Remove a word to bin",
            Command::Update => {
                "Usage: update WORD NEW_MEANING - Update the meaning of a word and remove the old one to bin"
            }
            Command::Mark => "Usage: mark WORD - Mark a word as important",
            Command::List => LIST_USAGE,
            Command::Review => {
                "Usage: review WORD|-f list - increase reviews for given word or last listed ones"
            }
            Command::Undo => "Usage: undo - Undo last command",
            Command::Redo => "Usage: redo - Redo last undo command",
            Command::Help => "Usage: help [COMMAND] - Show help for commands",
            Command::Quit => "Usage: quit - Exit the program",
        }
    }

    /// Check the required-argument contract. Returns the usage string to print
    /// when the contract is violated, regardless of whatever other flags were
    /// supplied.
    pub fn check_usage(self, options: &Options) -> Option<&'static str> {
        let ok = match self {
            Command::New | Command::Update => options.word.is_some() && options.meaning.is_some(),
            Command::Remove | Command::Mark => options.word.is_some(),
            // Exactly one of a named word or a -f source.
            Command::Review => options.word.is_some() != options.from.is_some(),
            // Exactly one of a count or -a.
            Command::List => options.count.is_some() != options.all,
            Command::Undo | Command::Redo | Command::Help | Command::Quit => true,
        };
        if ok { None } else { Some(self.usage()) }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Flat option set produced by tokenizing the rest of an input line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Options {
    pub word: Option<String>,
    pub meaning: Option<String>,

    pub count: Option<usize>,
    pub all: bool,

    pub random: bool,
    pub review: bool,

    pub from: Option<String>,
    pub cancel: bool,
}

impl Options {
    /// Parse tokens left to right. Flags are consumed until the first token
    /// that is neither a flag nor purely numeric; that token becomes the word
    /// and everything after it, joined with single spaces, the meaning.
    pub fn parse(args: &[&str]) -> Options {
        let mut options = Options::default();
        let mut i = 0;
        while i < args.len() {
            match args[i] {
                "-r" => options.random = true,
                "-v" => options.review = true,
                "-rv" | "-vr" => {
                    options.random = true;
                    options.review = true;
                }
                "-a" => options.all = true,
                "-c" => options.cancel = true,
                "-f" => {
                    if let Some(next) = args.get(i + 1) {
                        options.from = Some((*next).to_string());
                        i += 1;
                    }
                }
                arg => {
                    if !arg.is_empty() && arg.chars().all(|c| c.is_ascii_digit()) {
                        if options.count.is_none() {
                            options.count = arg.parse().ok();
                        }
                    } else {
                        options.word = Some(arg.to_string());
                        if i + 1 < args.len() {
                            options.meaning = Some(args[i + 1..].join(" "));
                        }
                        break;
                    }
                }
            }
            i += 1;
        }
        options
    }
}
