//! CLI argument parsing for the word book.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "wb",
    about = "A personal vocabulary book with spaced-repetition review and undo/redo",
    version,
    after_help = "Logs are written to: ~/.local/share/wordbook/logs/wordbook.log"
)]
pub struct Cli {
    /// Directory holding the word files or database (default: current directory)
    #[arg(short = 'd', long)]
    pub dir: Option<PathBuf>,

    /// Persistence backend: "flat" (one text file per collection) or "sqlite"
    #[arg(short, long, default_value = "flat")]
    pub backend: String,
}
