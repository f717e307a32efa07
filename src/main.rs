//! Word book REPL - reads one command per line and applies it to the book.

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use wordbook::{FlatFileRepository, Outcome, Repository, SqliteRepository, WordBook};

mod cli;

use cli::Cli;

fn setup_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wordbook")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("wordbook.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn get_data_dir(cli: &Cli) -> PathBuf {
    cli.dir
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn open_repository(cli: &Cli) -> Result<Box<dyn Repository>> {
    let data_dir = get_data_dir(cli);
    match cli.backend.as_str() {
        "flat" => Ok(Box::new(FlatFileRepository::new(&data_dir))),
        "sqlite" => {
            let db_path = data_dir.join("wordbook.db");
            Ok(Box::new(
                SqliteRepository::open(&db_path).context("Failed to open sqlite backend")?,
            ))
        }
        other => eyre::bail!("Unknown backend '{}': expected 'flat' or 'sqlite'", other),
    }
}

fn run(cli: Cli) -> Result<()> {
    let repo = open_repository(&cli)?;
    let mut book = WordBook::new(repo).context("Failed to load word book")?;

    let stdin = io::stdin();
    let mut input = String::new();
    loop {
        print!("{} ", ">>".cyan());
        io::stdout().flush().context("Failed to flush prompt")?;

        input.clear();
        let bytes = stdin
            .lock()
            .read_line(&mut input)
            .context("Failed to read input")?;
        if bytes == 0 {
            // EOF
            break;
        }

        match book.handle(input.trim()) {
            Outcome::Output(lines) => {
                for line in lines {
                    println!("{line}");
                }
            }
            Outcome::Quit => {
                println!("Exiting the program...");
                break;
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    info!("Session started: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
