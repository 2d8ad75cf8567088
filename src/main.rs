//! Command-line entry point for inspecting and updating a bundle store.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{
    Parser,
    Subcommand,
};
use i18n_bundle_store::{
    BundleStore,
    LanguageCode,
    TranslationSet,
};
use tracing_subscriber::EnvFilter;

/// Versioned store of localized string catalogs.
#[derive(Debug, Parser)]
#[command(name = "i18n-bundle-store", version, about)]
struct Cli {
    /// Directory holding the versioned bundles
    #[arg(long, env = "BUNDLE_STORE_ROOT")]
    root: PathBuf,

    /// Read-only default resources used when the store is empty
    #[arg(long, env = "BUNDLE_STORE_DEFAULTS")]
    defaults: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// List bundle versions on disk, newest first
    Versions,
    /// Print a language's catalog, or a single entry
    Show {
        /// Language code, e.g. `en`
        language: String,
        /// Key to look up
        key: Option<String>,
    },
    /// Merge translations from a JSON file (`{"en": {"key": "text"}}`)
    Apply {
        /// Path to the update file
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Runs a subcommand against the store.
fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let store = BundleStore::open(&cli.root, &cli.defaults)?;
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Command::Versions => {
            let current = store.current_version();
            for candidate in store.layout().discover()? {
                let marker = if Some(&candidate.version) == current.as_ref() { "*" } else { " " };
                writeln!(stdout, "{marker} {}", candidate.version)?;
            }
        }
        Command::Show { language, key } => {
            let language = LanguageCode::new(language)?;
            let lease = store.bundle_for_language(&language);
            if let Some(key) = key {
                match lease.lookup(&key)? {
                    Some(text) => writeln!(stdout, "{text}")?,
                    None => return Err(format!("No translation for '{key}' in '{language}'").into()),
                }
            } else {
                let mut entries: Vec<_> = lease.catalog()?.into_iter().collect();
                entries.sort();
                for (key, text) in entries {
                    writeln!(stdout, "{key} = {text}")?;
                }
            }
        }
        Command::Apply { file } => {
            let content = std::fs::read_to_string(&file)?;
            let updates: TranslationSet = serde_json::from_str(&content)?;
            let version = store.apply_update(&updates)?;
            writeln!(stdout, "{version}")?;
        }
    }

    Ok(())
}
