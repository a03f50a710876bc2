//! PLA CLI: link autocomplete for markdown note vaults
//!
//! Commands: links, related, titles, complete, config, watch

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use pla_core::{DocumentId, DocumentIndex, EditorBuffer, Position, Settings, TextBuffer};
use pla_suggest::{
    display_label, recompute_file_links, recompute_related, vault_titles, LinkSuggester, Mode,
    Query, TriggerState,
};
use pla_vault::{Vault, VaultWatcher};

#[derive(Parser)]
#[command(name = "pla")]
#[command(version)]
#[command(about = "Link autocomplete for markdown note vaults")]
struct Cli {
    /// Settings file (TOML). Defaults apply when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct NoteArgs {
    /// Vault root directory
    #[arg(long)]
    vault: PathBuf,

    /// Active note: path relative to the vault, or its title
    #[arg(long)]
    note: String,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Links written in a note
    Links(NoteArgs),
    /// Notes related to a note, and the vault's field values
    Related(NoteArgs),
    /// Every note title and unresolved link target
    Titles {
        #[arg(long)]
        vault: PathBuf,
    },
    /// Type text into an empty line of a note and show what would be suggested
    #[command(alias = "c")]
    Complete {
        #[command(flatten)]
        note: NoteArgs,

        /// Text typed one character at a time
        #[arg(long)]
        text: String,

        /// Insert the suggestion at this index
        #[arg(long)]
        select: Option<usize>,

        /// Enable the space trigger regardless of settings
        #[arg(long)]
        auto_space: bool,
    },
    /// Print the effective settings
    Config,
    /// Recompute suggestions for a note whenever the vault changes
    Watch(NoteArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else if quiet {
        LevelFilter::ERROR
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Links(args) => {
            let (vault, id) = open_note(&args)?;
            let links = recompute_file_links(&vault, &id, settings.include_aliases);
            print_json(&serde_json::json!({ "note": id, "links": links }))
        }
        Commands::Related(args) => {
            let (vault, id) = open_note(&args)?;
            let related = recompute_related(&vault, &id, &settings);
            print_json(&serde_json::json!({
                "note": id,
                "links": related.links,
                "field_values": related.field_values,
            }))
        }
        Commands::Titles { vault } => {
            let vault = open_vault(&vault)?;
            print_json(&vault_titles(&vault))
        }
        Commands::Complete {
            note,
            text,
            select,
            auto_space,
        } => {
            let settings = Settings {
                auto_space: settings.auto_space || auto_space,
                ..settings
            };
            let (vault, _) = open_note(&note)?;
            print_json(&complete(&vault, settings, &text, select)?)
        }
        Commands::Config => {
            print!("{}", settings.to_toml()?);
            Ok(())
        }
        Commands::Watch(args) => watch(&args, settings),
    }
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    match path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display())),
        None => Ok(Settings::default()),
    }
}

fn open_vault(root: &Path) -> anyhow::Result<Vault> {
    let root = root
        .canonicalize()
        .with_context(|| format!("vault not found: {}", root.display()))?;
    Vault::open(&root).with_context(|| format!("failed to open vault {}", root.display()))
}

/// Open the vault and make `args.note` its active note.
fn open_note(args: &NoteArgs) -> anyhow::Result<(Vault, DocumentId)> {
    let mut vault = open_vault(&args.vault)?;
    let Some(id) = vault.resolve(&args.note).cloned() else {
        bail!("note not found in vault: {}", args.note);
    };
    vault.set_active(Some(id.clone()));
    Ok((vault, id))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{out}");
    Ok(())
}

#[derive(Debug, Serialize)]
struct Suggestion {
    value: String,
    label: String,
}

#[derive(Debug, Serialize)]
struct CompletionReport {
    state: &'static str,
    mode: Option<Mode>,
    query: Option<Query>,
    start: Option<Position>,
    end: Option<Position>,
    suggestions: Vec<Suggestion>,
    line: String,
}

/// Replay `text` as keystrokes against a blank line, the way a host editor
/// would call the suggester.
fn complete(
    vault: &Vault,
    settings: Settings,
    text: &str,
    select: Option<usize>,
) -> anyhow::Result<CompletionReport> {
    let mut suggester = LinkSuggester::new(settings);
    suggester.on_active_document_changed(vault);

    let mut buffer = TextBuffer::default();
    let mut found = None;
    for c in text.chars() {
        buffer.type_text(&c.to_string());
        found = match suggester.on_trigger(&mut buffer) {
            Some(_) => suggester.suggestions(),
            None => None,
        };
    }
    let found = found.unwrap_or_default();

    let state = match suggester.state() {
        TriggerState::Closed => "closed",
        TriggerState::MetadataValueComplete(_) => "metadata-value-complete",
        TriggerState::Open { .. } => "open",
    };
    let info = suggester.state().info().cloned();
    let mut report = CompletionReport {
        state,
        mode: suggester.state().mode(),
        query: info.as_ref().map(|i| i.query.clone()),
        start: info.as_ref().map(|i| i.start),
        end: info.as_ref().map(|i| i.end),
        suggestions: found
            .iter()
            .map(|value| Suggestion {
                value: value.clone(),
                label: display_label(value).to_string(),
            })
            .collect(),
        line: String::new(),
    };

    if let Some(index) = select {
        let Some(value) = found.get(index) else {
            bail!("no suggestion at index {index} ({} available)", found.len());
        };
        suggester.select_suggestion(&mut buffer, value);
        report.state = "closed";
    }
    report.line = buffer.line(buffer.cursor().line);
    Ok(report)
}

fn watch(args: &NoteArgs, settings: Settings) -> anyhow::Result<()> {
    let (mut vault, active) = open_note(args)?;
    let root = vault
        .root()
        .map(Path::to_path_buf)
        .context("vault has no root directory")?;

    let mut suggester = LinkSuggester::new(settings);
    suggester.on_active_document_changed(&vault);
    log_pools(&suggester);

    let watcher = VaultWatcher::start(&root).context("failed to watch vault")?;
    tracing::info!(root = %root.display(), note = %active, "watching vault");

    loop {
        let Some(event) = watcher.recv_timeout(Duration::from_secs(1)) else {
            continue;
        };
        let touched = match vault.apply(&event) {
            Ok(Some(id)) => id,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(path = %event.path().display(), error = %e, "failed to apply change");
                continue;
            }
        };

        if vault.active_document().is_none() {
            tracing::warn!(note = %active, "active note was removed");
            suggester.on_active_document_changed(&vault);
        } else {
            suggester.on_metadata_resolved(&vault, &touched);
        }
        log_pools(&suggester);
    }
}

fn log_pools(suggester: &LinkSuggester) {
    let memory = suggester.memory();
    tracing::info!(
        file_links = memory.file_links.len(),
        yaml_links = memory.yaml_links.len(),
        vault_links = memory.vault_links.len(),
        fields = memory.field_values.len(),
        "session memory"
    );
}
