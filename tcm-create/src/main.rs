//! tcm-create - register text chunks with bibliographic metadata
//!
//! Drives a [`CreateTextSession`] from the command line:
//!
//! ```text
//! tcm-create options
//! tcm-create manual --text "Hello world" --author 7 --title 1
//! tcm-create file notes.txt --status draft --publisher 2
//! ```
//!
//! In file mode the catalog extracts what metadata it can; any flag given on
//! the command line overrides the extracted value before saving.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tcm_common::config::{resolve_client_config, ConfigOverrides};
use tcm_common::events::{CreationEvent, EventBus};
use tcm_create::api::{HttpCatalogClient, UploadFile};
use tcm_create::models::{
    EntryMode, MetadataDraft, PublicationStatus, ReferenceKind, ReferenceOptions,
};
use tcm_create::{CreateTextSession, IngestOutcome, WorkflowError};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

/// Command-line arguments for tcm-create
#[derive(Parser, Debug)]
#[command(name = "tcm-create")]
#[command(about = "Create text chunks with bibliographic metadata")]
#[command(version)]
struct Args {
    /// Catalog API base URL (overrides TCM_API_URL and the config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Config file to use instead of the platform default
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available authors, titles and publishers
    Options,

    /// Create a chunk from typed text
    Manual {
        /// Chunk text
        #[arg(long, conflicts_with = "text_file", required_unless_present = "text_file")]
        text: Option<String>,

        /// Read the chunk text from a file instead
        #[arg(long)]
        text_file: Option<PathBuf>,

        #[command(flatten)]
        metadata: MetadataArgs,
    },

    /// Upload a file, then save its metadata
    File {
        /// File to upload
        path: PathBuf,

        #[command(flatten)]
        metadata: MetadataArgs,
    },
}

#[derive(clap::Args, Debug, Default)]
struct MetadataArgs {
    #[arg(long)]
    edition: Option<String>,

    /// Publish date (YYYY-MM-DD)
    #[arg(long)]
    publish_date: Option<String>,

    /// draft, published, archived or unknown
    #[arg(long)]
    status: Option<PublicationStatus>,

    /// ISBN, DOI or custom identifier
    #[arg(long)]
    identifier: Option<String>,

    /// Author id (repeatable)
    #[arg(long = "author")]
    authors: Vec<i64>,

    /// Title id
    #[arg(long)]
    title: Option<i64>,

    /// Publisher id (repeatable)
    #[arg(long = "publisher")]
    publishers: Vec<i64>,
}

type LogFilterHandle = reload::Handle<EnvFilter, Registry>;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing before anything can log
    let log_filter = init_tracing();

    let args = Args::parse();

    let config = resolve_client_config(&ConfigOverrides {
        api_url: args.api_url.clone(),
        timeout_secs: args.timeout_secs,
        config_path: args.config.clone(),
    })
    .context("Failed to resolve configuration")?;

    // RUST_LOG wins over the config file level
    if std::env::var_os("RUST_LOG").is_none() {
        if let Err(e) = log_filter.reload(EnvFilter::new(&config.log_level)) {
            warn!("Failed to apply log level {}: {}", config.log_level, e);
        }
    }

    info!("Catalog API: {}", config.api_base_url);

    let client = HttpCatalogClient::new(&config).context("Failed to build HTTP client")?;
    let event_bus = EventBus::new(64);
    let printer = tokio::spawn(print_progress(event_bus.subscribe(), |line| {
        eprintln!("{}", line)
    }));

    let session = CreateTextSession::new(Arc::new(client), event_bus);
    let result = run(&session, args.command).await;

    // Dropping the session closes the bus so the printer drains and exits
    drop(session);
    let _ = printer.await;

    result
}

fn init_tracing() -> LogFilterHandle {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    handle
}

async fn run(session: &CreateTextSession, command: Command) -> Result<()> {
    if let Err(e) = session.load_reference_data().await {
        bail!("Error loading options: {}", e);
    }

    match command {
        Command::Options => {
            print_options(&session.snapshot().await.options);
            Ok(())
        }
        Command::Manual {
            text,
            text_file,
            metadata,
        } => {
            let text = match (text, text_file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => bail!("Either --text or --text-file is required"),
            };

            session.set_text(text).await?;
            apply_metadata(session, &metadata).await?;
            finish(session).await
        }
        Command::File { path, metadata } => {
            session.set_mode(EntryMode::File).await;

            let file = UploadFile::from_path(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;

            match session.ingest(file).await? {
                IngestOutcome::Applied { chunk_id } => {
                    println!("Uploaded {} as text chunk {}", path.display(), chunk_id);
                }
                IngestOutcome::Discarded { seq } => {
                    bail!("Upload attempt {} was superseded", seq);
                }
            }

            apply_metadata(session, &metadata).await?;
            finish(session).await
        }
    }
}

/// Apply command-line metadata on top of the current draft
async fn apply_metadata(
    session: &CreateTextSession,
    args: &MetadataArgs,
) -> std::result::Result<(), WorkflowError> {
    if let Some(edition) = &args.edition {
        session.set_edition(edition.clone()).await?;
    }
    if let Some(date) = &args.publish_date {
        session.set_publish_date(date.clone()).await?;
    }
    if let Some(status) = args.status {
        session.set_publication_status(status).await?;
    }
    if let Some(identifier) = &args.identifier {
        session.set_identifier(identifier.clone()).await?;
    }
    if !args.authors.is_empty() {
        session.select_authors(args.authors.iter().copied()).await?;
    }
    if args.title.is_some() {
        session.select_title(args.title).await?;
    }
    if !args.publishers.is_empty() {
        session.select_publishers(args.publishers.iter().copied()).await?;
    }
    Ok(())
}

async fn finish(session: &CreateTextSession) -> Result<()> {
    let state = session.snapshot().await;
    print_draft_summary(&state.options, &state.draft);

    let confirmation = session.submit().await?;
    println!("{}", confirmation);
    Ok(())
}

fn print_options(options: &ReferenceOptions) {
    for (heading, kind) in [
        ("Authors", ReferenceKind::Author),
        ("Titles", ReferenceKind::Title),
        ("Publishers", ReferenceKind::Publisher),
    ] {
        println!("{}:", heading);
        let entries = options.options(kind);
        if entries.is_empty() {
            println!("  (none)");
        }
        for option in entries {
            println!("  {:>5}  {}", option.id, option.label);
        }
    }
}

fn print_draft_summary(options: &ReferenceOptions, draft: &MetadataDraft) {
    println!("Metadata:");
    println!("  title:       {}", labels(options, ReferenceKind::Title, draft.title_id));
    println!(
        "  authors:     {}",
        labels(options, ReferenceKind::Author, draft.author_ids.iter().copied())
    );
    println!(
        "  publishers:  {}",
        labels(options, ReferenceKind::Publisher, draft.publisher_ids.iter().copied())
    );
    println!("  edition:     {}", draft.edition);
    println!("  published:   {}", draft.publish_date);
    println!("  status:      {}", draft.publication_status.label());
    println!("  identifier:  {}", draft.identifier);
}

fn labels(options: &ReferenceOptions, kind: ReferenceKind, ids: impl IntoIterator<Item = i64>) -> String {
    ids.into_iter()
        .map(|id| options.label(kind, id).unwrap_or("?").to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Render progress events as lines for the operator
fn progress_line(event: &CreationEvent) -> Option<String> {
    match event {
        CreationEvent::IngestionStarted { file_name, .. } => {
            Some(format!("Uploading {}...", file_name))
        }
        CreationEvent::IngestionFailed { message, .. } => {
            Some(format!("Upload failed: {}", message))
        }
        CreationEvent::SubmissionStarted { mode, .. } => {
            Some(format!("Submitting ({} mode)...", mode))
        }
        CreationEvent::SubmissionFailed { message, .. } => {
            Some(format!("Submission failed: {}", message))
        }
        _ => None,
    }
}

/// Forward progress lines to `sink` until the bus closes
///
/// A lagging receiver skips what it missed and keeps going.
async fn print_progress<F>(mut rx: broadcast::Receiver<CreationEvent>, mut sink: F)
where
    F: FnMut(String),
{
    loop {
        match rx.recv().await {
            Ok(event) => {
                if let Some(line) = progress_line(&event) {
                    sink(line);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Progress output fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn upload_failed(message: &str) -> CreationEvent {
        CreationEvent::IngestionFailed {
            session_id: Uuid::nil(),
            seq: 1,
            message: message.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_progress_survives_lag_and_drains_on_close() {
        let event_bus = EventBus::new(2);
        let rx = event_bus.subscribe();

        for message in ["one", "two", "three", "four"] {
            event_bus.emit_lossy(upload_failed(message));
        }
        drop(event_bus);

        let mut lines = Vec::new();
        print_progress(rx, |line| lines.push(line)).await;

        assert_eq!(
            lines,
            vec!["Upload failed: three".to_string(), "Upload failed: four".to_string()]
        );
    }

    #[test]
    fn test_progress_line_skips_quiet_events() {
        let event = CreationEvent::IngestionDiscarded {
            session_id: Uuid::nil(),
            seq: 3,
            timestamp: Utc::now(),
        };
        assert_eq!(progress_line(&event), None);
        assert_eq!(
            progress_line(&upload_failed("disk full")).as_deref(),
            Some("Upload failed: disk full")
        );
    }
}
