//! Logbook command-line client
//!
//! Drives the project and event flows against the hosted GraphQL service
//! and the attachment bucket.
//!
//! Usage:
//!   logbook --config logbook.json projects
//!   logbook --config logbook.json toggle <event-id>

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use logbook_blobstore::S3ObjectStore;
use logbook_cli::{ConfigOverrides, DecisionArg, LogbookConfig};
use logbook_events::{EventService, ImportDocument, ProjectService, Transition};
use logbook_remote::{DataService, GraphqlClient};
use logbook_types::{EventId, ProjectId, PublicEventId};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "logbook")]
#[command(about = "Manage Logbook projects and events")]
struct Args {
    /// Path to the JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// GraphQL endpoint URL
    #[arg(long, env = "LOGBOOK_ENDPOINT")]
    endpoint: Option<String>,

    /// API key sent as `x-api-key`
    #[arg(long, env = "LOGBOOK_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Token sent as `Authorization`
    #[arg(long, env = "LOGBOOK_AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    /// Attachment bucket
    #[arg(long, env = "LOGBOOK_BUCKET")]
    bucket: Option<String>,

    /// Identity that owns private and protected attachments
    #[arg(long, env = "LOGBOOK_IDENTITY")]
    identity: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List projects
    Projects,
    /// Create a project
    CreateProject {
        name: String,
        #[arg(long)]
        id: Option<String>,
    },
    /// Delete a project
    DeleteProject { id: String },
    /// List the events of a project
    Events { project: String },
    /// Show an event and its visibility
    Status { event: String },
    /// Flip an event between private and public
    Toggle { event: String },
    /// Repair an event left between private and public
    Reconcile {
        event: String,
        #[arg(long, value_enum)]
        decision: DecisionArg,
        /// Mirror to link with `reuse-mirror`
        #[arg(long)]
        mirror: Option<String>,
    },
    /// Replace the note of an event
    Edit {
        event: String,
        /// New note text
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        /// Read the new note from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Delete an event, its mirror and its files
    DeleteEvent { event: String },
    /// Import a project export
    Import { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let overrides = ConfigOverrides {
        endpoint: args.endpoint.clone(),
        api_key: args.api_key.clone(),
        auth_token: args.auth_token.clone(),
        bucket: args.bucket.clone(),
        identity: args.identity.clone(),
    };
    let config = LogbookConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?
        .with_overrides(&overrides);
    config.validate().context("Invalid configuration")?;

    let data: Arc<dyn DataService> = Arc::new(
        GraphqlClient::new(config.graphql.clone()).context("Failed to build GraphQL client")?,
    );
    info!("Using {} at {}", data.service_name(), config.graphql.endpoint);
    let projects = ProjectService::new(Arc::clone(&data));

    match args.command {
        Command::Projects => print_json(&projects.list().await?)?,
        Command::CreateProject { name, id } => {
            let project = projects.create(&name, id.map(ProjectId::from)).await?;
            print_json(&project)?;
        }
        Command::DeleteProject { id } => projects.delete(ProjectId::from(id)).await?,
        Command::Events { project } => {
            print_json(&projects.events(&ProjectId::from(project)).await?)?;
        }
        Command::Import { file } => {
            let document = ImportDocument::load(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let report = projects.import(&document).await?;
            print_json(&report)?;
            if !report.failed.is_empty() {
                bail!("{} event(s) failed to import", report.failed.len());
            }
        }
        command => {
            config
                .validate_storage()
                .context("Invalid storage configuration")?;
            let store = S3ObjectStore::connect(config.storage.clone())
                .await
                .context("Failed to set up object storage")?;
            let events = EventService::new(data, Arc::new(store));
            run_event_command(&events, command).await?;
        }
    }

    Ok(())
}

async fn run_event_command(events: &EventService, command: Command) -> Result<()> {
    match command {
        Command::Status { event } => {
            let event = events.event(&EventId::from(event)).await?;
            println!("{}: {}", event.id, event.visibility());
            print_json(&event)?;
        }
        Command::Toggle { event } => {
            let event = events.event(&EventId::from(event)).await?;
            let transition = events.toggle_visibility(&event).await?;
            print_transition(&transition);
        }
        Command::Reconcile {
            event,
            decision,
            mirror,
        } => {
            let decision = decision.into_decision(mirror.map(PublicEventId::from))?;
            let event = events.event(&EventId::from(event)).await?;
            let transition = events.reconcile(&event, decision).await?;
            print_transition(&transition);
        }
        Command::Edit { event, text, file } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => bail!("either --text or --file is required"),
            };
            let event = events.event(&EventId::from(event)).await?;
            let edit = events.edit_note(&event, &text).await?;
            if edit.changed {
                println!("{}: note updated, mirror {:?}", edit.event.id, edit.mirror);
            } else {
                println!("{}: note unchanged", edit.event.id);
            }
        }
        Command::DeleteEvent { event } => {
            let event = events.event(&EventId::from(event)).await?;
            let report = events.delete_event(&event).await;
            print_json(&report)?;
            if !report.is_complete() {
                bail!("event {} was not deleted cleanly", event.id);
            }
        }
        other => bail!("{other:?} does not operate on events"),
    }
    Ok(())
}

fn print_transition(transition: &Transition) {
    println!(
        "{}: {} -> {}",
        transition.event.id, transition.from, transition.to
    );
    for warning in &transition.warnings {
        warn!("{}", warning);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
