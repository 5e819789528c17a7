//! carelink - operator CLI for the clinical scheduling backend
//!
//! Terminal surface over the client stack: session identity, OTP login,
//! route authorization checks, the back-office worklist, and the
//! poll-driven status flows.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carelink_client::{send_otp, verify_otp, ApiClient, IdentityCache};
use carelink_gate::{GateState, RouteGate, RoutePolicy};
use carelink_types::{PageCursor, WorkItem};
use carelink_watch::{compliance_watcher, document_watcher, signature_watcher, StatusWatcher};
use carelink_worklist::{Worklist, WorklistReader};

mod error;

use error::CliResult;

#[derive(Parser)]
#[command(name = "carelink")]
#[command(about = "Carelink client CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "CARELINK_API", default_value = "http://localhost:8000")]
    api: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and print the current session identity
    Whoami,

    /// Request a one-time login code for an email or phone
    Login { contact: String },

    /// Exchange a one-time code for a session
    Verify { contact: String, code: String },

    /// Check whether the current session may open a path
    Authorize { path: String },

    /// Back-office worklist
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Poll a resource until it reaches a terminal status
    Watch {
        #[command(subcommand)]
        command: WatchCommands,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// List tasks, newest first
    List {
        /// Only show tasks with this status (e.g. open)
        #[arg(long)]
        status: Option<String>,

        /// Page size
        #[arg(long, default_value_t = 25)]
        limit: usize,

        /// Keep paging until the feed is exhausted
        #[arg(long)]
        all: bool,
    },

    /// Mark a task done
    Complete { id: i64 },
}

#[derive(Subcommand)]
enum WatchCommands {
    /// Watch a consent signature request until signed
    Signature { request_id: String },

    /// Watch an asynchronous compliance job
    Compliance { request_id: i64 },

    /// Wait for a discharge summary to become available
    Document { encounter_id: String },
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let client = ApiClient::new(&cli.api)?;

    match cli.command {
        Commands::Whoami => whoami(&client).await,
        Commands::Login { contact } => login(&client, &contact).await,
        Commands::Verify { contact, code } => verify(&client, &contact, &code).await,
        Commands::Authorize { path } => authorize(&client, &path).await,
        Commands::Tasks { command } => tasks(&client, command).await,
        Commands::Watch { command } => watch(&client, command).await,
    }
}

async fn whoami(client: &ApiClient) -> CliResult<()> {
    let cache = IdentityCache::new();
    let resolved = cache.resolved(client).await;

    println!("role: {}", resolved.identity.role);
    if let Some(id) = resolved.identity.id {
        println!("id:   {id}");
    }
    if let Some(contact) = &resolved.identity.contact {
        println!("via:  {contact}");
    }
    if let Some(diag) = &resolved.diagnostic {
        eprintln!("{diag}");
    }
    Ok(())
}

async fn login(client: &ApiClient, contact: &str) -> CliResult<()> {
    let dispatch = send_otp(client, contact).await?;
    println!("Code sent to {contact}");
    // Dev backends echo the code back to ease local testing.
    if let Some(code) = dispatch.dev_code {
        println!("dev code: {code}");
    }
    Ok(())
}

async fn verify(client: &ApiClient, contact: &str, code: &str) -> CliResult<()> {
    let session = verify_otp(client, contact, code).await?;
    println!("Signed in.");
    if let Some(role) = session.get("role").and_then(|r| r.as_str()) {
        println!("role: {role}");
    }
    Ok(())
}

async fn authorize(client: &ApiClient, path: &str) -> CliResult<()> {
    let gate = RouteGate::new(
        client.clone(),
        Arc::new(IdentityCache::new()),
        RoutePolicy::standard()?,
    );

    match gate.evaluate(path).await {
        GateState::Allowed { role } => {
            println!("ALLOWED  {path}  (as {role})");
            Ok(())
        }
        GateState::Blocked { message, .. } => {
            eprintln!("{message}");
            std::process::exit(1);
        }
        GateState::Resolving => unreachable!("evaluate never yields an intermediate state"),
    }
}

async fn tasks(client: &ApiClient, command: TaskCommands) -> CliResult<()> {
    match command {
        TaskCommands::List { status, limit, all } => {
            let mut reader = WorklistReader::new(client.clone());
            if let Some(status) = status {
                reader = reader.with_status(status);
            }

            let mut cursor = PageCursor::first(limit);
            loop {
                let page = reader.load_page(&cursor).await?;
                for item in &page.items {
                    print_item(item);
                }
                match page.next_cursor {
                    Some(next) if all && page.has_more => cursor = next,
                    _ => break,
                }
            }
            Ok(())
        }
        TaskCommands::Complete { id } => {
            // Seed the accumulator with the page holding the row so the
            // in-place patch has something to patch.
            let mut list = Worklist::new(client.clone(), 100);
            list.refresh().await?;
            list.complete(id).await?;
            println!("Task {id} done.");
            Ok(())
        }
    }
}

fn print_item(item: &WorkItem) {
    let assignee = item.assignee.as_deref().unwrap_or("-");
    println!(
        "{:>6}  {:<22} {:<12} {}",
        item.id, item.kind, item.status, assignee
    );
}

async fn watch(client: &ApiClient, command: WatchCommands) -> CliResult<()> {
    let interval = Duration::from_secs(3);
    let watcher = match command {
        WatchCommands::Signature { request_id } => {
            signature_watcher(client.clone(), request_id, interval)
        }
        WatchCommands::Compliance { request_id } => {
            compliance_watcher(client.clone(), request_id, interval)
        }
        WatchCommands::Document { encounter_id } => {
            document_watcher(client.clone(), encounter_id, interval)
        }
    };
    drive(watcher).await
}

/// Print phase transitions until the watch reaches a terminal phase.
async fn drive(watcher: StatusWatcher) -> CliResult<()> {
    let mut last = watcher.phase();
    println!("{}  {}", watcher.subject(), last);

    loop {
        tokio::time::sleep(Duration::from_millis(250)).await;
        let state = watcher.state();
        if state.phase != last {
            last = state.phase;
            println!("{}  {}", state.subject, state.phase);
        }
        if state.phase.is_terminal() {
            if !state.detail.is_null() {
                println!("{}", serde_json::to_string_pretty(&state.detail).unwrap_or_default());
            }
            if let Some(error) = state.last_error {
                eprintln!("{error}");
                std::process::exit(1);
            }
            return Ok(());
        }
    }
}
