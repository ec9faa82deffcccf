// ─────────────────────────────────────────────────────────────────────────────
//  Fundtrace: fund flow tracer
//
//  Seeds a graph with an address, pulls its history from a block explorer and
//  grows the graph node by node. Every command works on one stored session.
// ─────────────────────────────────────────────────────────────────────────────
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use fundtrace::Result;
use fundtrace::TraceError;
use fundtrace::Tracker;
use fundtrace::config::load_config;
use fundtrace::model::CryptoType;
use fundtrace::session::redis::make_redis_session_store;
use fundtrace::setup_tracing;
use tracing::error;
use tracing::info;

const ENGINE_NAME: &str = "fundtrace";

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[clap(name = "fundtrace", about = "Trace crypto fund flows as a graph of addresses.")]
struct Cli {
    /// Path to the TOML configuration
    #[clap(long, global = true, default_value = "Config.toml")]
    config: String,
    #[clap(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List your sessions, newest first.
    Sessions,
    /// Create an empty session.
    New { name: String },
    /// Seed the graph with an address and fetch its transactions.
    Add {
        #[clap(long)]
        session: String,
        address: String,
        #[clap(long = "type", value_enum, default_value = "eth")]
        crypto_type: CryptoType,
    },
    /// Fetch more transactions for a node already in the graph.
    Expand {
        #[clap(long)]
        session: String,
        node: String,
    },
    /// Tag a node. Tags containing Fund/Deposit or Victim recolor it.
    Label {
        #[clap(long)]
        session: String,
        node: String,
        text: String,
    },
    /// Override a node's color.
    Color {
        #[clap(long)]
        session: String,
        node: String,
        color: String,
    },
    /// Print the graph and the account summaries.
    Show {
        #[clap(long)]
        session: String,
    },
    /// Select a node and print its transactions.
    Select {
        #[clap(long)]
        session: String,
        node: String,
    },
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.config)?;
    setup_tracing(ENGINE_NAME, &config.logging)?;
    info!("fundtrace::run::config_loaded::{}", cli.config);

    let store = make_redis_session_store(ENGINE_NAME, &config.storage_redis).await?;
    let tracker = Tracker::from_config(&config, Arc::new(store))?;

    match cli.command {
        Command::Sessions => {
            let sessions = tracker.list_sessions().await?;
            match cli.format {
                OutputFormat::Json => print_json(&sessions)?,
                OutputFormat::Text => {
                    for session in sessions {
                        println!("{}  {}  {}", session.id, session.created.to_rfc3339(), session.name);
                    }
                },
            }
        },
        Command::New { name } => {
            let meta = tracker.create_session(&name).await?;
            match cli.format {
                OutputFormat::Json => print_json(&meta)?,
                OutputFormat::Text => println!("{}", meta.id),
            }
        },
        Command::Add {
            session,
            address,
            crypto_type,
        } => {
            tracker.load_session(&session).await?;
            let report = tracker.add_address(&address, crypto_type).await?;
            print_transactions(&tracker, cli.format, &tracker.last_transactions().await)?;
            info!("fundtrace::add::merged::{}", report.merged);
        },
        Command::Expand { session, node } => {
            tracker.load_session(&session).await?;
            tracker.on_node_activated(&node).await?;
            print_transactions(&tracker, cli.format, &tracker.last_transactions().await)?;
        },
        Command::Label { session, node, text } => {
            tracker.load_session(&session).await?;
            tracker.add_label(&node, &text).await?;
        },
        Command::Color { session, node, color } => {
            tracker.load_session(&session).await?;
            tracker.set_color(&node, &color).await?;
        },
        Command::Show { session } => {
            tracker.load_session(&session).await?;
            let snapshot = tracker.snapshot().await;
            let summaries = tracker.summaries().await;
            match cli.format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "nodes": snapshot.nodes,
                    "edges": snapshot.edges,
                    "summaries": summaries,
                }))?,
                OutputFormat::Text => {
                    println!("nodes: {}  edges: {}", snapshot.nodes.len(), snapshot.edges.len());
                    for edge in &snapshot.edges {
                        println!("  {} -> {}  {}", edge.from, edge.to, edge.label);
                    }
                    for summary in summaries {
                        println!("{}", summary);
                    }
                },
            }
        },
        Command::Select { session, node } => {
            tracker.load_session(&session).await?;
            tracker.on_node_selected(&node).await?;
            print_transactions(&tracker, cli.format, &tracker.selected_transactions().await)?;
        },
    }
    Ok(())
}

fn print_transactions(
    tracker: &Tracker,
    format: OutputFormat,
    transactions: &[fundtrace::model::Transaction],
) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&transactions),
        OutputFormat::Text => {
            for tx in transactions {
                println!("{}  {} -> {}  {} {}", tx.timestamp.to_rfc3339(), tx.from, tx.to, tx.amount, tx.currency);
                if let Some(link) = tracker.transaction_link(tx) {
                    println!("    {}", link);
                }
            }
            Ok(())
        },
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("fundtrace::command_failed::{:#}", e);
            match TraceError::kind_of(&e) {
                Some(kind) => eprintln!("{}", kind),
                None => eprintln!("{:#}", e),
            }
            ExitCode::FAILURE
        },
    }
}
