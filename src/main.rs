//! daydream: pairs random concepts, asks a model to connect them, has the
//! model critique the result, and streams each finished thought.
//!
//! Usage:
//!   cargo run -- serve
//!   cargo run -- dream --turns 5 --rank-by coherence

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use daydream::{Axis, Config, DaydreamClient, StreamEvent, Thought, ThoughtBoard};

#[derive(Parser)]
#[command(name = "daydream")]
#[command(about = "Concept-pairing idea generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the streaming run endpoint over HTTP
    Serve {
        /// Overrides server.http_bind
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Start a run against a server and print the ranked thoughts
    Dream {
        #[arg(long, default_value = "http://127.0.0.1:8787")]
        server: String,
        #[arg(long, default_value_t = 5)]
        turns: u32,
        /// Falls back to OPENAI_API_KEY
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long, default_value_t = Axis::Novelty)]
        rank_by: Axis,
        /// Overrides server.route
        #[arg(long)]
        route: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(config.log_filter())
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.http_bind = bind;
            }
            serve(config).await
        }
        Commands::Dream {
            server,
            turns,
            api_key,
            rank_by,
            route,
        } => {
            let api_key = api_key
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .unwrap_or_default();
            let route = route.unwrap_or_else(|| config.server.route.clone());
            dream(&server, &route, &api_key, turns, rank_by).await
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
            signal.cancel();
        }
    });

    daydream::http::start_http_server(config, shutdown).await?;
    Ok(())
}

async fn dream(server: &str, route: &str, api_key: &str, turns: u32, rank_by: Axis) -> Result<()> {
    let client = DaydreamClient::new(server, route)?;
    let mut board = ThoughtBoard::new(rank_by);

    let outcome = client
        .run(api_key, turns, &mut board, |event, board| match event {
            StreamEvent::ActiveConcepts(pair) => println!("Pondering: {}", pair),
            StreamEvent::FinishedThought(_) => {
                if let Some(t) = board.thoughts().last() {
                    println!("Finished: {} (novelty {})", t.concepts, t.novelty);
                }
            }
        })
        .await;

    match outcome {
        Ok(()) => {}
        // Rejected before anything streamed; nothing to show.
        Err(e @ daydream::DaydreamError::Validation { .. }) => {
            return Err(e).context("server rejected the run");
        }
        Err(e) => warn!("Stream ended abruptly: {}", e),
    }

    println!();
    println!("{} thoughts, ranked by {}:", board.thoughts().len(), board.rank_axis());
    for (i, thought) in board.ranked().into_iter().enumerate() {
        print_thought(i + 1, thought);
    }
    Ok(())
}

fn print_thought(rank: usize, t: &Thought) {
    println!();
    println!(
        "{:>2}. {}  [novelty {} | coherence {} | usefulness {}]",
        rank, t.concepts, t.novelty, t.coherence, t.usefulness
    );
    println!("{}", t.thought.trim());
    if !t.justification.is_empty() {
        println!("-- {}", t.justification);
    }
}
