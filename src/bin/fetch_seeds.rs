//! Fetch Wikipedia vital-article titles into the concept seed CSV.
//!
//! Usage:
//!   cargo run --bin fetch_seeds -- --levels 1,2,3 --output scraper/wiki_seeds.csv

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use daydream::seeds::{DEFAULT_API_URL, DEFAULT_USER_AGENT, SeedFetcher, write_seed_file};

#[derive(Parser)]
#[command(name = "fetch_seeds")]
#[command(about = "Write Wikipedia vital-article titles to a seed CSV", long_about = None)]
struct Args {
    /// Vital-article levels to include (1 = ~10 articles, 5 = ~50,000)
    #[arg(long, value_delimiter = ',', default_values_t = [1u8, 2, 3, 4, 5],
          value_parser = clap::value_parser!(u8).range(1..=5))]
    levels: Vec<u8>,

    #[arg(long, default_value = "scraper/wiki_seeds.csv")]
    output: PathBuf,

    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    daydream::load_env();
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "daydream=info,fetch_seeds=info".into()),
        )
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let fetcher = SeedFetcher::new(&args.api_url, &args.user_agent)?;
    let titles = fetcher.fetch_levels(&args.levels).await?;
    println!("Fetched {} vital-article titles.", titles.len());

    let written = write_seed_file(&args.output, &titles)?;
    println!("Wrote {} titles to {}", written, args.output.display());
    Ok(())
}
