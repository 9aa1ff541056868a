use clap::{Parser, Subcommand};
use anyhow::Result;
use dotenvy::dotenv;

mod check;
mod crawl;
mod discovery;
mod extractor;
mod fetch;
mod inspect;
mod notion;
mod output;
mod telemetry;

#[derive(Parser)]
#[command(name = "crawl", about = "Company page crawler feeding a Notion database")]
struct Cli {
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover targets and write each company to Notion (plan-only without --apply)
    Run(crawl::CrawlCmd),
    /// Fetch one detail page and print the extracted records
    Extract(inspect::InspectCmd),
    /// Check Notion credentials and database properties
    Check(check::CheckCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // initialize logging/tracing (stderr). Respect RUST_LOG and CRAWL_LOG_FORMAT
    telemetry::config::init_tracing();

    match cli.command {
        Commands::Run(args) => crawl::run(args).await?,
        Commands::Extract(args) => inspect::run(args).await?,
        Commands::Check(args) => check::run(args).await?,
    }

    Ok(())
}
