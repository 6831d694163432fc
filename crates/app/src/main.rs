//! Timewarp - Main Entry Point
//!
//! Command-line front end for the logical clock. Each invocation resumes
//! from the later of the wall time and the node's latest block, so travels
//! made by earlier invocations add up.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use timewarp_application::LogicalClock;
use timewarp_domain::{TimeOffset, Timestamp};
use timewarp_infrastructure::{JsonRpcChain, Settings, SystemClock};

#[derive(Parser)]
#[command(name = "timewarp", version)]
#[command(about = "Move a development chain's clock into the future", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON-RPC endpoint of the node (overrides config and environment)
    #[arg(long, global = true)]
    rpc_url: Option<Url>,

    /// Settings file (TOML, JSON or YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the logical time (the later of wall time and the latest block)
    Now,
    /// Print the node's latest block
    Latest,
    /// Schedule the next block in the future
    Travel(TravelArgs),
    /// Mine a block if the node is behind the logical time
    Arrive,
}

#[derive(Args)]
struct TravelArgs {
    /// Seconds to travel
    #[arg(long, default_value_t = 0)]
    seconds: i64,

    /// Days to travel
    #[arg(long, default_value_t = 0)]
    days: i64,

    /// 30-day months to travel
    #[arg(long, default_value_t = 0)]
    months: i64,

    /// 365-day years to travel
    #[arg(long, default_value_t = 0)]
    years: i64,

    /// Mine a block right away so the new time is committed
    #[arg(long)]
    arrive: bool,
}

impl TravelArgs {
    fn offset(&self) -> TimeOffset {
        TimeOffset::seconds(self.seconds)
            + TimeOffset::days(self.days)
            + TimeOffset::months(self.months)
            + TimeOffset::years(self.years)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn render(timestamp: Timestamp) -> String {
    timestamp.to_datetime().map_or_else(
        || timestamp.to_string(),
        |datetime| format!("{timestamp} ({})", datetime.to_rfc3339()),
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(url) = cli.rpc_url {
        settings.rpc_url = url;
    }
    tracing::debug!(rpc_url = %settings.rpc_url, "connecting to node");

    let chain = Arc::new(JsonRpcChain::new(&settings)?);
    let mut clock = LogicalClock::resume(&SystemClock::new(), chain).await?;

    match cli.command {
        Command::Now => println!("{}", render(clock.now())),
        Command::Latest => {
            let block = clock.latest_block().await?;
            println!("block {} at {}", block.number, render(block.timestamp));
        }
        Command::Travel(args) => {
            let offset = args.offset();
            let now = if args.arrive {
                clock.advance_and_commit(offset).await?
            } else {
                clock.advance(offset).await?
            };
            println!("next block at {}", render(now));
        }
        Command::Arrive => {
            clock.commit().await?;
            let block = clock.latest_block().await?;
            println!("block {} at {}", block.number, render(block.timestamp));
        }
    }

    Ok(())
}
