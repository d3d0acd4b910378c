//! Robots - log store console
//!
//! Exercises the bounded log source from the command line: the eviction
//! walkthrough, a concurrent load test and a live log view.

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use robots_logging::RobotsSubscriberBuilder;

use robots_console::{AppContext, Settings, scenarios};

#[derive(Parser)]
#[command(name = "robots", about = "Bounded log store console", version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the log source capacity
    #[arg(long, global = true)]
    capacity: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append a, b, c, d to a source of capacity 3 and print the result
    Demo,

    /// Append from many producers at once and report throughput
    Stress {
        /// Number of concurrent producers
        #[arg(short, long, default_value = "8")]
        producers: usize,

        /// Entries appended by each producer
        #[arg(short = 'n', long, default_value = "10000")]
        per_producer: usize,
    },

    /// Print entries live while producers append on a timer
    Watch {
        /// Entries each producer appends
        #[arg(short, long, default_value = "20")]
        ticks: u32,

        /// Milliseconds between ticks
        #[arg(short, long, default_value = "100")]
        interval_ms: u64,

        /// Number of producers
        #[arg(short, long, default_value = "2")]
        producers: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(capacity) = cli.capacity {
        settings.log_source.capacity = capacity;
    }
    if cli.verbose {
        settings.logging.default_level = "debug".to_string();
    }

    let ctx = AppContext::new(settings)?;

    // The viewer owns stdout while watching
    let console = !matches!(cli.command, Commands::Watch { .. });
    let _guard = RobotsSubscriberBuilder::new()
        .with_config(ctx.settings().logging.clone())
        .with_console(console && ctx.settings().logging.console.enabled)
        .with_log_source(ctx.source().clone())
        .init();

    match cli.command {
        Commands::Demo => {
            scenarios::run_demo(&mut io::stdout())?;
        }
        Commands::Stress { producers, per_producer } => {
            let report = scenarios::run_stress(&ctx, producers, per_producer).await?;
            println!("Appended:      {}", report.appended);
            println!("Retained:      {} / {}", report.retained, report.capacity);
            println!("Notifications: {}", report.notifications);
            println!("Elapsed:       {:?}", report.elapsed);
            println!("Throughput:    {:.0} appends/s", report.per_second());
        }
        Commands::Watch { ticks, interval_ms, producers } => {
            let printed = scenarios::run_watch(&ctx, ticks, interval_ms, producers).await?;
            println!("-- {} entries shown, {} retained --", printed, ctx.source().size());
        }
    }

    Ok(())
}
