use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use preflop_quiz::chart::Chart;
use preflop_quiz::web;
use preflop_quiz::{Trainer, TrainerConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "preflop-quiz",
    version,
    about = "Spot the altered frequencies in a heads-up preflop chart",
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Chart JSON file (hands -> suitedness patterns -> frequencies)
    #[arg(long, global = true)]
    chart: Option<PathBuf>,

    /// JSON file with trainer defaults; flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of hands to quiz (defaults to 5)
    #[arg(long)]
    rounds: Option<u32>,

    /// RNG seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Disable ANSI colors in CLI output
    #[arg(long = "no-color", default_value_t = false)]
    no_color: bool,

    /// Answer every hand perfectly (useful for smoke tests)
    #[arg(long, default_value_t = false)]
    auto: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the web server
    Serve {
        /// Address to bind (HOST:PORT)
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = color_eyre::install();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { addr }) => {
            init_tracing("info");
            run_server(addr, cli.chart).await?
        }
        None => {
            init_tracing("warn");
            run_cli(cli)?
        }
    }

    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_cli(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => TrainerConfig::from_file(path)?,
        None => TrainerConfig::default(),
    };
    if let Some(chart) = cli.chart {
        config.chart = chart;
    }
    if let Some(rounds) = cli.rounds {
        config.rounds = rounds;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.no_color |= cli.no_color;

    let mut trainer = Trainer::new(config)?;
    if cli.auto {
        let score = trainer.autoplay_perfect()?;
        trainer.print_summary(&score);
        Ok(())
    } else {
        trainer.run()
    }
}

async fn run_server(addr: String, chart: Option<PathBuf>) -> Result<()> {
    let addr: SocketAddr = addr.parse()?;
    let path = chart.unwrap_or_else(|| PathBuf::from(preflop_quiz::trainer::DEFAULT_CHART_PATH));
    let chart = Chart::load(path)?;
    web::serve(addr, Arc::new(chart)).await
}
