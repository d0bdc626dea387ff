use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "roulette", about = "Pick who goes first at the daily")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Participants service URL (overrides remote.base_url)
    #[arg(long, global = true, value_name = "URL")]
    server: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Spin the wheel and pick a participant
    Spin(commands::spin::SpinArgs),
    /// Show the pool and who is still eligible
    Pool(commands::pool::PoolArgs),
    /// Show past picks grouped by day
    History(commands::history::HistoryArgs),
    /// Clear every pick for a filter
    Reset(commands::reset::ResetArgs),
    /// Show or change the preferred filter
    Filter(commands::filter::FilterArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let server = cli.server;
    match cli.command {
        Commands::Spin(args) => commands::spin::run(args, server).await,
        Commands::Pool(args) => commands::pool::run(args, server).await,
        Commands::History(args) => commands::history::run(args, server).await,
        Commands::Reset(args) => commands::reset::run(args, server).await,
        Commands::Filter(args) => commands::filter::run(args, server).await,
        Commands::Config(args) => commands::config::run(args),
    }
}
