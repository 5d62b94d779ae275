use clap::{Parser, Subcommand};

mod commands;

use commands::{ReplayArgs, SelectArgs, ShowConfigArgs};

#[derive(Parser)]
#[command(name = "put-overlay")]
#[command(about = "Equity holding with a monthly protective put overlay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay the strategy over recorded closes and option chains
    Replay(ReplayArgs),
    /// Show which put the monthly roll would buy on a given date
    Select(SelectArgs),
    /// Print the resolved configuration as JSON
    ShowConfig(ShowConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Replay(args) => commands::run_replay(args)?,
        Commands::Select(args) => commands::run_select(args)?,
        Commands::ShowConfig(args) => commands::run_show_config(args)?,
    }

    Ok(())
}
