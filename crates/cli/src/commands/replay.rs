use anyhow::{Context, Result};
use clap::Args;
use put_overlay_backtest::{HistoricalDataProvider, ReplayReport, ReplayRunner, ReportFormatter};
use put_overlay_strategy::{BenchmarkPoint, ProtectivePutStrategy, RebalanceOutcome};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Arguments for the replay command.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,

    /// Profile overlay (reads Config.<profile>.toml next to the config file)
    #[arg(long)]
    pub profile: Option<String>,

    /// Daily closes CSV (date,symbol,close)
    #[arg(long)]
    pub closes: PathBuf,

    /// Option chain CSV (date,id,underlying,right,strike,expiry,underlying_price)
    #[arg(long)]
    pub chains: Option<PathBuf>,

    /// Parameter override as key=value (repeatable), e.g. --param OOM=0.15
    #[arg(short, long = "param")]
    pub params: Vec<String>,

    /// Write the full report and benchmark series as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(Serialize)]
struct ReplayOutput<'a> {
    report: &'a ReplayReport<RebalanceOutcome>,
    benchmark: &'a [BenchmarkPoint],
}

/// Replays the strategy over recorded data and prints a summary.
pub fn run_replay(args: ReplayArgs) -> Result<()> {
    let config = super::load_config(&args.config, args.profile.as_deref(), &args.params)?;

    let data = HistoricalDataProvider::from_csv(
        &args.closes,
        args.chains.as_deref(),
        config.backtest.universe,
    )?;
    let strategy = ProtectivePutStrategy::new(config.strategy.clone(), config.backtest.initial_cash);

    let mut runner = ReplayRunner::new(strategy, data, &config.backtest);
    let report = runner.run()?;
    let benchmark = runner.algorithm().benchmark_series();

    println!("{}", ReportFormatter::format(&report, benchmark));

    if let Some(path) = &args.json {
        let output = ReplayOutput {
            report: &report,
            benchmark,
        };
        let json = serde_json::to_string_pretty(&output)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Wrote replay report");
    }

    Ok(())
}
