use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use put_overlay_backtest::HistoricalDataProvider;
use put_overlay_strategy::{candidate_puts, select_protective_put, target_allocations, PutCriteria};
use std::path::PathBuf;

/// Arguments for the select command.
#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Option chain CSV (date,id,underlying,right,strike,expiry,underlying_price)
    #[arg(long)]
    pub chains: PathBuf,

    /// Observation date (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,

    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,

    /// Parameter override as key=value (repeatable)
    #[arg(short, long = "param")]
    pub params: Vec<String>,
}

/// Prints the put the monthly roll would buy from one day's chain.
pub fn run_select(args: SelectArgs) -> Result<()> {
    let config = super::load_config(&args.config, None, &args.params)?;
    let strategy = &config.strategy;

    let data = HistoricalDataProvider::from_chains_csv(&args.chains, config.backtest.universe)?;
    let snapshot = data.snapshot(args.date);
    let chain = snapshot
        .chain(&strategy.equity)
        .with_context(|| format!("No {} chain observed on {}", strategy.equity, args.date))?;

    let criteria = PutCriteria::from_config(strategy);

    println!("\n{} chain on {}", strategy.equity, args.date);
    println!("{}", "=".repeat(60));
    println!("Contracts in universe: {}", chain.contracts.len());
    println!("OOM:                   {}", strategy.oom);
    println!("Min expiry (days):     {}", strategy.min_expiry_days);

    let candidates = candidate_puts(chain, args.date, &criteria);
    println!("\nQualifying puts ({}):", candidates.len());
    for contract in &candidates {
        println!(
            "  {:<24} strike ${:<10} ceiling ${:<10} {} days",
            contract.display_name(),
            contract.strike,
            criteria.strike_ceiling(contract.underlying_price),
            contract.days_to_expiry(args.date)
        );
    }

    let selected = select_protective_put(chain, args.date, &criteria);
    match selected {
        Some(contract) => println!("\nSelected: {} ({})", contract.display_name(), contract.id),
        None => println!("\nSelected: none, the portfolio stays fully in {}", strategy.equity),
    }

    println!("\nTarget allocations:");
    for target in target_allocations(&strategy.equity, selected, strategy.option_weight) {
        println!("  {:<16} {}", target.instrument, target.weight);
    }
    println!();

    Ok(())
}
