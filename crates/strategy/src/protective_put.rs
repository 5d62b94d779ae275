use crate::benchmark::{BenchmarkPoint, BenchmarkTracker};
use crate::schedule::CycleCounter;
use crate::selection::{select_protective_put, target_allocations, PutCriteria};
use anyhow::Result;
use chrono::NaiveDate;
use put_overlay_core::config::StrategyConfig;
use put_overlay_core::events::MarketSnapshot;
use put_overlay_core::traits::{Algorithm, Host};
use put_overlay_core::types::{held_option_ids, OptionContract, PortfolioTarget};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Holds the configured equity and, once a month, rolls a protective
/// out-of-the-money put sized at a fixed portfolio weight.
///
/// # Monthly roll
///
/// 1. Record a benchmark point
/// 2. Liquidate every invested option holding
/// 3. Pick the highest-strike put below `(1 - OOM) * underlying` that expires
///    more than `min_expiry_days` after the snapshot
/// 4. Target `1 - option_weight` in the equity and `option_weight` in the put,
///    or the whole portfolio in the equity when no put qualifies
pub struct ProtectivePutStrategy {
    config: StrategyConfig,
    criteria: PutCriteria,
    counter: CycleCounter,
    benchmark: BenchmarkTracker,
    latest: Option<MarketSnapshot>,
}

/// Why a week-end event produced no roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    NotRollWeek { count: u32 },
    NoMarketData,
}

/// Why a roll ended fully in the equity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackReason {
    NoChain,
    NoQualifyingPut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    Hedged(OptionContract),
    Unhedged(FallbackReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollDecision {
    pub date: NaiveDate,
    pub liquidated: Vec<String>,
    pub selection: Selection,
    pub targets: Vec<PortfolioTarget>,
    pub benchmark: Option<BenchmarkPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebalanceOutcome {
    Skipped(SkipReason),
    Rolled(RollDecision),
}

impl ProtectivePutStrategy {
    #[must_use]
    pub fn new(config: StrategyConfig, initial_cash: Decimal) -> Self {
        let benchmark = BenchmarkTracker::new(config.benchmark_symbol(), initial_cash);
        Self {
            criteria: PutCriteria::from_config(&config),
            counter: CycleCounter::new(config.schedule, config.roll_week),
            benchmark,
            config,
            latest: None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &StrategyConfig {
        &self.config
    }

    #[must_use]
    pub const fn cycle_count(&self) -> u32 {
        self.counter.count()
    }

    #[must_use]
    pub fn benchmark_series(&self) -> &[BenchmarkPoint] {
        self.benchmark.series()
    }

    #[must_use]
    pub const fn latest_snapshot(&self) -> Option<&MarketSnapshot> {
        self.latest.as_ref()
    }

    fn roll(&mut self, date: NaiveDate, host: &mut dyn Host) -> Result<RebalanceOutcome> {
        let Some(snapshot) = self.latest.as_ref() else {
            debug!(%date, "Roll week reached before any market data");
            return Ok(RebalanceOutcome::Skipped(SkipReason::NoMarketData));
        };

        let benchmark = self.benchmark.record(host)?;

        host.log("Rebalancing");
        info!(%date, equity = %self.config.equity, "Rebalancing");

        let liquidated = held_option_ids(&host.holdings());
        for id in &liquidated {
            host.liquidate(id)?;
        }

        let equity = self.config.equity.as_str();

        let selection = match snapshot.chain(equity).filter(|chain| !chain.is_empty()) {
            None => Selection::Unhedged(FallbackReason::NoChain),
            Some(chain) => {
                if let Some(price) = host.last_price(equity).or_else(|| snapshot.price(equity)) {
                    host.log(&format!("Current {equity}: {price}"));
                }
                select_protective_put(chain, snapshot.date, &self.criteria).map_or(
                    Selection::Unhedged(FallbackReason::NoQualifyingPut),
                    |put| Selection::Hedged(put.clone()),
                )
            }
        };

        let put = match &selection {
            Selection::Hedged(contract) => {
                host.log(&format!(
                    "buying put option with strike: ${}, expiring: {}",
                    contract.strike, contract.expiry
                ));
                info!(
                    contract = %contract.display_name(),
                    weight = %self.config.option_weight,
                    "Protective put selected"
                );
                Some(contract)
            }
            Selection::Unhedged(reason) => {
                info!(?reason, "No protective put, holding equity only");
                None
            }
        };

        let targets = target_allocations(equity, put, self.config.option_weight);
        host.set_target_allocations(&targets)?;

        Ok(RebalanceOutcome::Rolled(RollDecision {
            date,
            liquidated,
            selection,
            targets,
            benchmark,
        }))
    }
}

impl Algorithm for ProtectivePutStrategy {
    type Outcome = RebalanceOutcome;

    fn on_data(&mut self, snapshot: MarketSnapshot) {
        self.latest = Some(snapshot);
    }

    fn on_month_start(&mut self, date: NaiveDate) {
        debug!(%date, previous = self.counter.count(), "Month start, resetting week count");
        self.counter.reset();
    }

    fn on_week_end(&mut self, date: NaiveDate, host: &mut dyn Host) -> Result<RebalanceOutcome> {
        if !self.counter.advance(date) {
            let count = self.counter.count();
            debug!(%date, count, "Not the roll week");
            return Ok(RebalanceOutcome::Skipped(SkipReason::NotRollWeek { count }));
        }
        self.roll(date, host)
    }

    fn on_end_of_algorithm(&mut self, date: NaiveDate, host: &mut dyn Host) -> Result<()> {
        host.log("Recording final benchmark point");
        if let Some(point) = self.benchmark.record(host)? {
            info!(%date, value = %point.value, "Final benchmark value");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "Protective Put"
    }
}
