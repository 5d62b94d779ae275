//! Protective put selection over a chain snapshot.

use chrono::NaiveDate;
use put_overlay_core::config::StrategyConfig;
use put_overlay_core::types::{OptionChain, OptionContract, OptionRight, PortfolioTarget};
use rust_decimal::Decimal;

/// Filters a put must pass to be considered for the hedge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutCriteria {
    /// Fraction the strike must sit below the underlying price.
    pub oom: Decimal,
    /// Expiry must be strictly more than this many days after the snapshot.
    pub min_expiry_days: i64,
}

impl PutCriteria {
    #[must_use]
    pub const fn new(oom: Decimal, min_expiry_days: i64) -> Self {
        Self {
            oom,
            min_expiry_days,
        }
    }

    #[must_use]
    pub fn from_config(config: &StrategyConfig) -> Self {
        Self::new(config.oom, config.min_expiry_days)
    }

    /// Strikes must be strictly below this level to qualify.
    #[must_use]
    pub fn strike_ceiling(&self, underlying_price: Decimal) -> Decimal {
        (Decimal::ONE - self.oom) * underlying_price
    }

    #[must_use]
    pub fn qualifies(&self, contract: &OptionContract, as_of: NaiveDate) -> bool {
        contract.right == OptionRight::Put
            && contract.strike < self.strike_ceiling(contract.underlying_price)
            && contract.days_to_expiry(as_of) > self.min_expiry_days
    }
}

/// Qualifying puts, highest strike first.
///
/// The sort is stable, so contracts sharing a strike keep their chain order.
#[must_use]
pub fn candidate_puts<'a>(
    chain: &'a OptionChain,
    as_of: NaiveDate,
    criteria: &PutCriteria,
) -> Vec<&'a OptionContract> {
    let mut candidates: Vec<&OptionContract> = chain
        .iter()
        .filter(|c| criteria.qualifies(c, as_of))
        .collect();
    candidates.sort_by(|a, b| b.strike.cmp(&a.strike));
    candidates
}

/// The put closest to the money that still clears the OOM threshold.
#[must_use]
pub fn select_protective_put<'a>(
    chain: &'a OptionChain,
    as_of: NaiveDate,
    criteria: &PutCriteria,
) -> Option<&'a OptionContract> {
    candidate_puts(chain, as_of, criteria).into_iter().next()
}

/// Target weights for the equity and, when one was chosen, the put.
///
/// Without a put the equity takes the whole portfolio.
#[must_use]
pub fn target_allocations(
    equity: &str,
    put: Option<&OptionContract>,
    option_weight: Decimal,
) -> Vec<PortfolioTarget> {
    match put {
        Some(contract) => vec![
            PortfolioTarget::new(equity, Decimal::ONE - option_weight),
            PortfolioTarget::new(contract.id.clone(), option_weight),
        ],
        None => vec![PortfolioTarget::new(equity, Decimal::ONE)],
    }
}
