use crate::types::OptionChain;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Market data delivered by the host for one observation instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub date: NaiveDate,
    /// Option chains keyed by underlying ticker.
    pub chains: HashMap<String, OptionChain>,
    /// Last prices keyed by ticker.
    pub prices: HashMap<String, Decimal>,
}

impl MarketSnapshot {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            chains: HashMap::new(),
            prices: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_chain(mut self, chain: OptionChain) -> Self {
        self.chains.insert(chain.underlying.clone(), chain);
        self
    }

    #[must_use]
    pub fn with_price(mut self, symbol: impl Into<String>, price: Decimal) -> Self {
        self.prices.insert(symbol.into(), price);
        self
    }

    #[must_use]
    pub fn chain(&self, underlying: &str) -> Option<&OptionChain> {
        self.chains.get(underlying)
    }

    #[must_use]
    pub fn price(&self, symbol: &str) -> Option<Decimal> {
        self.prices.get(symbol).copied()
    }
}

/// Calendar events fired by the host scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledEvent {
    /// First trading day of a calendar month.
    MonthStart { date: NaiveDate },
    /// Last trading day of a week.
    WeekEnd { date: NaiveDate },
}

impl ScheduledEvent {
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        match self {
            Self::MonthStart { date } | Self::WeekEnd { date } => *date,
        }
    }
}
