//! Instrument, chain, and portfolio types shared by the policy and its hosts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Options contract right (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionRight {
    Call,
    Put,
}

impl std::fmt::Display for OptionRight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "C"),
            Self::Put => write!(f, "P"),
        }
    }
}

impl std::str::FromStr for OptionRight {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(Self::Call),
            "put" | "p" => Ok(Self::Put),
            other => anyhow::bail!("Invalid option right: {other}"),
        }
    }
}

/// Kind of instrument a holding refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentKind {
    Equity,
    Option,
}

/// One listed option as observed in a chain snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Host-assigned identifier, used for liquidation and allocation targets.
    pub id: String,
    pub underlying: String,
    pub right: OptionRight,
    pub strike: Decimal,
    pub expiry: NaiveDate,
    /// Last traded price of the underlying when the chain was observed.
    pub underlying_price: Decimal,
}

impl OptionContract {
    /// Days from `as_of` until expiry. Negative once expired.
    #[must_use]
    pub fn days_to_expiry(&self, as_of: NaiveDate) -> i64 {
        (self.expiry - as_of).num_days()
    }

    /// Human-readable contract description (e.g., "SPY 85P 2024-03-15").
    #[must_use]
    pub fn display_name(&self) -> String {
        format!(
            "{} {}{} {}",
            self.underlying, self.strike, self.right, self.expiry
        )
    }
}

/// Option chain for a single underlying, valid only at the observation instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionChain {
    pub underlying: String,
    pub contracts: Vec<OptionContract>,
}

impl OptionChain {
    #[must_use]
    pub fn new(underlying: impl Into<String>, contracts: Vec<OptionContract>) -> Self {
        Self {
            underlying: underlying.into(),
            contracts,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionContract> {
        self.contracts.iter()
    }
}

/// A portfolio holding as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub id: String,
    pub kind: InstrumentKind,
    pub invested: bool,
}

/// Target weight of total portfolio value for one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioTarget {
    pub instrument: String,
    pub weight: Decimal,
}

impl PortfolioTarget {
    #[must_use]
    pub fn new(instrument: impl Into<String>, weight: Decimal) -> Self {
        Self {
            instrument: instrument.into(),
            weight,
        }
    }
}

/// Daily closing price returned by historical data requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// Identifiers of option holdings that are currently invested, in host order.
#[must_use]
pub fn held_option_ids(holdings: &[Holding]) -> Vec<String> {
    holdings
        .iter()
        .filter(|h| h.invested && h.kind == InstrumentKind::Option)
        .map(|h| h.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn holding(id: &str, kind: InstrumentKind, invested: bool) -> Holding {
        Holding {
            id: id.to_string(),
            kind,
            invested,
        }
    }

    #[test]
    fn held_option_ids_skips_equity_and_flat_positions() {
        let holdings = vec![
            holding("SPY", InstrumentKind::Equity, true),
            holding("SPY 240315P00085000", InstrumentKind::Option, true),
            holding("SPY 240216P00080000", InstrumentKind::Option, false),
            holding("SPY 240419P00090000", InstrumentKind::Option, true),
        ];

        assert_eq!(
            held_option_ids(&holdings),
            vec!["SPY 240315P00085000", "SPY 240419P00090000"]
        );
    }

    #[test]
    fn held_option_ids_empty_portfolio() {
        assert!(held_option_ids(&[]).is_empty());
    }

    #[test]
    fn parses_option_right() {
        assert_eq!("put".parse::<OptionRight>().unwrap(), OptionRight::Put);
        assert_eq!("C".parse::<OptionRight>().unwrap(), OptionRight::Call);
        assert!("straddle".parse::<OptionRight>().is_err());
    }

    #[test]
    fn days_to_expiry_counts_calendar_days() {
        let contract = OptionContract {
            id: "X".to_string(),
            underlying: "SPY".to_string(),
            right: OptionRight::Put,
            strike: dec!(85),
            expiry: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            underlying_price: dec!(100),
        };
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 19).unwrap();
        assert_eq!(contract.days_to_expiry(as_of), 56);
        assert_eq!(contract.display_name(), "SPY 85P 2024-03-15");
    }
}
