use anyhow::Result;
use chrono::NaiveDate;
use put_overlay_core::config::UniverseConfig;
use put_overlay_core::events::MarketSnapshot;
use put_overlay_core::traits::MarketDataFeed;
use put_overlay_core::types::{DailyClose, OptionChain, OptionContract, OptionRight};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} record {record}: {message}")]
    InvalidRecord {
        path: PathBuf,
        record: usize,
        message: String,
    },
}

/// `date,symbol,close`
#[derive(Debug, Deserialize)]
struct CloseRecord {
    date: NaiveDate,
    symbol: String,
    close: String,
}

/// `date,id,underlying,right,strike,expiry,underlying_price`
#[derive(Debug, Deserialize)]
struct ChainRecord {
    date: NaiveDate,
    id: String,
    underlying: String,
    right: String,
    strike: String,
    expiry: NaiveDate,
    underlying_price: String,
}

/// Recorded daily closes and option chain observations, served one trading
/// date at a time.
///
/// History requests only see closes on or before the current date, so the
/// strategy cannot look ahead.
pub struct HistoricalDataProvider {
    closes: HashMap<String, Vec<DailyClose>>,
    chains: BTreeMap<NaiveDate, Vec<OptionContract>>,
    option_ids: HashSet<String>,
    universe: UniverseConfig,
    current: Option<NaiveDate>,
}

impl HistoricalDataProvider {
    /// Builds a provider from in-memory closes and chain observations.
    #[must_use]
    pub fn new(
        closes: Vec<(String, DailyClose)>,
        observations: Vec<(NaiveDate, OptionContract)>,
        universe: UniverseConfig,
    ) -> Self {
        let mut by_symbol: HashMap<String, Vec<DailyClose>> = HashMap::new();
        for (symbol, close) in closes {
            by_symbol.entry(symbol).or_default().push(close);
        }
        for (symbol, series) in &mut by_symbol {
            series.sort_by_key(|c| c.date);
            // The sort is stable, so the first close listed for a date wins
            series.dedup_by(|later, kept| {
                if later.date != kept.date {
                    return false;
                }
                if later.close != kept.close {
                    warn!(
                        symbol = %symbol,
                        date = %kept.date,
                        kept = %kept.close,
                        dropped = %later.close,
                        "Conflicting duplicate close, keeping the first"
                    );
                }
                true
            });
        }

        let mut chains: BTreeMap<NaiveDate, Vec<OptionContract>> = BTreeMap::new();
        let mut option_ids = HashSet::new();
        for (date, contract) in observations {
            option_ids.insert(contract.id.clone());
            chains.entry(date).or_default().push(contract);
        }

        Self {
            closes: by_symbol,
            chains,
            option_ids,
            universe,
            current: None,
        }
    }

    /// Loads closes and, optionally, chain observations from CSV files.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or a record has an
    /// unparseable field.
    pub fn from_csv(
        closes_path: impl AsRef<Path>,
        chains_path: Option<&Path>,
        universe: UniverseConfig,
    ) -> Result<Self> {
        let closes = read_closes(closes_path.as_ref())?;
        let observations = match chains_path {
            Some(path) => read_chains(path)?,
            None => Vec::new(),
        };

        tracing::info!(
            closes = closes.len(),
            chain_rows = observations.len(),
            "Loaded historical data"
        );

        Ok(Self::new(closes, observations, universe))
    }

    /// Loads chain observations only. Chain rows carry their own underlying
    /// price, so selection needs no closes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a record is invalid.
    pub fn from_chains_csv(chains_path: impl AsRef<Path>, universe: UniverseConfig) -> Result<Self> {
        let observations = read_chains(chains_path.as_ref())?;
        tracing::info!(chain_rows = observations.len(), "Loaded option chains");
        Ok(Self::new(Vec::new(), observations, universe))
    }

    /// Dates with at least one close inside `[start, end]`, ascending.
    #[must_use]
    pub fn trading_dates(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .closes
            .values()
            .flatten()
            .map(|c| c.date)
            .filter(|d| (start..=end).contains(d))
            .collect();
        dates.sort_unstable();
        dates.dedup();
        dates
    }

    /// Moves the replay clock; history requests are cut off at `date`.
    pub fn advance_to(&mut self, date: NaiveDate) {
        self.current = Some(date);
    }

    #[must_use]
    pub fn is_option(&self, id: &str) -> bool {
        self.option_ids.contains(id)
    }

    /// Prices and universe-filtered chains observed on `date`.
    #[must_use]
    pub fn snapshot(&self, date: NaiveDate) -> MarketSnapshot {
        let mut snapshot = MarketSnapshot::new(date);

        for (symbol, series) in &self.closes {
            if let Ok(i) = series.binary_search_by_key(&date, |c| c.date) {
                snapshot.prices.insert(symbol.clone(), series[i].close);
            }
        }

        let contracts = self.chains.get(&date).map(Vec::as_slice).unwrap_or_default();
        for contract in contracts.iter().filter(|c| self.in_universe(c, date)) {
            snapshot
                .chains
                .entry(contract.underlying.clone())
                .or_insert_with(|| OptionChain::new(contract.underlying.clone(), Vec::new()))
                .contracts
                .push(contract.clone());
        }

        snapshot
    }

    fn in_universe(&self, contract: &OptionContract, as_of: NaiveDate) -> bool {
        let days = contract.days_to_expiry(as_of);
        (self.universe.min_expiry_days..=self.universe.max_expiry_days).contains(&days)
    }

    fn visible(&self, symbol: &str) -> &[DailyClose] {
        let Some(series) = self.closes.get(symbol) else {
            return &[];
        };
        let Some(current) = self.current else {
            return series;
        };
        let end = series.partition_point(|c| c.date <= current);
        &series[..end]
    }
}

impl MarketDataFeed for HistoricalDataProvider {
    fn history(&self, symbol: &str, bars: usize) -> Result<Vec<DailyClose>> {
        let visible = self.visible(symbol);
        let skip = visible.len().saturating_sub(bars);
        Ok(visible[skip..].to_vec())
    }

    fn last_price(&self, symbol: &str) -> Option<Decimal> {
        self.visible(symbol).last().map(|c| c.close)
    }
}

fn read_closes(path: &Path) -> Result<Vec<(String, DailyClose)>, DataError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    let mut closes = Vec::new();
    for (i, record) in reader.deserialize::<CloseRecord>().enumerate() {
        let record = record.map_err(|source| DataError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let close = parse_decimal(path, i + 1, "close", &record.close)?;
        closes.push((
            record.symbol,
            DailyClose {
                date: record.date,
                close,
            },
        ));
    }
    Ok(closes)
}

fn read_chains(path: &Path) -> Result<Vec<(NaiveDate, OptionContract)>, DataError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    let mut observations = Vec::new();
    for (i, record) in reader.deserialize::<ChainRecord>().enumerate() {
        let record = record.map_err(|source| DataError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let line = i + 1;
        let right: OptionRight =
            record
                .right
                .parse()
                .map_err(|e: anyhow::Error| DataError::InvalidRecord {
                    path: path.to_path_buf(),
                    record: line,
                    message: e.to_string(),
                })?;

        observations.push((
            record.date,
            OptionContract {
                id: record.id,
                underlying: record.underlying,
                right,
                strike: parse_decimal(path, line, "strike", &record.strike)?,
                expiry: record.expiry,
                underlying_price: parse_decimal(
                    path,
                    line,
                    "underlying_price",
                    &record.underlying_price,
                )?,
            },
        ));
    }
    Ok(observations)
}

fn parse_decimal(path: &Path, record: usize, field: &str, raw: &str) -> Result<Decimal, DataError> {
    raw.trim()
        .parse()
        .map_err(|e| DataError::InvalidRecord {
            path: path.to_path_buf(),
            record,
            message: format!("{field} {raw:?}: {e}"),
        })
}
