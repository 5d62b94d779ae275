//! Buy-and-hold benchmark for the strategy equity chart.
//!
//! Prices are taken as reported by the host and are not adjusted for splits,
//! so a split inside the run shows up as a step in the benchmark curve.

use anyhow::Result;
use chrono::NaiveDate;
use put_overlay_core::traits::Host;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Chart the benchmark is plotted on, shared with the strategy's own equity.
pub const BENCHMARK_CHART: &str = "Strategy Equity";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkPoint {
    pub date: NaiveDate,
    pub price: Decimal,
    /// Starting cash grown at the benchmark's return since the first point.
    pub value: Decimal,
}

#[derive(Debug, Clone)]
pub struct BenchmarkTracker {
    symbol: String,
    initial_cash: Decimal,
    series: Vec<BenchmarkPoint>,
}

impl BenchmarkTracker {
    #[must_use]
    pub fn new(symbol: impl Into<String>, initial_cash: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            initial_cash,
            series: Vec::new(),
        }
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub fn series(&self) -> &[BenchmarkPoint] {
        &self.series
    }

    /// Fetches the latest benchmark close from the host, appends a point, and
    /// plots it.
    ///
    /// Returns `None` when the host has no history yet or the point for that
    /// close date is already recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the history request fails.
    pub fn record(&mut self, host: &mut dyn Host) -> Result<Option<BenchmarkPoint>> {
        let closes = host.history(&self.symbol, 2)?;
        let Some(latest) = closes.last() else {
            warn!(symbol = %self.symbol, "No benchmark history available");
            return Ok(None);
        };

        let point = self.push(latest.date, latest.close);
        if let Some(point) = point {
            host.record_metric(BENCHMARK_CHART, &self.symbol, point.value);
        }
        Ok(point)
    }

    /// Appends a point for `price` observed on `date`.
    ///
    /// Earlier points are never modified. A second price for the date of the
    /// last point is ignored, as is any price while the first recorded price
    /// is zero.
    pub fn push(&mut self, date: NaiveDate, price: Decimal) -> Option<BenchmarkPoint> {
        if self.series.last().is_some_and(|last| last.date == date) {
            debug!(symbol = %self.symbol, %date, "Benchmark already recorded for date");
            return None;
        }

        let first = self.series.first().map_or(price, |p| p.price);
        let Some(value) = (self.initial_cash * price).checked_div(first) else {
            warn!(symbol = %self.symbol, %date, "Benchmark base price is zero");
            return None;
        };

        let point = BenchmarkPoint { date, price, value };
        self.series.push(point);
        Some(point)
    }
}
