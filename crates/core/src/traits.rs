use crate::events::MarketSnapshot;
use crate::types::{DailyClose, Holding, PortfolioTarget};
use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Historical and current prices owned by the host.
pub trait MarketDataFeed {
    /// Up to `bars` most recent daily closes for `symbol`, oldest first.
    fn history(&self, symbol: &str, bars: usize) -> Result<Vec<DailyClose>>;

    fn last_price(&self, symbol: &str) -> Option<Decimal>;
}

/// Order routing and portfolio state owned by the host.
pub trait PortfolioExecutor {
    fn holdings(&self) -> Vec<Holding>;

    fn liquidate(&mut self, instrument: &str) -> Result<()>;

    fn set_target_allocations(&mut self, targets: &[PortfolioTarget]) -> Result<()>;
}

/// Charting and log output owned by the host.
pub trait Reporter {
    fn record_metric(&mut self, series: &str, instrument: &str, value: Decimal);

    fn log(&mut self, message: &str);
}

/// Everything an algorithm may ask of its host during a callback.
pub trait Host: MarketDataFeed + PortfolioExecutor + Reporter {}

impl<T> Host for T where T: MarketDataFeed + PortfolioExecutor + Reporter {}

/// Callbacks the host invokes, sequentially, over the life of one run.
pub trait Algorithm {
    type Outcome;

    fn on_data(&mut self, snapshot: MarketSnapshot);

    fn on_month_start(&mut self, date: NaiveDate);

    fn on_week_end(&mut self, date: NaiveDate, host: &mut dyn Host) -> Result<Self::Outcome>;

    fn on_end_of_algorithm(&mut self, date: NaiveDate, host: &mut dyn Host) -> Result<()>;

    fn name(&self) -> &str;
}
