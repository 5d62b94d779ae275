use crate::calendar::schedule_events;
use crate::data_provider::HistoricalDataProvider;
use crate::execution::PaperPortfolio;
use anyhow::Result;
use chrono::NaiveDate;
use put_overlay_core::config::BacktestConfig;
use put_overlay_core::events::ScheduledEvent;
use put_overlay_core::traits::{Algorithm, MarketDataFeed, PortfolioExecutor, Reporter};
use put_overlay_core::types::{DailyClose, Holding, InstrumentKind, PortfolioTarget};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One outbound request made by the algorithm, in call order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostRequest {
    Liquidate {
        instrument: String,
    },
    SetHoldings {
        targets: Vec<PortfolioTarget>,
    },
    Metric {
        series: String,
        instrument: String,
        value: Decimal,
    },
    Log {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub request: HostRequest,
}

/// Host side of a replay: recorded data, a paper portfolio, and a journal of
/// every request the algorithm makes.
pub struct ReplayHost {
    data: HistoricalDataProvider,
    portfolio: PaperPortfolio,
    journal: Vec<JournalEntry>,
    today: Option<NaiveDate>,
}

impl ReplayHost {
    #[must_use]
    pub fn new(data: HistoricalDataProvider) -> Self {
        Self {
            data,
            portfolio: PaperPortfolio::new(),
            journal: Vec::new(),
            today: None,
        }
    }

    pub fn advance_to(&mut self, date: NaiveDate) {
        self.today = Some(date);
        self.data.advance_to(date);
    }

    #[must_use]
    pub const fn data(&self) -> &HistoricalDataProvider {
        &self.data
    }

    #[must_use]
    pub const fn portfolio(&self) -> &PaperPortfolio {
        &self.portfolio
    }

    #[must_use]
    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    fn push(&mut self, request: HostRequest) {
        if let Some(date) = self.today {
            self.journal.push(JournalEntry { date, request });
        }
    }
}

impl MarketDataFeed for ReplayHost {
    fn history(&self, symbol: &str, bars: usize) -> Result<Vec<DailyClose>> {
        self.data.history(symbol, bars)
    }

    fn last_price(&self, symbol: &str) -> Option<Decimal> {
        self.data.last_price(symbol)
    }
}

impl PortfolioExecutor for ReplayHost {
    fn holdings(&self) -> Vec<Holding> {
        self.portfolio.holdings()
    }

    fn liquidate(&mut self, instrument: &str) -> Result<()> {
        self.portfolio.liquidate(instrument);
        self.push(HostRequest::Liquidate {
            instrument: instrument.to_string(),
        });
        Ok(())
    }

    fn set_target_allocations(&mut self, targets: &[PortfolioTarget]) -> Result<()> {
        let data = &self.data;
        self.portfolio.apply_targets(targets, |id| {
            if data.is_option(id) {
                InstrumentKind::Option
            } else {
                InstrumentKind::Equity
            }
        });
        self.push(HostRequest::SetHoldings {
            targets: targets.to_vec(),
        });
        Ok(())
    }
}

impl Reporter for ReplayHost {
    fn record_metric(&mut self, series: &str, instrument: &str, value: Decimal) {
        debug!(series, instrument, %value, "Metric");
        self.push(HostRequest::Metric {
            series: series.to_string(),
            instrument: instrument.to_string(),
            value,
        });
    }

    fn log(&mut self, message: &str) {
        info!(date = ?self.today, "{message}");
        self.push(HostRequest::Log {
            message: message.to_string(),
        });
    }
}

/// Result of one replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport<O> {
    pub algorithm: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub trading_days: usize,
    /// Outcome of every week-end event, in date order.
    pub week_ends: Vec<(NaiveDate, O)>,
    pub journal: Vec<JournalEntry>,
    pub final_holdings: Vec<Holding>,
}

/// Walks the trading dates of a [`BacktestConfig`] window, feeding data and
/// calendar events to an [`Algorithm`].
pub struct ReplayRunner<A: Algorithm> {
    algorithm: A,
    host: ReplayHost,
    start: NaiveDate,
    end: NaiveDate,
}

impl<A: Algorithm> ReplayRunner<A> {
    #[must_use]
    pub fn new(algorithm: A, data: HistoricalDataProvider, config: &BacktestConfig) -> Self {
        Self {
            algorithm,
            host: ReplayHost::new(data),
            start: config.start,
            end: config.end,
        }
    }

    #[must_use]
    pub const fn algorithm(&self) -> &A {
        &self.algorithm
    }

    #[must_use]
    pub const fn host(&self) -> &ReplayHost {
        &self.host
    }

    /// Runs the replay to completion.
    ///
    /// Each trading date delivers that date's snapshot, then its month-start
    /// and week-end events. The end-of-algorithm callback runs on the last
    /// trading date.
    ///
    /// # Errors
    ///
    /// Returns an error if the window holds no trading dates or a callback
    /// fails.
    pub fn run(&mut self) -> Result<ReplayReport<A::Outcome>> {
        let dates = self.host.data().trading_dates(self.start, self.end);
        let Some(&last) = dates.last() else {
            anyhow::bail!("No trading dates between {} and {}", self.start, self.end);
        };

        info!(
            algorithm = self.algorithm.name(),
            start = %self.start,
            end = %self.end,
            trading_days = dates.len(),
            "Starting replay"
        );

        let events = schedule_events(&dates);
        let mut pending = events.iter().peekable();
        let mut week_ends = Vec::new();

        for &date in &dates {
            self.host.advance_to(date);
            self.algorithm.on_data(self.host.data().snapshot(date));

            while let Some(event) = pending.next_if(|e| e.date() == date) {
                match *event {
                    ScheduledEvent::MonthStart { date } => self.algorithm.on_month_start(date),
                    ScheduledEvent::WeekEnd { date } => {
                        let outcome = self.algorithm.on_week_end(date, &mut self.host)?;
                        week_ends.push((date, outcome));
                    }
                }
            }
        }

        self.algorithm.on_end_of_algorithm(last, &mut self.host)?;

        info!(
            week_ends = week_ends.len(),
            requests = self.host.journal().len(),
            "Replay finished"
        );

        Ok(ReplayReport {
            algorithm: self.algorithm.name().to_string(),
            start: self.start,
            end: self.end,
            trading_days: dates.len(),
            week_ends,
            journal: self.host.journal().to_vec(),
            final_holdings: self.host.holdings(),
        })
    }

    #[must_use]
    pub fn into_algorithm(self) -> A {
        self.algorithm
    }
}
