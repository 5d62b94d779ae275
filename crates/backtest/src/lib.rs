pub mod calendar;
pub mod data_provider;
pub mod execution;
pub mod report;
pub mod runner;

pub use calendar::schedule_events;
pub use data_provider::{DataError, HistoricalDataProvider};
pub use execution::PaperPortfolio;
pub use report::{ReportFormatter, RollSummary};
pub use runner::{HostRequest, JournalEntry, ReplayHost, ReplayReport, ReplayRunner};
