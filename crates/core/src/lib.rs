//! Core types, host traits, and configuration for the protective put overlay.
//!
//! The strategy never talks to a broker or data vendor directly. Everything it
//! needs from the outside world goes through the [`Host`] traits, which a
//! backtesting framework, a paper harness, or a live adapter implements.

pub mod config;
pub mod config_loader;
pub mod events;
pub mod traits;
pub mod types;

pub use config::{AppConfig, BacktestConfig, ConfigError, RollSchedule, StrategyConfig, UniverseConfig};
pub use config_loader::ConfigLoader;
pub use events::{MarketSnapshot, ScheduledEvent};
pub use traits::{Algorithm, Host, MarketDataFeed, PortfolioExecutor, Reporter};
pub use types::{
    held_option_ids, DailyClose, Holding, InstrumentKind, OptionChain, OptionContract,
    OptionRight, PortfolioTarget,
};
