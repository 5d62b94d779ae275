use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be between 0 and 1, got {value}")]
    FractionOutOfRange { key: &'static str, value: Decimal },

    #[error("roll_week must be between 1 and 5, got {0}")]
    RollWeekOutOfRange(u32),

    #[error("{key} must not be negative, got {value}")]
    NegativeDays { key: &'static str, value: i64 },

    #[error("equity ticker must not be empty")]
    EmptyEquity,

    #[error("initial_cash must be positive, got {0}")]
    NonPositiveCash(Decimal),

    #[error("backtest start {start} is after end {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    #[error("universe min_expiry_days {min} exceeds max_expiry_days {max}")]
    InvertedExpiryWindow { min: i64, max: i64 },

    #[error("invalid value for parameter {key}: {value:?}")]
    InvalidParameter { key: String, value: String },

    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("parameter must be written as key=value, got {0:?}")]
    MalformedParameter(String),
}

/// Which week-end event of the month triggers the roll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollSchedule {
    /// The N-th week-end event fired by the host after month start.
    #[default]
    WeekEndCount,
    /// The first week-end event inside the week holding the month's N-th Friday.
    ThirdFridayWeek,
}

impl FromStr for RollSchedule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week_end_count" => Ok(Self::WeekEndCount),
            "third_friday_week" => Ok(Self::ThirdFridayWeek),
            other => Err(ConfigError::InvalidParameter {
                key: "schedule".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub strategy: StrategyConfig,
    pub backtest: BacktestConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Underlying equity ticker; also the option chain's underlying.
    pub equity: String,
    /// Fraction a put's strike must sit below the underlying price.
    #[serde(rename = "OOM", alias = "oom")]
    pub oom: Decimal,
    /// Portfolio weight given to the protective put.
    pub option_weight: Decimal,
    /// Puts must expire strictly more than this many days after the snapshot.
    pub min_expiry_days: i64,
    pub roll_week: u32,
    pub schedule: RollSchedule,
    /// Benchmark ticker, defaults to `equity`.
    pub benchmark: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub initial_cash: Decimal,
    pub universe: UniverseConfig,
}

/// Expiry window applied to chain data before it reaches the strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    pub min_expiry_days: i64,
    pub max_expiry_days: i64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            equity: "SPY".to_string(),
            oom: Decimal::new(1, 1),
            option_weight: Decimal::new(5, 2),
            min_expiry_days: 50,
            roll_week: 3,
            schedule: RollSchedule::WeekEndCount,
            benchmark: None,
        }
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2007, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            initial_cash: Decimal::from(100_000),
            universe: UniverseConfig::default(),
        }
    }
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            min_expiry_days: 50,
            max_expiry_days: 70,
        }
    }
}

impl StrategyConfig {
    #[must_use]
    pub fn benchmark_symbol(&self) -> &str {
        self.benchmark.as_deref().unwrap_or(&self.equity)
    }

    /// # Errors
    ///
    /// Returns the first value that falls outside its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.equity.trim().is_empty() {
            return Err(ConfigError::EmptyEquity);
        }
        check_fraction("OOM", self.oom)?;
        check_fraction("option_weight", self.option_weight)?;
        if self.min_expiry_days < 0 {
            return Err(ConfigError::NegativeDays {
                key: "min_expiry_days",
                value: self.min_expiry_days,
            });
        }
        if !(1..=5).contains(&self.roll_week) {
            return Err(ConfigError::RollWeekOutOfRange(self.roll_week));
        }
        Ok(())
    }
}

impl BacktestConfig {
    /// # Errors
    ///
    /// Returns an error for an inverted date range, an inverted expiry window,
    /// or non-positive starting cash.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start > self.end {
            return Err(ConfigError::InvertedDateRange {
                start: self.start,
                end: self.end,
            });
        }
        if self.initial_cash <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveCash(self.initial_cash));
        }
        if self.universe.min_expiry_days < 0 {
            return Err(ConfigError::NegativeDays {
                key: "universe.min_expiry_days",
                value: self.universe.min_expiry_days,
            });
        }
        if self.universe.min_expiry_days > self.universe.max_expiry_days {
            return Err(ConfigError::InvertedExpiryWindow {
                min: self.universe.min_expiry_days,
                max: self.universe.max_expiry_days,
            });
        }
        Ok(())
    }
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns the first invalid value found in either section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.strategy.validate()?;
        self.backtest.validate()
    }

    /// Overrides one string-keyed parameter, e.g. `("OOM", "0.15")`.
    ///
    /// The value is parsed but not range checked; call [`AppConfig::validate`]
    /// once all overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown key or an unparseable value.
    pub fn apply_parameter(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidParameter {
            key: key.to_string(),
            value: value.to_string(),
        };
        let value = value.trim();

        match key {
            "equity" => value.clone_into(&mut self.strategy.equity),
            "OOM" | "oom" => self.strategy.oom = value.parse().map_err(|_| invalid())?,
            "option_weight" => {
                self.strategy.option_weight = value.parse().map_err(|_| invalid())?;
            }
            "min_expiry_days" => {
                self.strategy.min_expiry_days = value.parse().map_err(|_| invalid())?;
            }
            "roll_week" => self.strategy.roll_week = value.parse().map_err(|_| invalid())?,
            "schedule" => self.strategy.schedule = value.parse()?,
            "benchmark" => self.strategy.benchmark = Some(value.to_string()),
            "initial_cash" => {
                self.backtest.initial_cash = value.parse().map_err(|_| invalid())?;
            }
            "start" => self.backtest.start = value.parse().map_err(|_| invalid())?,
            "end" => self.backtest.end = value.parse().map_err(|_| invalid())?,
            other => return Err(ConfigError::UnknownParameter(other.to_string())),
        }
        Ok(())
    }

    /// Applies a `key=value` override.
    ///
    /// # Errors
    ///
    /// Returns an error if the text has no `=` or the override is rejected.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<(), ConfigError> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| ConfigError::MalformedParameter(assignment.to_string()))?;
        self.apply_parameter(key.trim(), value)
    }
}

fn check_fraction(key: &'static str, value: Decimal) -> Result<(), ConfigError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(ConfigError::FractionOutOfRange { key, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_match_documented_parameters() {
        let config = AppConfig::default();
        assert_eq!(config.strategy.equity, "SPY");
        assert_eq!(config.strategy.oom, dec!(0.1));
        assert_eq!(config.strategy.option_weight, dec!(0.05));
        assert_eq!(config.strategy.roll_week, 3);
        assert_eq!(config.backtest.initial_cash, dec!(100000));
        assert_eq!(config.backtest.universe.max_expiry_days, 70);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn string_keyed_parameters_override_fields() {
        let mut config = AppConfig::default();
        config.apply_parameter("equity", "QQQ").unwrap();
        config.apply_parameter("OOM", "0.15").unwrap();
        config.apply_assignment("option_weight=0.02").unwrap();
        config.apply_assignment("schedule = third_friday_week").unwrap();

        assert_eq!(config.strategy.equity, "QQQ");
        assert_eq!(config.strategy.oom, dec!(0.15));
        assert_eq!(config.strategy.option_weight, dec!(0.02));
        assert_eq!(config.strategy.schedule, RollSchedule::ThirdFridayWeek);
        assert_eq!(config.strategy.benchmark_symbol(), "QQQ");
    }

    #[test]
    fn rejects_unknown_and_malformed_parameters() {
        let mut config = AppConfig::default();
        assert_eq!(
            config.apply_parameter("leverage", "2"),
            Err(ConfigError::UnknownParameter("leverage".to_string()))
        );
        assert!(matches!(
            config.apply_assignment("OOM"),
            Err(ConfigError::MalformedParameter(_))
        ));
        assert!(matches!(
            config.apply_parameter("OOM", "ten percent"),
            Err(ConfigError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn weight_outside_unit_interval_is_rejected() {
        let mut config = AppConfig::default();
        config.strategy.option_weight = dec!(1.5);
        assert_eq!(
            config.validate(),
            Err(ConfigError::FractionOutOfRange {
                key: "option_weight",
                value: dec!(1.5),
            })
        );

        config.strategy.option_weight = dec!(0.05);
        config.strategy.oom = dec!(-0.1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FractionOutOfRange { key: "OOM", .. })
        ));
    }

    #[test]
    fn rejects_inverted_windows() {
        let mut config = AppConfig::default();
        config.backtest.universe.min_expiry_days = 80;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedExpiryWindow { min: 80, max: 70 })
        ));

        let mut config = AppConfig::default();
        config.apply_parameter("start", "2025-01-01").unwrap();
        config.apply_parameter("end", "2024-01-01").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedDateRange { .. })
        ));
    }

    #[test]
    fn roll_week_bounds() {
        let mut config = AppConfig::default();
        config.strategy.roll_week = 0;
        assert_eq!(config.validate(), Err(ConfigError::RollWeekOutOfRange(0)));
        config.strategy.roll_week = 5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn serializes_oom_under_its_parameter_name() {
        let json = serde_json::to_value(StrategyConfig::default()).unwrap();
        assert!(json.get("OOM").is_some());
        assert_eq!(json["schedule"], "week_end_count");
    }
}
