use crate::config::AppConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration by layering defaults, `config/Config.toml`,
    /// `APP_`-prefixed environment variables, and `config/Config.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed or a value
    /// fails validation.
    pub fn load() -> Result<AppConfig> {
        Self::load_from("config/Config.toml", None)
    }

    /// Loads configuration with a specific profile overlay.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed or a value
    /// fails validation.
    pub fn load_with_profile(profile: &str) -> Result<AppConfig> {
        Self::load_from("config/Config.toml", Some(profile))
    }

    /// Loads configuration rooted at an explicit TOML path. A profile overlay
    /// is read from `Config.{profile}.toml` next to it. Missing files are
    /// skipped, so an absent config yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed or a value fails
    /// validation.
    pub fn load_from(path: impl AsRef<Path>, profile: Option<&str>) -> Result<AppConfig> {
        Self::load_layers(path.as_ref(), profile, ENV_PREFIX)
    }

    fn load_layers(path: &Path, profile: Option<&str>, env_prefix: &str) -> Result<AppConfig> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path));
        if let Some(profile) = profile {
            figment = figment.merge(Toml::file(dir.join(format!("Config.{profile}.toml"))));
        }

        let env = Env::prefixed(env_prefix)
            .lowercase(false)
            .split("__")
            .map(|key| env_key(key.as_str()).into());

        let config: AppConfig = figment
            .merge(env)
            .join(Json::file(dir.join("Config.json")))
            .extract()
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

        config.validate()?;
        tracing::debug!(
            equity = %config.strategy.equity,
            oom = %config.strategy.oom,
            option_weight = %config.strategy.option_weight,
            "Configuration loaded"
        );

        Ok(config)
    }
}

const ENV_PREFIX: &str = "APP_";

/// Lowercases an env-derived key path, keeping `OOM` in the spelling the
/// file layers use so the merged dictionary holds a single key.
fn env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    if key == "strategy.oom" {
        "strategy.OOM".to_string()
    } else {
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RollSchedule;
    use rust_decimal_macros::dec;
    use std::fs;

    #[test]
    fn reads_strategy_and_backtest_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Config.toml");
        fs::write(
            &path,
            r#"
[strategy]
equity = "QQQ"
OOM = 0.2
option_weight = 0.03
schedule = "third_friday_week"

[backtest]
start = "2015-01-01"
end = "2016-01-01"
initial_cash = 50000

[backtest.universe]
max_expiry_days = 90
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from(&path, None).unwrap();
        assert_eq!(config.strategy.equity, "QQQ");
        assert_eq!(config.strategy.oom, dec!(0.2));
        assert_eq!(config.strategy.option_weight, dec!(0.03));
        assert_eq!(config.strategy.schedule, RollSchedule::ThirdFridayWeek);
        assert_eq!(config.strategy.roll_week, 3);
        assert_eq!(config.backtest.initial_cash, dec!(50000));
        assert_eq!(config.backtest.universe.min_expiry_days, 50);
        assert_eq!(config.backtest.universe.max_expiry_days, 90);
    }

    #[test]
    fn profile_overrides_base_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Config.toml");
        fs::write(&path, "[strategy]\noption_weight = 0.05\n").unwrap();
        fs::write(
            dir.path().join("Config.aggressive.toml"),
            "[strategy]\noption_weight = 0.1\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from(&path, Some("aggressive")).unwrap();
        assert_eq!(config.strategy.option_weight, dec!(0.1));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::load_from(dir.path().join("Config.toml"), None).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn out_of_range_weight_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Config.toml");
        fs::write(&path, "[strategy]\noption_weight = 2.0\n").unwrap();

        let err = ConfigLoader::load_from(&path, None).unwrap_err();
        assert!(err.to_string().contains("option_weight"));
    }

    #[test]
    fn env_overrides_oom_over_file_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Config.toml");
        fs::write(&path, "[strategy]\nOOM = 0.1\noption_weight = 0.05\n").unwrap();

        // A prefix of its own keeps this test's variables away from the others
        let prefix = "PUT_OVERLAY_LOADER_TEST_";
        std::env::set_var(format!("{prefix}STRATEGY__OOM"), "0.2");
        std::env::set_var(format!("{prefix}STRATEGY__OPTION_WEIGHT"), "0.02");
        let config = ConfigLoader::load_layers(&path, None, prefix);
        std::env::remove_var(format!("{prefix}STRATEGY__OOM"));
        std::env::remove_var(format!("{prefix}STRATEGY__OPTION_WEIGHT"));

        let config = config.unwrap();
        assert_eq!(config.strategy.oom, dec!(0.2));
        assert_eq!(config.strategy.option_weight, dec!(0.02));
    }

    #[test]
    fn env_keys_are_lowercased_except_oom() {
        assert_eq!(env_key("STRATEGY.OOM"), "strategy.OOM");
        assert_eq!(env_key("strategy.oom"), "strategy.OOM");
        assert_eq!(env_key("BACKTEST.UNIVERSE.MAX_EXPIRY_DAYS"), "backtest.universe.max_expiry_days");
    }
}
