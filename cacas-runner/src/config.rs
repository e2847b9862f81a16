//! Serializable scan/backtest configuration.

use cacas_core::error::require_positive;
use cacas_core::{ChannelParams, ParamError, Period, MIN_BARS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("universe must list at least one ticker")]
    EmptyUniverse,

    #[error("duplicate ticker in universe: {0}")]
    DuplicateTicker(String),

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for one scan/backtest run over a universe of tickers.
///
/// Two runs with identical configs share a `run_id`, so results can be
/// keyed and compared across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Tickers to scan.
    pub universe: Vec<String>,

    /// History length requested from the data provider.
    #[serde(default = "default_period")]
    pub period: Period,

    /// Channel window lengths.
    #[serde(default)]
    pub channel: ChannelParams,

    /// Stop distance: ATR × this.
    #[serde(default = "default_atr_multiplier")]
    pub atr_multiplier: f64,

    /// Target distance: stop distance × this.
    #[serde(default = "default_target_multiplier")]
    pub target_multiplier: f64,

    /// Minimum usable series length.
    #[serde(default = "default_min_bars")]
    pub min_bars: usize,
}

fn default_period() -> Period {
    Period::OneYear
}

fn default_atr_multiplier() -> f64 {
    1.5
}

fn default_target_multiplier() -> f64 {
    2.0
}

fn default_min_bars() -> usize {
    MIN_BARS
}

impl ScanConfig {
    /// Parse and validate a TOML config.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ScanConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.universe.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }
        let mut seen = HashSet::new();
        for ticker in &self.universe {
            if !seen.insert(ticker.as_str()) {
                return Err(ConfigError::DuplicateTicker(ticker.clone()));
            }
        }
        self.channel.validate()?;
        require_positive("atr_multiplier", self.atr_multiplier)?;
        require_positive("target_multiplier", self.target_multiplier)?;
        Ok(())
    }

    /// Deterministic content hash of this configuration.
    pub fn run_id(&self) -> String {
        let json = serde_json::to_string(self).expect("ScanConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ScanConfig {
        ScanConfig {
            universe: vec!["PETR4".into(), "VALE3".into()],
            period: Period::OneYear,
            channel: ChannelParams::default(),
            atr_multiplier: 1.5,
            target_multiplier: 2.0,
            min_bars: MIN_BARS,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn empty_universe_rejected() {
        let mut config = sample();
        config.universe.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyUniverse)
        ));
    }

    #[test]
    fn duplicate_ticker_rejected() {
        let mut config = sample();
        config.universe.push("PETR4".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateTicker(t)) if t == "PETR4"
        ));
    }

    #[test]
    fn bad_channel_window_rejected() {
        let mut config = sample();
        config.channel.ema = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_multiplier_rejected() {
        let mut config = sample();
        config.atr_multiplier = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_round_trip_with_defaults() {
        let text = r#"
            universe = ["PETR4", "VALE3", "BTC-USD"]
            period = "2y"

            [channel]
            upper = 20
            under = 30
            ema = 9
        "#;
        let config = ScanConfig::from_toml_str(text).unwrap();
        assert_eq!(config.universe.len(), 3);
        assert_eq!(config.period, Period::TwoYears);
        assert_eq!(config.atr_multiplier, 1.5);
        assert_eq!(config.target_multiplier, 2.0);
        assert_eq!(config.min_bars, MIN_BARS);
    }

    #[test]
    fn run_id_is_stable_and_config_sensitive() {
        let a = sample();
        let b = sample();
        assert_eq!(a.run_id(), b.run_id());

        let mut c = sample();
        c.atr_multiplier = 2.0;
        assert_ne!(a.run_id(), c.run_id());
    }
}
