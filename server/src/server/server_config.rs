use std::default::Default;

use log::warn;
use serde::Deserialize;

use detangler_shared::{MarkerVocabulary, Tick};

use crate::ConfigError;

/// Default interval between full sweeps: 5 minutes at 20 ticks per second
pub const DEFAULT_CLEAN_INTERVAL_TICKS: Tick = 6000;
/// Default interval between registry-only orphan checks
pub const DEFAULT_REGISTRY_CHECK_INTERVAL_TICKS: Tick = 100;
/// Default age past which an object without a legitimacy signal is flagged
pub const DEFAULT_HIGH_AGE_TICKS: Tick = 200;

/// Contains Config properties which will be used by the Detangler
#[derive(Clone, Debug, PartialEq)]
pub struct DetanglerConfig {
    /// Whether lifecycle events (detections, discards, sweeps) are logged at
    /// info level
    pub enable_log_notifications: bool,
    /// Run one reclaiming sweep the first time the host reports it has started
    pub auto_run_on_start: bool,
    /// Whether periodic full sweeps reclaim what they find, or only count it
    pub auto_remove: bool,
    /// Log each partition as it is scanned, and the totals of periodic sweeps
    pub verbose_logging: bool,
    /// Ticks between full sweeps. `0` disables periodic full sweeps.
    pub clean_interval_ticks: Tick,
    /// Ticks between registry-only orphan checks
    pub registry_check_interval_ticks: Tick,
    /// Age in ticks past which the `high_age` signal may fire
    pub high_age_ticks: Tick,
    /// Markers, kinds and tags recognized on the cooperating subsystem's objects
    pub vocabulary: MarkerVocabulary,
}

impl Default for DetanglerConfig {
    fn default() -> Self {
        Self {
            enable_log_notifications: true,
            auto_run_on_start: true,
            auto_remove: true,
            verbose_logging: false,
            clean_interval_ticks: DEFAULT_CLEAN_INTERVAL_TICKS,
            registry_check_interval_ticks: DEFAULT_REGISTRY_CHECK_INTERVAL_TICKS,
            high_age_ticks: DEFAULT_HIGH_AGE_TICKS,
            vocabulary: MarkerVocabulary::default(),
        }
    }
}

// Numbers are read signed so that a negative value is rejected on its own
// instead of failing the whole document.
#[derive(Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    enable_log_notifications: Option<bool>,
    auto_run_on_start: Option<bool>,
    auto_remove: Option<bool>,
    verbose_logging: Option<bool>,
    clean_interval_ticks: Option<i64>,
    registry_check_interval_ticks: Option<i64>,
    high_age_ticks: Option<i64>,
    vocabulary: Option<MarkerVocabulary>,
}

impl DetanglerConfig {
    /// Loads a config from TOML, never failing: an unparseable document yields
    /// the default config, and each invalid value falls back to its default.
    /// Every rejection is logged.
    pub fn load(toml_source: &str) -> Self {
        let raw = match parse(toml_source) {
            Ok(raw) => raw,
            Err(error) => {
                warn!("{}; using default config", error);
                return Self::default();
            }
        };

        let (config, errors) = Self::resolve(raw);
        for error in errors {
            warn!("{}; using default value", error);
        }
        config
    }

    /// Loads a config from TOML, returning the first rejected value as an error
    pub fn try_from_toml(toml_source: &str) -> Result<Self, ConfigError> {
        let (config, errors) = Self::resolve(parse(toml_source)?);
        match errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(config),
        }
    }

    /// Replaces every invalid value of a config built in code with its
    /// default, logging each rejection the way [`load`] does
    ///
    /// [`load`]: DetanglerConfig::load
    pub fn sanitized(self) -> Self {
        let (config, errors) = self.sanitize();
        for error in errors {
            warn!("{}; using default value", error);
        }
        config
    }

    /// Checks a programmatically built config
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.clone().sanitize().1.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn sanitize(mut self) -> (Self, Vec<ConfigError>) {
        let defaults = Self::default();
        let mut errors = Vec::new();

        if self.registry_check_interval_ticks == 0 {
            errors.push(ConfigError::InvalidInterval {
                field: "registry_check_interval_ticks",
                value: 0,
                min: 1,
            });
            self.registry_check_interval_ticks = defaults.registry_check_interval_ticks;
        }
        if self.high_age_ticks == 0 {
            errors.push(ConfigError::InvalidThreshold {
                field: "high_age_ticks",
                value: 0,
                min: 1,
            });
            self.high_age_ticks = defaults.high_age_ticks;
        }
        if let Err(error) = self.vocabulary.validate() {
            errors.push(error.into());
            self.vocabulary = defaults.vocabulary;
        }

        (self, errors)
    }

    fn resolve(raw: RawConfig) -> (Self, Vec<ConfigError>) {
        let defaults = Self::default();
        let mut errors = Vec::new();

        let clean_interval_ticks = interval(
            "clean_interval_ticks",
            raw.clean_interval_ticks,
            0,
            defaults.clean_interval_ticks,
            &mut errors,
        );
        let registry_check_interval_ticks = interval(
            "registry_check_interval_ticks",
            raw.registry_check_interval_ticks,
            1,
            defaults.registry_check_interval_ticks,
            &mut errors,
        );

        let high_age_ticks = match raw.high_age_ticks {
            None => defaults.high_age_ticks,
            Some(value) => match Tick::try_from(value) {
                Ok(ticks) if ticks >= 1 => ticks,
                _ => {
                    errors.push(ConfigError::InvalidThreshold {
                        field: "high_age_ticks",
                        value,
                        min: 1,
                    });
                    defaults.high_age_ticks
                }
            },
        };

        let vocabulary = match raw.vocabulary {
            None => defaults.vocabulary.clone(),
            Some(vocabulary) => match vocabulary.validate() {
                Ok(()) => vocabulary,
                Err(error) => {
                    errors.push(error.into());
                    defaults.vocabulary.clone()
                }
            },
        };

        let config = Self {
            enable_log_notifications: raw
                .enable_log_notifications
                .unwrap_or(defaults.enable_log_notifications),
            auto_run_on_start: raw.auto_run_on_start.unwrap_or(defaults.auto_run_on_start),
            auto_remove: raw.auto_remove.unwrap_or(defaults.auto_remove),
            verbose_logging: raw.verbose_logging.unwrap_or(defaults.verbose_logging),
            clean_interval_ticks,
            registry_check_interval_ticks,
            high_age_ticks,
            vocabulary,
        };

        (config, errors)
    }
}

fn parse(toml_source: &str) -> Result<RawConfig, ConfigError> {
    toml::from_str(toml_source).map_err(|error| ConfigError::Parse {
        message: error.to_string(),
    })
}

fn interval(
    field: &'static str,
    value: Option<i64>,
    min: i64,
    default: Tick,
    errors: &mut Vec<ConfigError>,
) -> Tick {
    let Some(value) = value else {
        return default;
    };
    if value < min {
        errors.push(ConfigError::InvalidInterval { field, value, min });
        return default;
    }
    Tick::try_from(value).unwrap_or(default)
}
