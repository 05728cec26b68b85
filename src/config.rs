//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use time::Date;
use time::macros::date;

use crate::meter::Tariff;
use crate::meter::client::{ACCRUAL_DAY, DEMAND_RATE, ENERGY_RATE};

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Calendar span and random seed.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Window, rates, and billing-day conventions.
    #[serde(default)]
    pub billing: BillingConfig,
    /// Client population.
    #[serde(default)]
    pub clients: ClientsConfig,
    /// Random-walk reading generator parameters.
    #[serde(default)]
    pub random_walk: RandomWalkConfig,
}

/// Calendar span and random seed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of billed days to simulate (must be > 0).
    pub days: usize,
    /// History-only days recorded before billing starts.
    pub warmup_days: usize,
    /// Master random seed.
    pub seed: u64,
    /// Date of the first warm-up reading.
    pub start_date: Date,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days: 365,
            warmup_days: 30,
            seed: 42,
            start_date: date!(2024 - 01 - 01),
        }
    }
}

/// Window, rates, and billing-day conventions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BillingConfig {
    /// Trailing window in days; the ratchet looks back three windows.
    pub window: usize,
    /// Price per unit of windowed consumption.
    pub energy_rate: f64,
    /// Price per unit of ratchet demand.
    pub demand_rate: f64,
    /// Day of month on which cost entries accrue.
    pub accrual_day: u8,
    /// Day of month on which client accounts are charged.
    pub charge_day: u8,
    /// Company balance before the first charge.
    pub opening_balance: f64,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            window: 20,
            energy_rate: ENERGY_RATE,
            demand_rate: DEMAND_RATE,
            accrual_day: ACCRUAL_DAY,
            charge_day: 2,
            opening_balance: 100.0,
        }
    }
}

impl BillingConfig {
    /// The tariff every meter in the scenario accrues costs with.
    pub fn tariff(&self) -> Tariff {
        Tariff {
            energy_rate: self.energy_rate,
            demand_rate: self.demand_rate,
            accrual_day: self.accrual_day,
        }
    }
}

/// Client population.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientsConfig {
    /// Number of client meters behind the master (must be > 0).
    pub count: usize,
}

impl Default for ClientsConfig {
    fn default() -> Self {
        Self { count: 3 }
    }
}

/// Random-walk reading generator parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RandomWalkConfig {
    /// A spike happens on average once every `spike_one_in` readings.
    pub spike_one_in: u32,
    /// Smallest spike value.
    pub spike_min: i64,
    /// Largest spike value.
    pub spike_max: i64,
    /// Smallest first reading.
    pub initial_min: i64,
    /// Largest first reading.
    pub initial_max: i64,
    /// Upper bound of the ordinary walk.
    pub ceiling: i64,
    /// Smallest value the walk settles to after a spike.
    pub settle_min: i64,
    /// Largest value the walk settles to after a spike.
    pub settle_max: i64,
}

impl Default for RandomWalkConfig {
    fn default() -> Self {
        Self {
            spike_one_in: 21,
            spike_min: 10,
            spike_max: 20,
            initial_min: 2,
            initial_max: 3,
            ceiling: 9,
            settle_min: 2,
            settle_max: 8,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"billing.window"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl ScenarioConfig {
    /// Returns the baseline scenario: three clients, 20-day window, one year.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            billing: BillingConfig::default(),
            clients: ClientsConfig::default(),
            random_walk: RandomWalkConfig::default(),
        }
    }

    /// Returns the spiky preset: frequent large spikes on a short window.
    pub fn spiky() -> Self {
        Self {
            billing: BillingConfig {
                window: 10,
                ..BillingConfig::default()
            },
            clients: ClientsConfig { count: 5 },
            random_walk: RandomWalkConfig {
                spike_one_in: 7,
                spike_min: 15,
                spike_max: 40,
                ..RandomWalkConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the single-client preset, where redistribution is a no-op
    /// apart from rounding.
    pub fn single_client() -> Self {
        Self {
            clients: ClientsConfig { count: 1 },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "spiky", "single_client"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "spiky" => Ok(Self::spiky()),
            "single_client" => Ok(Self::single_client()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut check = |ok: bool, field: &str, message: &str| {
            if !ok {
                errors.push(ConfigError {
                    field: field.into(),
                    message: message.into(),
                });
            }
        };

        check(self.simulation.days > 0, "simulation.days", "must be > 0");

        let b = &self.billing;
        check(b.window > 0, "billing.window", "must be > 0");
        check(
            b.energy_rate.is_finite() && b.energy_rate >= 0.0,
            "billing.energy_rate",
            "must be finite and >= 0",
        );
        check(
            b.demand_rate.is_finite() && b.demand_rate >= 0.0,
            "billing.demand_rate",
            "must be finite and >= 0",
        );
        // Days past 28 do not occur in every month.
        check(
            (1..=28).contains(&b.accrual_day),
            "billing.accrual_day",
            "must be in [1, 28]",
        );
        check(
            (1..=28).contains(&b.charge_day),
            "billing.charge_day",
            "must be in [1, 28]",
        );
        check(
            b.accrual_day != b.charge_day,
            "billing.charge_day",
            "must differ from billing.accrual_day",
        );
        check(
            b.opening_balance.is_finite(),
            "billing.opening_balance",
            "must be finite",
        );

        check(self.clients.count > 0, "clients.count", "must be > 0");

        let w = &self.random_walk;
        check(w.spike_one_in > 0, "random_walk.spike_one_in", "must be > 0");
        check(
            w.spike_min <= w.spike_max,
            "random_walk.spike_min",
            "must be <= random_walk.spike_max",
        );
        check(
            w.initial_min <= w.initial_max,
            "random_walk.initial_min",
            "must be <= random_walk.initial_max",
        );
        check(
            w.settle_min <= w.settle_max,
            "random_walk.settle_min",
            "must be <= random_walk.settle_max",
        );
        check(w.ceiling > 0, "random_walk.ceiling", "must be > 0");

        errors
    }
}
