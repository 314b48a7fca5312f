//! TOML-based engine configuration: technical defaults and the cost table.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level engine configuration parsed from TOML.
///
/// All fields have defaults matching the reference deployment (Goiânia, GO).
/// Load from TOML with [`EngineConfig::from_toml_file`] or start from
/// [`EngineConfig::default`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Environment and panel defaults.
    pub technical: TechnicalDefaults,
    /// Tariffs and unit costs.
    pub costs: CostTable,
}

/// Environment/region constants and panel data used when a request does not
/// override them.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TechnicalDefaults {
    /// Mean solar radiation (kWh/m²/day).
    pub solar_radiation: f64,
    /// Overall system efficiency, in `(0, 1]`.
    pub system_efficiency: f64,
    /// Nameplate panel power (Wp).
    pub panel_power_wp: f64,
    /// Footprint per panel (m²).
    pub panel_area_m2: f64,
}

impl Default for TechnicalDefaults {
    fn default() -> Self {
        Self {
            solar_radiation: 5.5,
            system_efficiency: 0.80,
            panel_power_wp: 550.0,
            panel_area_m2: 2.1,
        }
    }
}

impl TechnicalDefaults {
    /// Returns defaults with the mean irradiation of a Brazilian state.
    ///
    /// Unknown codes fall back to the country-wide default of 5.5.
    pub fn for_state(code: &str) -> Self {
        let solar_radiation = match code {
            "GO" | "DF" => 5.8,
            "SP" => 5.4,
            "RJ" => 5.1,
            "MG" => 5.5,
            "BA" => 6.2,
            "CE" => 6.0,
            "PE" => 5.9,
            "RS" => 4.8,
            "SC" => 4.9,
            "PR" => 5.0,
            "MT" => 6.1,
            "MS" => 5.7,
            _ => 5.5,
        };
        Self {
            solar_radiation,
            ..Self::default()
        }
    }
}

/// Tariffs and unit costs for the financial passes.
///
/// The flat `cost_per_wp_*` figures price turnkey grid-tie systems by
/// scenario family; the `panel_cost_per_wp`/`inverter_cost_per_wp`/
/// installation fields feed the itemized combined-mode model.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CostTable {
    /// Turnkey cost per Wp for residential systems (R$/Wp).
    pub cost_per_wp_residential: f64,
    /// Turnkey cost per Wp for commercial/industrial systems (R$/Wp).
    pub cost_per_wp_commercial: f64,
    /// Panel line of the itemized combined-mode model (R$/Wp).
    pub panel_cost_per_wp: f64,
    /// Inverter line of the itemized model (R$/Wp).
    pub inverter_cost_per_wp: f64,
    /// Installation share of the panel cost, in `[0, 1]`.
    pub installation_pct: f64,
    /// Fixed installation cost (R$).
    pub installation_fixed: f64,
    /// Battery bank cost (R$/kWh).
    pub battery_cost_per_kwh: f64,
    /// Grid energy tariff (R$/kWh).
    pub tariff_per_kwh: f64,
    /// Price charged per kWh at EV charging points (R$/kWh).
    pub ev_charging_price_per_kwh: f64,
    /// Project lifetime for financial projections (years).
    pub project_years: u32,
    /// Year-over-year tariff escalation for cash-flow projections.
    pub tariff_annual_increase: f64,
}

impl Default for CostTable {
    fn default() -> Self {
        Self {
            cost_per_wp_residential: 4.5,
            cost_per_wp_commercial: 4.0,
            panel_cost_per_wp: 9.5,
            inverter_cost_per_wp: 1.5,
            installation_pct: 0.10,
            installation_fixed: 10_000.0,
            battery_cost_per_kwh: 800.0,
            tariff_per_kwh: 0.65,
            ev_charging_price_per_kwh: 0.80,
            project_years: 25,
            tariff_annual_increase: 0.08,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"technical.solar_radiation"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl EngineConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let t = &self.technical;

        if !(t.solar_radiation.is_finite() && t.solar_radiation > 0.0) {
            errors.push(ConfigError {
                field: "technical.solar_radiation".into(),
                message: "must be > 0".into(),
            });
        }
        if !(t.system_efficiency.is_finite()
            && t.system_efficiency > 0.0
            && t.system_efficiency <= 1.0)
        {
            errors.push(ConfigError {
                field: "technical.system_efficiency".into(),
                message: "must be in (0.0, 1.0]".into(),
            });
        }
        if !(t.panel_power_wp.is_finite() && t.panel_power_wp > 0.0) {
            errors.push(ConfigError {
                field: "technical.panel_power_wp".into(),
                message: "must be > 0".into(),
            });
        }
        if !(t.panel_area_m2.is_finite() && t.panel_area_m2 > 0.0) {
            errors.push(ConfigError {
                field: "technical.panel_area_m2".into(),
                message: "must be > 0".into(),
            });
        }

        let c = &self.costs;
        let non_negative: [(&str, f64); 8] = [
            ("costs.cost_per_wp_residential", c.cost_per_wp_residential),
            ("costs.cost_per_wp_commercial", c.cost_per_wp_commercial),
            ("costs.panel_cost_per_wp", c.panel_cost_per_wp),
            ("costs.inverter_cost_per_wp", c.inverter_cost_per_wp),
            ("costs.installation_fixed", c.installation_fixed),
            ("costs.battery_cost_per_kwh", c.battery_cost_per_kwh),
            ("costs.tariff_per_kwh", c.tariff_per_kwh),
            (
                "costs.ev_charging_price_per_kwh",
                c.ev_charging_price_per_kwh,
            ),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                errors.push(ConfigError {
                    field: field.into(),
                    message: "must be >= 0".into(),
                });
            }
        }
        if !(c.installation_pct.is_finite() && (0.0..=1.0).contains(&c.installation_pct)) {
            errors.push(ConfigError {
                field: "costs.installation_pct".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }
        if c.project_years == 0 {
            errors.push(ConfigError {
                field: "costs.project_years".into(),
                message: "must be > 0".into(),
            });
        }
        if !(c.tariff_annual_increase.is_finite() && c.tariff_annual_increase >= 0.0) {
            errors.push(ConfigError {
                field: "costs.tariff_annual_increase".into(),
                message: "must be >= 0".into(),
            });
        }

        errors
    }
}
