//! Scenario types and per-scenario demand derivation.
//!
//! Each scenario reduces its own parameter shape to one [`ScenarioDemand`]
//! record — a daily consumption figure plus the scenario's add-ons as data —
//! which the shared sizing and financial passes then consume. Per-scenario
//! differences live here and nowhere else.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::CalcError;
use super::params::ParameterMap;
use super::sizing::DAYS_PER_YEAR;

/// Safety margin applied to the EV-charging battery bank (20% headroom over
/// one day of charging demand).
pub const EV_BATTERY_MARGIN: f64 = 1.2;

/// Months per year, for monthly → annual consumption conversion.
const MONTHS_PER_YEAR: f64 = 12.0;

/// The five supported simulation scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Residential,
    Commercial,
    Industrial,
    CommonAreas,
    EvCharging,
}

impl ScenarioKind {
    /// All supported scenarios, in display order.
    pub const ALL: [ScenarioKind; 5] = [
        ScenarioKind::Residential,
        ScenarioKind::Commercial,
        ScenarioKind::Industrial,
        ScenarioKind::CommonAreas,
        ScenarioKind::EvCharging,
    ];

    /// Canonical wire name of the scenario.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Commercial => "commercial",
            Self::Industrial => "industrial",
            Self::CommonAreas => "common_areas",
            Self::EvCharging => "ev_charging",
        }
    }

    /// Parses a wire name.
    ///
    /// # Errors
    ///
    /// `UnsupportedScenario` carrying the given string when it matches no
    /// known scenario.
    pub fn parse(s: &str) -> Result<Self, CalcError> {
        match s {
            "residential" => Ok(Self::Residential),
            "commercial" => Ok(Self::Commercial),
            "industrial" => Ok(Self::Industrial),
            "common_areas" => Ok(Self::CommonAreas),
            "ev_charging" => Ok(Self::EvCharging),
            other => Err(CalcError::UnsupportedScenario {
                given: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Demand figure and scenario add-ons derived from raw parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioDemand {
    /// Consumption to cover (kWh/day).
    pub daily_consumption_kwh: f64,
    /// Annualized consumption (kWh/year).
    pub annual_consumption_kwh: f64,
    /// Roof-area constraint, when the scenario carries one.
    pub available_area_m2: Option<f64>,
    /// Battery bank required by the scenario (kWh), if any.
    pub battery_capacity_kwh: Option<f64>,
    /// Number of charging points (EV-charging only).
    pub num_charging_points: Option<u32>,
    /// Backup autonomy window (common-area only, hours).
    pub backup_hours: Option<f64>,
}

impl ScenarioDemand {
    fn from_daily(daily_kwh: f64) -> Self {
        Self {
            daily_consumption_kwh: daily_kwh,
            annual_consumption_kwh: daily_kwh * DAYS_PER_YEAR,
            available_area_m2: None,
            battery_capacity_kwh: None,
            num_charging_points: None,
            backup_hours: None,
        }
    }

    fn from_annual(annual_kwh: f64) -> Self {
        Self {
            daily_consumption_kwh: annual_kwh / DAYS_PER_YEAR,
            annual_consumption_kwh: annual_kwh,
            available_area_m2: None,
            battery_capacity_kwh: None,
            num_charging_points: None,
            backup_hours: None,
        }
    }
}

/// Derives the consumption figure and add-ons for `kind` from `params`.
///
/// # Errors
///
/// `MissingParameter` for absent required keys, `InvalidParameter` for
/// negative values or an out-of-range charging-point percentage.
pub fn derive_demand(kind: ScenarioKind, params: &ParameterMap) -> Result<ScenarioDemand, CalcError> {
    match kind {
        ScenarioKind::Residential => {
            let num_units = params.require_non_negative("num_units")?;
            let per_unit = params.require_non_negative("consumption_per_unit")?;
            let area = params.require_non_negative("available_area")?;

            let mut demand = ScenarioDemand::from_annual(num_units * per_unit * MONTHS_PER_YEAR);
            demand.available_area_m2 = Some(area);
            Ok(demand)
        }
        ScenarioKind::Commercial | ScenarioKind::Industrial => {
            let monthly = params.require_non_negative("monthly_consumption")?;
            let area = params.require_non_negative("available_area")?;

            let mut demand = ScenarioDemand::from_annual(monthly * MONTHS_PER_YEAR);
            demand.available_area_m2 = Some(area);
            Ok(demand)
        }
        ScenarioKind::CommonAreas => {
            let daily = params.require_non_negative("daily_consumption")?;
            let critical = params.require_non_negative("critical_consumption_per_hour")?;
            let backup_hours = params.non_negative_or("backup_hours", 8.0)?;

            let mut demand = ScenarioDemand::from_daily(daily);
            demand.battery_capacity_kwh = Some(critical * backup_hours);
            demand.backup_hours = Some(backup_hours);
            Ok(demand)
        }
        ScenarioKind::EvCharging => {
            let spots = params.require_non_negative("num_parking_spots")?;
            let pct = params.percentage("charging_points_percentage")?;
            let per_charge = params.non_negative_or("energy_per_charge", 18.0)?;
            let charges_per_day = params.non_negative_or("charges_per_day", 1.0)?;

            let points = (spots * pct / 100.0).floor() as u32;
            let daily = f64::from(points) * per_charge * charges_per_day;

            let mut demand = ScenarioDemand::from_daily(daily);
            demand.battery_capacity_kwh = Some(daily * EV_BATTERY_MARGIN);
            demand.num_charging_points = Some(points);
            Ok(demand)
        }
    }
}
