//! Calculation engine: scenario dispatch, sizing, and financial assembly.
//!
//! The engine is pure and synchronous. Each call is a stateless function of
//! its inputs — no cache, no lock, no I/O — so hosts may invoke it
//! concurrently without coordination.

pub mod combined;
pub mod error;
pub mod financial;
pub mod params;
pub mod scenario;
pub mod sizing;

use serde::Serialize;

use crate::config::{EngineConfig, TechnicalDefaults};

pub use self::error::CalcError;
pub use self::params::ParameterMap;
pub use self::scenario::ScenarioKind;

use self::financial::{CostModel, FinancialBreakdown, FinancialMetrics, SavingsBasis};
use self::scenario::derive_demand;
use self::sizing::SizingInput;

/// Technical and sizing results of one calculation.
///
/// Per-scenario add-ons are optional fields, absent for scenarios that do
/// not produce them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioResults {
    /// Number of panels installed.
    pub num_panels: u32,
    /// Installed power (Wp).
    pub installed_power_wp: f64,
    /// Roof area taken by the panels (m²).
    pub required_area_m2: f64,
    /// Annual generation (kWh/year).
    pub annual_generation_kwh: f64,
    /// Demand the system was sized for (kWh/day).
    pub daily_consumption_kwh: f64,
    /// Annualized demand (kWh/year).
    pub annual_consumption_kwh: f64,
    /// Generation as a percentage of annual demand.
    pub coverage_pct: f64,
    /// Whether the available area fit the unclamped panel count; absent for
    /// scenarios without an area constraint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_sufficient: Option<bool>,
    /// Number of EV charging points (EV-charging only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_charging_points: Option<u32>,
    /// Battery bank size (EV-charging and common-area only, kWh).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_capacity_kwh: Option<f64>,
    /// Backup autonomy window (common-area only, hours).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_hours: Option<f64>,
}

/// Complete result record for one calculation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationOutcome {
    /// Scenario the request was calculated for.
    pub scenario: ScenarioKind,
    /// Sizing and scenario results.
    pub results: ScenarioResults,
    /// Technical constants the calculation used.
    pub technical_specs: TechnicalDefaults,
    /// Financial analysis.
    pub financial_analysis: FinancialBreakdown,
    /// Lifetime metrics over the configured project horizon.
    pub projection: FinancialMetrics,
}

/// Runs one sizing and financial calculation.
///
/// Dispatches on `kind` to derive the demand figure, sizes the system under
/// the scenario's area constraint (if any), and prices it with the
/// scenario's cost model.
///
/// # Errors
///
/// `MissingParameter` or `InvalidParameter` from demand derivation and
/// sizing; the scenario itself is already resolved, so this function never
/// returns `UnsupportedScenario` (see [`calculate_named`]).
pub fn calculate(
    kind: ScenarioKind,
    params: &ParameterMap,
    config: &EngineConfig,
) -> Result<CalculationOutcome, CalcError> {
    let technical = &config.technical;
    let costs = &config.costs;

    let demand = derive_demand(kind, params)?;

    let sized = sizing::size(&SizingInput {
        daily_consumption_kwh: demand.daily_consumption_kwh,
        available_area_m2: demand.available_area_m2,
        panel_power_wp: technical.panel_power_wp,
        panel_area_m2: technical.panel_area_m2,
        solar_radiation: technical.solar_radiation,
        system_efficiency: technical.system_efficiency,
    })?;

    let model = match kind {
        ScenarioKind::Residential => CostModel::GridTie {
            cost_per_wp: costs.cost_per_wp_residential,
        },
        ScenarioKind::Commercial | ScenarioKind::Industrial => CostModel::GridTie {
            cost_per_wp: costs.cost_per_wp_commercial,
        },
        ScenarioKind::CommonAreas => CostModel::WithStorage {
            cost_per_wp: costs.cost_per_wp_residential,
            battery_capacity_kwh: demand.battery_capacity_kwh.unwrap_or(0.0),
            basis: SavingsBasis::TariffOffset,
        },
        ScenarioKind::EvCharging => CostModel::WithStorage {
            cost_per_wp: costs.cost_per_wp_residential,
            battery_capacity_kwh: demand.battery_capacity_kwh.unwrap_or(0.0),
            basis: SavingsBasis::ChargingMargin,
        },
    };

    let financial_analysis = model.analyze(
        sized.installed_power_wp,
        sized.annual_generation_kwh,
        demand.annual_consumption_kwh,
        costs,
    );

    let projection = financial::project_metrics(
        financial_analysis.total_investment,
        financial_analysis.annual_savings,
        costs.project_years,
    );

    let area_sufficient = demand.available_area_m2.map(|_| sized.area_sufficient);

    Ok(CalculationOutcome {
        scenario: kind,
        results: ScenarioResults {
            num_panels: sized.num_panels,
            installed_power_wp: sized.installed_power_wp,
            required_area_m2: sized.required_area_m2,
            annual_generation_kwh: sized.annual_generation_kwh,
            daily_consumption_kwh: demand.daily_consumption_kwh,
            annual_consumption_kwh: demand.annual_consumption_kwh,
            coverage_pct: sized.coverage_pct,
            area_sufficient,
            num_charging_points: demand.num_charging_points,
            battery_capacity_kwh: demand.battery_capacity_kwh,
            backup_hours: demand.backup_hours,
        },
        technical_specs: technical.clone(),
        financial_analysis,
        projection,
    })
}

/// Like [`calculate`], resolving the scenario from its wire name first.
///
/// # Errors
///
/// `UnsupportedScenario` for an unknown type string, plus everything
/// [`calculate`] returns.
pub fn calculate_named(
    scenario_type: &str,
    params: &ParameterMap,
    config: &EngineConfig,
) -> Result<CalculationOutcome, CalcError> {
    let kind = ScenarioKind::parse(scenario_type)?;
    calculate(kind, params, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residential_params() -> ParameterMap {
        let mut p = ParameterMap::new();
        p.set("num_units", 80.0)
            .set("consumption_per_unit", 150.0)
            .set("available_area", 200.0);
        p
    }

    #[test]
    fn residential_reference_case() {
        let outcome = calculate(
            ScenarioKind::Residential,
            &residential_params(),
            &EngineConfig::default(),
        )
        .expect("valid request");

        let r = &outcome.results;
        assert_eq!(r.num_panels, 95);
        assert_eq!(r.area_sufficient, Some(false));
        assert!((r.installed_power_wp - 52_250.0).abs() < 1e-9);
        assert!((r.annual_generation_kwh - 104_891.875).abs() < 1e-6);

        let f = &outcome.financial_analysis;
        assert!((f.total_investment - 52_250.0 * 4.5).abs() < 1e-9);
        assert!((f.annual_savings - 104_891.875 * 0.65).abs() < 1e-6);
        assert!(f.payback_years > 0.0);
    }

    #[test]
    fn ev_charging_reference_case() {
        let mut params = ParameterMap::new();
        params
            .set("num_parking_spots", 80.0)
            .set("charging_points_percentage", 21.0)
            .set("energy_per_charge", 18.0)
            .set("charges_per_day", 1.0);

        let outcome = calculate(ScenarioKind::EvCharging, &params, &EngineConfig::default())
            .expect("valid request");

        let r = &outcome.results;
        assert_eq!(r.num_charging_points, Some(16));
        assert!((r.daily_consumption_kwh - 288.0).abs() < 1e-9);
        // 288 * 1.2, up to a rounding ulp
        assert!((r.battery_capacity_kwh.unwrap_or(0.0) - 345.6).abs() < 1e-9);
        assert_eq!(r.area_sufficient, None);

        let f = &outcome.financial_analysis;
        // battery 345.6 kWh * 800 R$/kWh
        assert!((f.battery_cost.unwrap_or(0.0) - 276_480.0).abs() < 1e-6);
        // margin pricing: revenue at 0.80, grid offset at 0.65
        assert!((f.annual_savings - 105_120.0 * 0.15).abs() < 1e-6);
        assert!(f.annual_revenue.is_some());
    }

    #[test]
    fn commercial_uses_cheaper_cost_per_wp() {
        let mut params = ParameterMap::new();
        params
            .set("monthly_consumption", 3_000.0)
            .set("available_area", 1_000.0);

        let outcome = calculate(ScenarioKind::Commercial, &params, &EngineConfig::default())
            .expect("valid request");
        assert_eq!(outcome.financial_analysis.cost_per_wp, 4.0);
    }

    #[test]
    fn common_areas_reports_backup_fields() {
        let mut params = ParameterMap::new();
        params
            .set("daily_consumption", 70.0)
            .set("critical_consumption_per_hour", 4.56)
            .set("backup_hours", 8.0);

        let outcome = calculate(ScenarioKind::CommonAreas, &params, &EngineConfig::default())
            .expect("valid request");
        let r = &outcome.results;
        assert_eq!(r.backup_hours, Some(8.0));
        assert!((r.battery_capacity_kwh.unwrap_or(0.0) - 36.48).abs() < 1e-9);
        // savings from offset consumption, not generation
        let f = &outcome.financial_analysis;
        assert!((f.annual_savings - 70.0 * 365.0 * 0.65).abs() < 1e-6);
    }

    #[test]
    fn projection_spans_the_configured_horizon() {
        let outcome = calculate(
            ScenarioKind::Residential,
            &residential_params(),
            &EngineConfig::default(),
        )
        .expect("valid request");

        let f = &outcome.financial_analysis;
        let p = &outcome.projection;
        // default horizon is 25 years
        assert!((p.total_savings - f.annual_savings * 25.0).abs() < 1e-6);
        assert!((p.net_profit - (p.total_savings - f.total_investment)).abs() < 1e-6);
        assert!((p.payback_months - f.payback_years * 12.0).abs() < 1e-9);
    }

    #[test]
    fn unsupported_scenario_via_named_entry() {
        let err = calculate_named("bogus_type", &ParameterMap::new(), &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, CalcError::UnsupportedScenario { .. }));
    }

    #[test]
    fn identical_inputs_produce_identical_outcomes() {
        let config = EngineConfig::default();
        let a = calculate(ScenarioKind::Residential, &residential_params(), &config);
        let b = calculate(ScenarioKind::Residential, &residential_params(), &config);
        assert_eq!(a, b);
    }

    #[test]
    fn missing_parameter_carries_field_name() {
        let err = calculate(
            ScenarioKind::Residential,
            &ParameterMap::new(),
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, CalcError::missing("num_units"));
    }
}
