//! Multi-module combined sizing with an itemized financial pass.
//!
//! A development can run several systems at once — EV charging, common-area
//! supply, and per-unit residential arrays — sharing one roof budget and one
//! financial close. This entry point is distinct from the per-scenario
//! [`calculate`](super::calculate) path: modules are sized from the derated
//! per-panel yield, area overruns surface as validation issues instead of
//! clamping, and the investment is itemized (panels, inverters,
//! installation, batteries) before a single combined savings pass.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::CostTable;

use super::financial::{payback_years, roi_percentage};
use super::sizing::{DAYS_PER_YEAR, energy_per_panel_kwh_day, panels_for_demand};

/// Payback window considered plausible for a combined project (years).
const PAYBACK_PLAUSIBLE_RANGE: (f64, f64) = (2.0, 20.0);

/// Slack for area comparisons; panel-count arithmetic accumulates rounding
/// (80 panels × 2.1 m² lands a few ulps above 168 m²).
const AREA_TOLERANCE_M2: f64 = 1e-6;

/// Panel model used by one module.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelSpec {
    /// Nameplate power (Wp).
    pub power_wp: f64,
    /// Footprint per panel (m²).
    pub area_m2: f64,
}

impl Default for PanelSpec {
    fn default() -> Self {
        Self {
            power_wp: 550.0,
            area_m2: 2.1,
        }
    }
}

/// EV-charging module parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvChargingModule {
    /// Roof area allocated to this module (m²).
    pub area_m2: f64,
    /// Total parking spots in the development.
    pub num_parking_spots: u32,
    /// Share of spots fitted with a charging point, in `[0, 100]`.
    pub charging_points_pct: f64,
    /// Energy delivered per charge (kWh).
    pub energy_per_charge_kwh: f64,
    /// Charges per point per day.
    pub charges_per_day: f64,
    /// Battery bank for overnight charging (kWh).
    pub battery_capacity_kwh: f64,
    /// Panel model for this module.
    pub panel: PanelSpec,
}

impl Default for EvChargingModule {
    fn default() -> Self {
        Self {
            area_m2: 350.0,
            num_parking_spots: 80,
            charging_points_pct: 21.0,
            energy_per_charge_kwh: 18.0,
            charges_per_day: 1.0,
            battery_capacity_kwh: 50.0,
            panel: PanelSpec::default(),
        }
    }
}

/// Common-area module parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommonAreaModule {
    /// Roof area allocated to this module (m²).
    pub area_m2: f64,
    /// Common-area consumption (kWh/day).
    pub daily_consumption_kwh: f64,
    /// Critical load that must ride through an outage (kWh/h).
    pub critical_consumption_per_hour_kwh: f64,
    /// Battery bank backing the critical load (kWh).
    pub battery_capacity_kwh: f64,
    /// Panel model for this module.
    pub panel: PanelSpec,
}

impl Default for CommonAreaModule {
    fn default() -> Self {
        Self {
            area_m2: 350.0,
            daily_consumption_kwh: 70.0,
            critical_consumption_per_hour_kwh: 4.56,
            battery_capacity_kwh: 50.0,
            panel: PanelSpec::default(),
        }
    }
}

/// Residential-units module parameters.
///
/// Units are sized by fixed allocation — north-facing units each get a set
/// number of panels — rather than by demand.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResidentialUnitsModule {
    /// Roof area allocated to this module (m²).
    pub area_m2: f64,
    /// Total units in the development.
    pub total_units: u32,
    /// Units with a north-facing roof.
    pub north_facing_units: u32,
    /// Panels installed per north-facing unit.
    pub panels_per_unit: u32,
    /// Property value added per equipped unit (R$).
    pub value_add_per_unit: f64,
    /// Panel model for this module.
    pub panel: PanelSpec,
}

impl Default for ResidentialUnitsModule {
    fn default() -> Self {
        Self {
            area_m2: 168.0,
            total_units: 80,
            north_facing_units: 40,
            panels_per_unit: 2,
            value_add_per_unit: 15_000.0,
            panel: PanelSpec::default(),
        }
    }
}

/// Request for one combined evaluation.
///
/// Every module is optional; `None` leaves it out of the totals. This is the
/// whole request state — there is no session, and validation is a pure
/// function over this record.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CombinedRequest {
    /// Total roof area of the development (m²).
    pub total_area_m2: f64,
    /// Mean solar radiation (kWh/m²/day).
    pub solar_radiation: f64,
    /// Overall system efficiency, in `(0, 1]`.
    pub system_efficiency: f64,
    /// EV-charging module, if enabled.
    pub ev_charging: Option<EvChargingModule>,
    /// Common-area module, if enabled.
    pub common_areas: Option<CommonAreaModule>,
    /// Residential-units module, if enabled.
    pub residential_units: Option<ResidentialUnitsModule>,
}

impl Default for CombinedRequest {
    fn default() -> Self {
        Self {
            total_area_m2: 12_000.0,
            solar_radiation: 5.5,
            system_efficiency: 0.80,
            ev_charging: None,
            common_areas: None,
            residential_units: None,
        }
    }
}

impl CombinedRequest {
    /// Returns the reference request: all three modules enabled with the
    /// baseline development parameters.
    pub fn baseline() -> Self {
        Self {
            ev_charging: Some(EvChargingModule::default()),
            common_areas: Some(CommonAreaModule::default()),
            residential_units: Some(ResidentialUnitsModule::default()),
            ..Self::default()
        }
    }
}

/// One validation finding, addressed by module and field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Module the issue belongs to (`"ev_charging"`, `"combined"`, …).
    pub module: String,
    /// Offending field within the module.
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ValidationIssue {
    fn new(module: &str, field: &str, message: String) -> Self {
        Self {
            module: module.to_string(),
            field: field.to_string(),
            message,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} — {}", self.module, self.field, self.message)
    }
}

/// Validates a combined request and returns every finding.
///
/// Returns an empty vector when the request can be evaluated. Area overruns
/// are reported here rather than clamped: the caller decides whether to
/// shrink a module or grow its allocation.
pub fn validate(req: &CombinedRequest) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if !(req.solar_radiation.is_finite() && req.solar_radiation > 0.0) {
        issues.push(ValidationIssue::new(
            "combined",
            "solar_radiation",
            "must be > 0".to_string(),
        ));
    }
    if !(req.system_efficiency.is_finite()
        && req.system_efficiency > 0.0
        && req.system_efficiency <= 1.0)
    {
        issues.push(ValidationIssue::new(
            "combined",
            "system_efficiency",
            "must be in (0.0, 1.0]".to_string(),
        ));
    }
    if !(req.total_area_m2.is_finite() && req.total_area_m2 >= 0.0) {
        issues.push(ValidationIssue::new(
            "combined",
            "total_area_m2",
            "must be >= 0".to_string(),
        ));
    }

    if req.ev_charging.is_none() && req.common_areas.is_none() && req.residential_units.is_none() {
        issues.push(ValidationIssue::new(
            "combined",
            "modules",
            "at least one module must be enabled".to_string(),
        ));
        return issues;
    }

    // Skip per-module area checks if the shared figures are unusable.
    if !issues.is_empty() {
        return issues;
    }

    let mut allocated = 0.0;

    if let Some(ev) = &req.ev_charging {
        check_panel(&mut issues, "ev_charging", &ev.panel);
        check_non_negative(&mut issues, "ev_charging", "area_m2", ev.area_m2);
        if !(0.0..=100.0).contains(&ev.charging_points_pct) {
            issues.push(ValidationIssue::new(
                "ev_charging",
                "charging_points_pct",
                "must be in [0, 100]".to_string(),
            ));
        }
        check_non_negative(
            &mut issues,
            "ev_charging",
            "energy_per_charge_kwh",
            ev.energy_per_charge_kwh,
        );
        check_non_negative(&mut issues, "ev_charging", "charges_per_day", ev.charges_per_day);
        check_non_negative(
            &mut issues,
            "ev_charging",
            "battery_capacity_kwh",
            ev.battery_capacity_kwh,
        );

        let required = ev_area_required(ev, req.solar_radiation, req.system_efficiency);
        check_module_area(&mut issues, "ev_charging", required, ev.area_m2);
        allocated += ev.area_m2;
    }

    if let Some(common) = &req.common_areas {
        check_panel(&mut issues, "common_areas", &common.panel);
        check_non_negative(&mut issues, "common_areas", "area_m2", common.area_m2);
        check_non_negative(
            &mut issues,
            "common_areas",
            "daily_consumption_kwh",
            common.daily_consumption_kwh,
        );
        check_non_negative(
            &mut issues,
            "common_areas",
            "critical_consumption_per_hour_kwh",
            common.critical_consumption_per_hour_kwh,
        );
        check_non_negative(
            &mut issues,
            "common_areas",
            "battery_capacity_kwh",
            common.battery_capacity_kwh,
        );

        let required = common_area_required(common, req.solar_radiation, req.system_efficiency);
        check_module_area(&mut issues, "common_areas", required, common.area_m2);
        allocated += common.area_m2;
    }

    if let Some(units) = &req.residential_units {
        check_panel(&mut issues, "residential_units", &units.panel);
        check_non_negative(&mut issues, "residential_units", "area_m2", units.area_m2);
        check_non_negative(
            &mut issues,
            "residential_units",
            "value_add_per_unit",
            units.value_add_per_unit,
        );
        if units.north_facing_units > units.total_units {
            issues.push(ValidationIssue::new(
                "residential_units",
                "north_facing_units",
                format!("must be <= total_units ({})", units.total_units),
            ));
        }

        let required = units_area_required(units);
        check_module_area(&mut issues, "residential_units", required, units.area_m2);
        allocated += units.area_m2;
    }

    if allocated > req.total_area_m2 + AREA_TOLERANCE_M2 {
        issues.push(ValidationIssue::new(
            "combined",
            "total_area_m2",
            format!(
                "allocated module area ({allocated:.2} m²) exceeds the total area ({:.2} m²)",
                req.total_area_m2
            ),
        ));
    }

    issues
}

fn check_non_negative(issues: &mut Vec<ValidationIssue>, module: &str, field: &str, value: f64) {
    if !(value.is_finite() && value >= 0.0) {
        issues.push(ValidationIssue::new(module, field, "must be >= 0".to_string()));
    }
}

fn check_panel(issues: &mut Vec<ValidationIssue>, module: &str, panel: &PanelSpec) {
    if !(panel.power_wp.is_finite() && panel.power_wp > 0.0) {
        issues.push(ValidationIssue::new(
            module,
            "panel.power_wp",
            "must be > 0".to_string(),
        ));
    }
    if !(panel.area_m2.is_finite() && panel.area_m2 > 0.0) {
        issues.push(ValidationIssue::new(
            module,
            "panel.area_m2",
            "must be > 0".to_string(),
        ));
    }
}

fn check_module_area(
    issues: &mut Vec<ValidationIssue>,
    module: &str,
    required_m2: f64,
    available_m2: f64,
) {
    if required_m2 > available_m2 + AREA_TOLERANCE_M2 {
        issues.push(ValidationIssue::new(
            module,
            "area_m2",
            format!(
                "insufficient area: {required_m2:.2} m² required, {available_m2:.2} m² available"
            ),
        ));
    }
}

fn ev_charging_points(ev: &EvChargingModule) -> u32 {
    (f64::from(ev.num_parking_spots) * ev.charging_points_pct / 100.0).floor() as u32
}

fn ev_daily_demand_kwh(ev: &EvChargingModule) -> f64 {
    f64::from(ev_charging_points(ev)) * ev.energy_per_charge_kwh * ev.charges_per_day
}

fn ev_panels(ev: &EvChargingModule, radiation: f64, efficiency: f64) -> u32 {
    let yield_kwh = energy_per_panel_kwh_day(ev.panel.power_wp, radiation, efficiency);
    panels_for_demand(ev_daily_demand_kwh(ev), yield_kwh)
}

fn ev_area_required(ev: &EvChargingModule, radiation: f64, efficiency: f64) -> f64 {
    f64::from(ev_panels(ev, radiation, efficiency)) * ev.panel.area_m2
}

fn common_panels(common: &CommonAreaModule, radiation: f64, efficiency: f64) -> u32 {
    let yield_kwh = energy_per_panel_kwh_day(common.panel.power_wp, radiation, efficiency);
    panels_for_demand(common.daily_consumption_kwh, yield_kwh)
}

fn common_area_required(common: &CommonAreaModule, radiation: f64, efficiency: f64) -> f64 {
    f64::from(common_panels(common, radiation, efficiency)) * common.panel.area_m2
}

fn units_panels(units: &ResidentialUnitsModule) -> u32 {
    units.north_facing_units * units.panels_per_unit
}

fn units_area_required(units: &ResidentialUnitsModule) -> f64 {
    f64::from(units_panels(units)) * units.panel.area_m2
}

/// Per-module slice of a combined outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleSummary {
    /// Module name (`"ev_charging"`, `"common_areas"`, `"residential_units"`).
    pub module: String,
    /// Panels installed by this module.
    pub num_panels: u32,
    /// Installed capacity (kWp).
    pub capacity_kwp: f64,
    /// Generation from this module's panels (kWh/day).
    pub daily_generation_kwh: f64,
    /// Battery bank carried by this module (kWh).
    pub battery_capacity_kwh: f64,
    /// Roof area allocated (m²).
    pub area_allocated_m2: f64,
    /// Roof area actually needed (m²).
    pub area_required_m2: f64,
}

/// Itemized financial close of a combined evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedFinancial {
    /// Panel line (R$).
    pub panels_cost: f64,
    /// Inverter line (R$).
    pub inverters_cost: f64,
    /// Installation line: share of the panel cost plus the fixed cost (R$).
    pub installation_cost: f64,
    /// Battery line (R$).
    pub batteries_cost: f64,
    /// Sum of all lines (R$).
    pub total_investment: f64,
    /// Annual savings at the grid tariff (R$).
    pub annual_economy: f64,
    /// Years to repay the investment; 0 when there are no savings.
    pub payback_years: f64,
    /// Annual savings as a percentage of the investment.
    pub roi_percentage: f64,
    /// Whether the payback lands in the plausible 2–20 year window.
    pub payback_plausible: bool,
}

/// Complete result of a combined evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedOutcome {
    /// Per-module summaries, in request order.
    pub modules: Vec<ModuleSummary>,
    /// Total panels across enabled modules.
    pub total_panels: u32,
    /// Total installed capacity (kWp).
    pub total_capacity_kwp: f64,
    /// Total generation (kWh/day).
    pub total_daily_generation_kwh: f64,
    /// Total battery capacity (kWh).
    pub total_battery_capacity_kwh: f64,
    /// EV charging points (when the EV module is enabled).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ev_charging_points: Option<u32>,
    /// Backup autonomy of the common-area battery (hours).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_autonomy_hours: Option<f64>,
    /// Property value added by equipped units (R$).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_value_add: Option<f64>,
    /// Itemized financial close.
    pub financial: CombinedFinancial,
}

/// Evaluates a combined request.
///
/// # Errors
///
/// Returns every [`ValidationIssue`] when the request does not validate;
/// nothing is computed in that case.
pub fn evaluate(
    req: &CombinedRequest,
    costs: &CostTable,
) -> Result<CombinedOutcome, Vec<ValidationIssue>> {
    let issues = validate(req);
    if !issues.is_empty() {
        return Err(issues);
    }

    let mut modules = Vec::new();
    let mut total_panels = 0_u32;
    let mut total_capacity_kwp = 0.0;
    let mut total_daily_generation_kwh = 0.0;
    let mut total_battery_capacity_kwh = 0.0;
    let mut ev_points = None;
    let mut backup_autonomy_hours = None;
    let mut property_value_add = None;

    if let Some(ev) = &req.ev_charging {
        let yield_kwh =
            energy_per_panel_kwh_day(ev.panel.power_wp, req.solar_radiation, req.system_efficiency);
        let num_panels = ev_panels(ev, req.solar_radiation, req.system_efficiency);
        let capacity_kwp = f64::from(num_panels) * ev.panel.power_wp / 1000.0;

        ev_points = Some(ev_charging_points(ev));
        total_panels += num_panels;
        total_capacity_kwp += capacity_kwp;
        total_daily_generation_kwh += f64::from(num_panels) * yield_kwh;
        total_battery_capacity_kwh += ev.battery_capacity_kwh;

        modules.push(ModuleSummary {
            module: "ev_charging".to_string(),
            num_panels,
            capacity_kwp,
            daily_generation_kwh: f64::from(num_panels) * yield_kwh,
            battery_capacity_kwh: ev.battery_capacity_kwh,
            area_allocated_m2: ev.area_m2,
            area_required_m2: f64::from(num_panels) * ev.panel.area_m2,
        });
    }

    if let Some(common) = &req.common_areas {
        let yield_kwh = energy_per_panel_kwh_day(
            common.panel.power_wp,
            req.solar_radiation,
            req.system_efficiency,
        );
        let num_panels = common_panels(common, req.solar_radiation, req.system_efficiency);
        let capacity_kwp = f64::from(num_panels) * common.panel.power_wp / 1000.0;

        backup_autonomy_hours = Some(if common.critical_consumption_per_hour_kwh > 0.0 {
            common.battery_capacity_kwh / common.critical_consumption_per_hour_kwh
        } else {
            0.0
        });
        total_panels += num_panels;
        total_capacity_kwp += capacity_kwp;
        total_daily_generation_kwh += f64::from(num_panels) * yield_kwh;
        total_battery_capacity_kwh += common.battery_capacity_kwh;

        modules.push(ModuleSummary {
            module: "common_areas".to_string(),
            num_panels,
            capacity_kwp,
            daily_generation_kwh: f64::from(num_panels) * yield_kwh,
            battery_capacity_kwh: common.battery_capacity_kwh,
            area_allocated_m2: common.area_m2,
            area_required_m2: f64::from(num_panels) * common.panel.area_m2,
        });
    }

    if let Some(units) = &req.residential_units {
        let yield_kwh = energy_per_panel_kwh_day(
            units.panel.power_wp,
            req.solar_radiation,
            req.system_efficiency,
        );
        let num_panels = units_panels(units);
        let capacity_kwp = f64::from(num_panels) * units.panel.power_wp / 1000.0;

        property_value_add = Some(f64::from(units.north_facing_units) * units.value_add_per_unit);
        total_panels += num_panels;
        total_capacity_kwp += capacity_kwp;
        total_daily_generation_kwh += f64::from(num_panels) * yield_kwh;

        modules.push(ModuleSummary {
            module: "residential_units".to_string(),
            num_panels,
            capacity_kwp,
            daily_generation_kwh: f64::from(num_panels) * yield_kwh,
            battery_capacity_kwh: 0.0,
            area_allocated_m2: units.area_m2,
            area_required_m2: f64::from(num_panels) * units.panel.area_m2,
        });
    }

    let panels_cost = total_capacity_kwp * 1000.0 * costs.panel_cost_per_wp;
    let inverters_cost = total_capacity_kwp * 1000.0 * costs.inverter_cost_per_wp;
    let installation_cost = panels_cost * costs.installation_pct + costs.installation_fixed;
    let batteries_cost = total_battery_capacity_kwh * costs.battery_cost_per_kwh;
    let total_investment = panels_cost + inverters_cost + installation_cost + batteries_cost;
    let annual_economy = total_daily_generation_kwh * DAYS_PER_YEAR * costs.tariff_per_kwh;
    let payback = payback_years(total_investment, annual_economy);

    Ok(CombinedOutcome {
        modules,
        total_panels,
        total_capacity_kwp,
        total_daily_generation_kwh,
        total_battery_capacity_kwh,
        ev_charging_points: ev_points,
        backup_autonomy_hours,
        property_value_add,
        financial: CombinedFinancial {
            panels_cost,
            inverters_cost,
            installation_cost,
            batteries_cost,
            total_investment,
            annual_economy,
            payback_years: payback,
            roi_percentage: roi_percentage(total_investment, annual_economy),
            payback_plausible: (PAYBACK_PLAUSIBLE_RANGE.0..=PAYBACK_PLAUSIBLE_RANGE.1)
                .contains(&payback),
        },
    })
}
