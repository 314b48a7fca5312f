//! Flat parameter/value rows for tabular output.
//!
//! The host's table and document renderers consume outcomes as an ordered
//! list of labelled values; this module is the only place that turns engine
//! records into display strings.

use crate::engine::combined::CombinedOutcome;
use crate::engine::CalculationOutcome;

/// One labelled value of a result table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// Display label.
    pub parameter: String,
    /// Formatted value.
    pub value: String,
}

impl ReportRow {
    fn new(parameter: &str, value: String) -> Self {
        Self {
            parameter: parameter.to_string(),
            value,
        }
    }
}

/// Flattens a per-scenario outcome into report rows.
pub fn scenario_rows(outcome: &CalculationOutcome) -> Vec<ReportRow> {
    let r = &outcome.results;
    let f = &outcome.financial_analysis;
    let t = &outcome.technical_specs;

    let mut rows = vec![
        ReportRow::new("Scenario", outcome.scenario.to_string()),
        ReportRow::new("Number of panels", r.num_panels.to_string()),
        ReportRow::new(
            "Installed power",
            format!("{:.2} kWp", r.installed_power_wp / 1000.0),
        ),
        ReportRow::new("Required area", format!("{:.2} m²", r.required_area_m2)),
        ReportRow::new(
            "Daily consumption",
            format!("{:.2} kWh/day", r.daily_consumption_kwh),
        ),
        ReportRow::new(
            "Annual generation",
            format!("{:.2} kWh/year", r.annual_generation_kwh),
        ),
        ReportRow::new("Coverage", format!("{:.1}%", r.coverage_pct)),
    ];

    if let Some(sufficient) = r.area_sufficient {
        rows.push(ReportRow::new(
            "Area sufficient",
            if sufficient { "yes" } else { "no" }.to_string(),
        ));
    }
    if let Some(points) = r.num_charging_points {
        rows.push(ReportRow::new("Charging points", points.to_string()));
    }
    if let Some(capacity) = r.battery_capacity_kwh {
        rows.push(ReportRow::new(
            "Battery capacity",
            format!("{capacity:.2} kWh"),
        ));
    }
    if let Some(hours) = r.backup_hours {
        rows.push(ReportRow::new("Backup window", format!("{hours:.1} h")));
    }

    rows.push(ReportRow::new(
        "Solar radiation",
        format!("{:.2} kWh/m²/day", t.solar_radiation),
    ));
    rows.push(ReportRow::new(
        "System efficiency",
        format!("{:.0}%", t.system_efficiency * 100.0),
    ));

    if let Some(system) = f.system_cost {
        rows.push(ReportRow::new("System cost", format!("R$ {system:.2}")));
    }
    if let Some(battery) = f.battery_cost {
        rows.push(ReportRow::new("Battery cost", format!("R$ {battery:.2}")));
    }
    rows.push(ReportRow::new(
        "Total investment",
        format!("R$ {:.2}", f.total_investment),
    ));
    if let Some(revenue) = f.annual_revenue {
        rows.push(ReportRow::new("Annual revenue", format!("R$ {revenue:.2}")));
    }
    rows.push(ReportRow::new(
        "Annual savings",
        format!("R$ {:.2}", f.annual_savings),
    ));
    rows.push(ReportRow::new(
        "Payback",
        format!("{:.2} years", f.payback_years),
    ));
    rows.push(ReportRow::new("ROI", format!("{:.1}%", f.roi_percentage)));

    let p = &outcome.projection;
    rows.push(ReportRow::new(
        "Lifetime savings",
        format!("R$ {:.2}", p.total_savings),
    ));
    rows.push(ReportRow::new(
        "Net profit",
        format!("R$ {:.2}", p.net_profit),
    ));
    rows.push(ReportRow::new(
        "Lifetime ROI",
        format!("{:.1}%", p.roi_project_pct),
    ));

    rows
}

/// Flattens a combined outcome into report rows.
pub fn combined_rows(outcome: &CombinedOutcome) -> Vec<ReportRow> {
    let mut rows = Vec::new();

    for m in &outcome.modules {
        rows.push(ReportRow::new(
            &format!("Panels ({})", m.module),
            m.num_panels.to_string(),
        ));
        rows.push(ReportRow::new(
            &format!("Capacity ({})", m.module),
            format!("{:.2} kWp", m.capacity_kwp),
        ));
    }

    if let Some(points) = outcome.ev_charging_points {
        rows.push(ReportRow::new("Charging points", points.to_string()));
    }
    if let Some(hours) = outcome.backup_autonomy_hours {
        rows.push(ReportRow::new("Backup autonomy", format!("{hours:.1} h")));
    }
    if let Some(value) = outcome.property_value_add {
        rows.push(ReportRow::new("Property value add", format!("R$ {value:.2}")));
    }

    rows.push(ReportRow::new(
        "Total panels",
        outcome.total_panels.to_string(),
    ));
    rows.push(ReportRow::new(
        "Total capacity",
        format!("{:.2} kWp", outcome.total_capacity_kwp),
    ));
    rows.push(ReportRow::new(
        "Daily generation",
        format!("{:.2} kWh/day", outcome.total_daily_generation_kwh),
    ));
    rows.push(ReportRow::new(
        "Battery capacity",
        format!("{:.2} kWh", outcome.total_battery_capacity_kwh),
    ));

    let f = &outcome.financial;
    rows.push(ReportRow::new("Panels cost", format!("R$ {:.2}", f.panels_cost)));
    rows.push(ReportRow::new(
        "Inverters cost",
        format!("R$ {:.2}", f.inverters_cost),
    ));
    rows.push(ReportRow::new(
        "Installation cost",
        format!("R$ {:.2}", f.installation_cost),
    ));
    rows.push(ReportRow::new(
        "Batteries cost",
        format!("R$ {:.2}", f.batteries_cost),
    ));
    rows.push(ReportRow::new(
        "Total investment",
        format!("R$ {:.2}", f.total_investment),
    ));
    rows.push(ReportRow::new(
        "Annual economy",
        format!("R$ {:.2}", f.annual_economy),
    ));
    rows.push(ReportRow::new(
        "Payback",
        format!("{:.2} years", f.payback_years),
    ));
    rows.push(ReportRow::new("ROI", format!("{:.1}%", f.roi_percentage)));

    rows
}
