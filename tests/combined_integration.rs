//! Integration tests for the combined multi-module evaluator.

use solsize::config::{CostTable, EngineConfig};
use solsize::engine::combined::{
    CombinedRequest, CommonAreaModule, EvChargingModule, ResidentialUnitsModule, evaluate,
    validate,
};
use solsize::io::export::write_csv;
use solsize::report::combined_rows;

#[test]
fn baseline_evaluates_with_all_modules() {
    let outcome = evaluate(&CombinedRequest::baseline(), &CostTable::default())
        .expect("baseline should evaluate");

    assert_eq!(outcome.modules.len(), 3);
    assert_eq!(outcome.ev_charging_points, Some(16));
    // EV 133 + common 33 + units 80 panels at 2.178 kWh/panel/day
    assert_eq!(outcome.total_panels, 246);
    assert!((outcome.total_daily_generation_kwh - 246.0 * 2.178).abs() < 1e-9);
    assert!((outcome.total_battery_capacity_kwh - 100.0).abs() < 1e-9);
}

#[test]
fn investment_is_sum_of_itemized_lines() {
    let costs = CostTable::default();
    let outcome = evaluate(&CombinedRequest::baseline(), &costs).expect("baseline evaluates");
    let f = &outcome.financial;

    let kwp = outcome.total_capacity_kwp;
    assert!((f.panels_cost - kwp * 1000.0 * costs.panel_cost_per_wp).abs() < 1e-6);
    assert!((f.inverters_cost - kwp * 1000.0 * costs.inverter_cost_per_wp).abs() < 1e-6);
    assert!(
        (f.installation_cost - (f.panels_cost * costs.installation_pct + costs.installation_fixed))
            .abs()
            < 1e-6
    );
    assert!(
        (f.batteries_cost - outcome.total_battery_capacity_kwh * costs.battery_cost_per_kwh).abs()
            < 1e-6
    );
    assert!(
        (f.total_investment
            - (f.panels_cost + f.inverters_cost + f.installation_cost + f.batteries_cost))
            .abs()
            < 1e-6
    );
}

#[test]
fn economy_prices_generation_at_the_tariff() {
    let costs = CostTable::default();
    let outcome = evaluate(&CombinedRequest::baseline(), &costs).expect("baseline evaluates");
    let expected = outcome.total_daily_generation_kwh * 365.0 * costs.tariff_per_kwh;
    assert!((outcome.financial.annual_economy - expected).abs() < 1e-6);
}

#[test]
fn module_area_overrun_blocks_evaluation() {
    let mut req = CombinedRequest::baseline();
    if let Some(common) = req.common_areas.as_mut() {
        // 33 panels need 69.3 m²
        common.area_m2 = 50.0;
    }

    let issues = evaluate(&req, &CostTable::default()).expect_err("overrun must fail");
    assert!(
        issues
            .iter()
            .any(|i| i.module == "common_areas" && i.field == "area_m2")
    );
    let text = issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    assert!(text.contains("insufficient area"));
}

#[test]
fn total_allocation_cannot_exceed_development_area() {
    let mut req = CombinedRequest::baseline();
    // modules allocate 350 + 350 + 168 = 868 m²
    req.total_area_m2 = 800.0;

    let issues = validate(&req);
    assert!(
        issues
            .iter()
            .any(|i| i.module == "combined" && i.field == "total_area_m2")
    );
}

#[test]
fn disabled_modules_do_not_contribute() {
    let full = evaluate(&CombinedRequest::baseline(), &CostTable::default())
        .expect("baseline evaluates");

    let ev_only = CombinedRequest {
        ev_charging: Some(EvChargingModule::default()),
        ..CombinedRequest::default()
    };
    let outcome = evaluate(&ev_only, &CostTable::default()).expect("single module evaluates");

    assert_eq!(outcome.modules.len(), 1);
    assert!(outcome.total_panels < full.total_panels);
    assert_eq!(outcome.backup_autonomy_hours, None);
    assert_eq!(outcome.property_value_add, None);
}

#[test]
fn units_module_reports_property_value() {
    let req = CombinedRequest {
        residential_units: Some(ResidentialUnitsModule::default()),
        ..CombinedRequest::default()
    };
    let outcome = evaluate(&req, &CostTable::default()).expect("units module evaluates");

    // 40 north-facing units * 2 panels
    assert_eq!(outcome.total_panels, 80);
    // 40 units * R$ 15 000
    assert_eq!(outcome.property_value_add, Some(600_000.0));
    assert_eq!(outcome.total_battery_capacity_kwh, 0.0);
}

#[test]
fn custom_cost_table_flows_through() {
    let costs = CostTable {
        panel_cost_per_wp: 8.0,
        inverter_cost_per_wp: 1.0,
        installation_fixed: 5_000.0,
        tariff_per_kwh: 0.75,
        ..CostTable::default()
    };
    let req = CombinedRequest {
        common_areas: Some(CommonAreaModule::default()),
        ..CombinedRequest::default()
    };
    let outcome = evaluate(&req, &costs).expect("evaluates");
    let f = &outcome.financial;
    let kwp = outcome.total_capacity_kwp;
    assert!((f.panels_cost - kwp * 1000.0 * 8.0).abs() < 1e-6);
    assert!((f.inverters_cost - kwp * 1000.0 * 1.0).abs() < 1e-6);
    assert!((f.installation_cost - (f.panels_cost * 0.10 + 5_000.0)).abs() < 1e-6);
}

#[test]
fn combined_report_rows_export_to_csv() {
    let config = EngineConfig::default();
    let outcome =
        evaluate(&CombinedRequest::baseline(), &config.costs).expect("baseline evaluates");
    let rows = combined_rows(&outcome);

    let mut buf = Vec::new();
    write_csv(&rows, &mut buf).expect("csv export should succeed");
    let csv = String::from_utf8(buf).expect("csv output should be valid UTF-8");
    assert_eq!(csv.lines().next(), Some("parameter,value"));
    assert_eq!(csv.lines().count(), rows.len() + 1);
}

#[test]
fn evaluation_is_deterministic() {
    let costs = CostTable::default();
    let a = evaluate(&CombinedRequest::baseline(), &costs);
    let b = evaluate(&CombinedRequest::baseline(), &costs);
    assert_eq!(a, b);
}
