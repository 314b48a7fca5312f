//! Panel-count sizing under an optional roof-area constraint.

use serde::Serialize;

use super::error::CalcError;

/// Fixed real-world loss factor applied to every energy-per-panel figure.
pub const PERFORMANCE_DERATE: f64 = 0.90;

/// Days used to annualize daily energy figures.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Inputs to a single sizing pass.
///
/// `available_area_m2 = None` means the scenario carries no area constraint
/// (EV-charging and common-area systems mount wherever the carports or
/// service roofs allow).
#[derive(Debug, Clone, PartialEq)]
pub struct SizingInput {
    /// Demand to cover (kWh/day).
    pub daily_consumption_kwh: f64,
    /// Roof area available for panels (m²), if constrained.
    pub available_area_m2: Option<f64>,
    /// Nameplate panel power (Wp).
    pub panel_power_wp: f64,
    /// Footprint per panel (m²).
    pub panel_area_m2: f64,
    /// Mean solar radiation (kWh/m²/day).
    pub solar_radiation: f64,
    /// Overall system efficiency, in `(0, 1]`.
    pub system_efficiency: f64,
}

/// Result of a sizing pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizingResult {
    /// Number of panels installed.
    pub num_panels: u32,
    /// Installed power, `num_panels * panel_power_wp` (Wp).
    pub installed_power_wp: f64,
    /// Roof area taken by the installed panels (m²).
    pub required_area_m2: f64,
    /// Annual generation from the installed panels (kWh/year).
    pub annual_generation_kwh: f64,
    /// Generation as a percentage of annual demand; 0 when demand is zero.
    pub coverage_pct: f64,
    /// Whether the available area fit the unclamped panel count.
    pub area_sufficient: bool,
}

/// Daily energy yield of one panel (kWh/day), derated for real-world losses.
pub fn energy_per_panel_kwh_day(
    panel_power_wp: f64,
    solar_radiation: f64,
    system_efficiency: f64,
) -> f64 {
    panel_power_wp / 1000.0 * solar_radiation * system_efficiency * PERFORMANCE_DERATE
}

/// Panels needed to meet a daily demand given a per-panel daily yield.
///
/// Returns 0 when the yield is not positive, so callers never divide by a
/// zero yield.
pub fn panels_for_demand(daily_demand_kwh: f64, energy_per_panel_kwh_day: f64) -> u32 {
    if energy_per_panel_kwh_day <= 0.0 || daily_demand_kwh <= 0.0 {
        return 0;
    }
    (daily_demand_kwh / energy_per_panel_kwh_day).ceil() as u32
}

/// Sizes a system for the given demand, clamping to the available area when
/// the unconstrained panel count does not fit.
///
/// Installed power and generation are always derived from the final panel
/// count, in both the sufficient and the clamped branch; coverage can
/// therefore exceed 100% by the ceiling-rounding margin when area permits,
/// and fall below it when the clamp engages.
///
/// # Errors
///
/// `InvalidParameter` when radiation, panel power, or panel area is not
/// positive, the efficiency is outside `(0, 1]`, or the demand or available
/// area is negative. All checks run before any division.
pub fn size(input: &SizingInput) -> Result<SizingResult, CalcError> {
    validate(input)?;

    let required_power_wp = input.daily_consumption_kwh / input.solar_radiation * 1000.0;
    let mut num_panels = (required_power_wp / input.panel_power_wp).ceil() as u32;
    let mut area_sufficient = true;

    if let Some(available) = input.available_area_m2 {
        let required_area = f64::from(num_panels) * input.panel_area_m2;
        if required_area > available {
            num_panels = (available / input.panel_area_m2).floor() as u32;
            area_sufficient = false;
        }
    }

    let installed_power_wp = f64::from(num_panels) * input.panel_power_wp;
    let required_area_m2 = f64::from(num_panels) * input.panel_area_m2;
    let annual_generation_kwh = installed_power_wp / 1000.0 * input.solar_radiation * DAYS_PER_YEAR;

    let annual_consumption_kwh = input.daily_consumption_kwh * DAYS_PER_YEAR;
    let coverage_pct = if annual_consumption_kwh > 0.0 {
        annual_generation_kwh / annual_consumption_kwh * 100.0
    } else {
        0.0
    };

    Ok(SizingResult {
        num_panels,
        installed_power_wp,
        required_area_m2,
        annual_generation_kwh,
        coverage_pct,
        area_sufficient,
    })
}

fn validate(input: &SizingInput) -> Result<(), CalcError> {
    if !(input.solar_radiation.is_finite() && input.solar_radiation > 0.0) {
        return Err(CalcError::invalid("solar_radiation", "must be > 0"));
    }
    if !(input.panel_power_wp.is_finite() && input.panel_power_wp > 0.0) {
        return Err(CalcError::invalid("panel_power_wp", "must be > 0"));
    }
    if !(input.panel_area_m2.is_finite() && input.panel_area_m2 > 0.0) {
        return Err(CalcError::invalid("panel_area_m2", "must be > 0"));
    }
    if !(input.system_efficiency.is_finite()
        && input.system_efficiency > 0.0
        && input.system_efficiency <= 1.0)
    {
        return Err(CalcError::invalid("system_efficiency", "must be in (0, 1]"));
    }
    if !(input.daily_consumption_kwh.is_finite() && input.daily_consumption_kwh >= 0.0) {
        return Err(CalcError::invalid("daily_consumption_kwh", "must be >= 0"));
    }
    if let Some(area) = input.available_area_m2 {
        if !(area.is_finite() && area >= 0.0) {
            return Err(CalcError::invalid("available_area_m2", "must be >= 0"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(daily_kwh: f64, area: Option<f64>) -> SizingInput {
        SizingInput {
            daily_consumption_kwh: daily_kwh,
            available_area_m2: area,
            panel_power_wp: 550.0,
            panel_area_m2: 2.1,
            solar_radiation: 5.5,
            system_efficiency: 0.80,
        }
    }

    #[test]
    fn unconstrained_sizing_matches_ceiling_division() {
        // 394.52 kWh/day -> required 71730.9 Wp -> ceil(130.4) = 131 panels
        let result = size(&input(394.52, None)).expect("valid input");
        assert_eq!(result.num_panels, 131);
        assert_eq!(result.installed_power_wp, 131.0 * 550.0);
        assert!(result.area_sufficient);
    }

    #[test]
    fn clamps_to_available_area() {
        // Residential reference case: 131 panels need 275.1 m², only 200 m²
        // available -> floor(200 / 2.1) = 95 panels, 52 250 Wp.
        let result = size(&input(394.52, Some(200.0))).expect("valid input");
        assert_eq!(result.num_panels, 95);
        assert!(!result.area_sufficient);
        assert!((result.installed_power_wp - 52_250.0).abs() < 1e-9);
        assert!((result.required_area_m2 - 199.5).abs() < 1e-9);
        // 52.25 kWp * 5.5 * 365 = 104 891.875 kWh/yr
        assert!((result.annual_generation_kwh - 104_891.875).abs() < 1e-6);
        assert!(result.coverage_pct < 100.0);
    }

    #[test]
    fn sufficient_area_keeps_ceiling_count() {
        let result = size(&input(394.52, Some(300.0))).expect("valid input");
        assert_eq!(result.num_panels, 131);
        assert!(result.area_sufficient);
        // Ceiling rounding makes generation slightly exceed demand.
        assert!(result.coverage_pct >= 100.0);
    }

    #[test]
    fn generation_derived_from_final_panel_count_in_both_branches() {
        for area in [None, Some(200.0), Some(300.0)] {
            let result = size(&input(394.52, area)).expect("valid input");
            let expected =
                result.installed_power_wp / 1000.0 * 5.5 * DAYS_PER_YEAR;
            assert!((result.annual_generation_kwh - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_demand_sizes_zero_panels() {
        let result = size(&input(0.0, Some(200.0))).expect("valid input");
        assert_eq!(result.num_panels, 0);
        assert_eq!(result.annual_generation_kwh, 0.0);
        assert_eq!(result.coverage_pct, 0.0);
        assert!(result.area_sufficient);
    }

    #[test]
    fn monotonic_in_demand_when_unconstrained() {
        let mut last = 0;
        for step in 0..50 {
            let daily = f64::from(step) * 7.3;
            let result = size(&input(daily, None)).expect("valid input");
            assert!(result.num_panels >= last, "panel count must not decrease");
            last = result.num_panels;
        }
    }

    #[test]
    fn clamped_count_never_exceeds_unclamped() {
        let unclamped = size(&input(394.52, None)).expect("valid input");
        let clamped = size(&input(394.52, Some(200.0))).expect("valid input");
        assert!(clamped.num_panels <= unclamped.num_panels);
    }

    #[test]
    fn rejects_non_positive_radiation() {
        let mut bad = input(100.0, None);
        bad.solar_radiation = 0.0;
        let err = size(&bad).unwrap_err();
        assert!(matches!(
            err,
            CalcError::InvalidParameter { field, .. } if field == "solar_radiation"
        ));
    }

    #[test]
    fn rejects_out_of_range_efficiency() {
        let mut bad = input(100.0, None);
        bad.system_efficiency = 1.2;
        assert!(size(&bad).is_err());
        bad.system_efficiency = 0.0;
        assert!(size(&bad).is_err());
    }

    #[test]
    fn rejects_negative_demand() {
        assert!(size(&input(-1.0, None)).is_err());
    }

    #[test]
    fn energy_per_panel_applies_derate() {
        // 550 Wp at 5.5 kWh/m²/day and 80% efficiency: 0.55 * 5.5 * 0.8 * 0.9
        let e = energy_per_panel_kwh_day(550.0, 5.5, 0.80);
        assert!((e - 2.178).abs() < 1e-9);
    }

    #[test]
    fn panels_for_demand_guards_zero_yield() {
        assert_eq!(panels_for_demand(288.0, 0.0), 0);
        assert_eq!(panels_for_demand(288.0, -1.0), 0);
        assert_eq!(panels_for_demand(0.0, 2.178), 0);
        assert_eq!(panels_for_demand(288.0, 2.178), 133);
    }

    #[test]
    fn idempotent_for_identical_inputs() {
        let a = size(&input(394.52, Some(200.0))).expect("valid input");
        let b = size(&input(394.52, Some(200.0))).expect("valid input");
        assert_eq!(a, b);
    }
}
