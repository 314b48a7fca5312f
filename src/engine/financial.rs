//! Investment, savings, payback, and projection math.
//!
//! The cost model is a per-scenario strategy over one explicit cost table:
//! grid-tie scenarios price the system flat at scenario cost-per-Wp, while
//! storage-backed scenarios add a battery line and pick their savings basis
//! (tariff offset or EV charging margin).

use serde::Serialize;

use crate::config::CostTable;

/// How a storage-backed scenario turns energy into annual savings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavingsBasis {
    /// Consumption no longer bought from the grid, priced at the tariff.
    TariffOffset,
    /// Charging revenue minus the grid-equivalent cost of the same energy.
    ChargingMargin,
}

/// Cost strategy selected by scenario type.
#[derive(Debug, Clone, PartialEq)]
pub enum CostModel {
    /// Flat installed-power pricing, no storage line.
    GridTie {
        /// All-in cost per installed Wp.
        cost_per_wp: f64,
    },
    /// Installed-power pricing plus a battery bank.
    WithStorage {
        /// All-in cost per installed Wp.
        cost_per_wp: f64,
        /// Battery bank size (kWh).
        battery_capacity_kwh: f64,
        /// Savings basis for the annual figure.
        basis: SavingsBasis,
    },
}

/// Financial outcome of one calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialBreakdown {
    /// Full up-front investment.
    pub total_investment: f64,
    /// Annual savings (or charging margin).
    pub annual_savings: f64,
    /// Years for cumulative savings to repay the investment; 0 when there
    /// are no savings.
    pub payback_years: f64,
    /// Annual savings as a percentage of the investment; 0 when there is no
    /// investment.
    pub roi_percentage: f64,
    /// Cost per Wp used for the system line.
    pub cost_per_wp: f64,
    /// Panel-system share of the investment (storage scenarios only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_cost: Option<f64>,
    /// Battery share of the investment (storage scenarios only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_cost: Option<f64>,
    /// Gross charging revenue (EV-charging only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_revenue: Option<f64>,
}

impl CostModel {
    /// Prices the installed system and derives savings, payback, and ROI.
    pub fn analyze(
        &self,
        installed_power_wp: f64,
        annual_generation_kwh: f64,
        annual_consumption_kwh: f64,
        costs: &CostTable,
    ) -> FinancialBreakdown {
        match *self {
            Self::GridTie { cost_per_wp } => {
                let total_investment = installed_power_wp * cost_per_wp;
                let annual_savings = annual_generation_kwh * costs.tariff_per_kwh;
                FinancialBreakdown {
                    total_investment,
                    annual_savings,
                    payback_years: payback_years(total_investment, annual_savings),
                    roi_percentage: roi_percentage(total_investment, annual_savings),
                    cost_per_wp,
                    system_cost: None,
                    battery_cost: None,
                    annual_revenue: None,
                }
            }
            Self::WithStorage {
                cost_per_wp,
                battery_capacity_kwh,
                basis,
            } => {
                let system_cost = installed_power_wp * cost_per_wp;
                let battery_cost = battery_capacity_kwh * costs.battery_cost_per_kwh;
                let total_investment = system_cost + battery_cost;

                let (annual_savings, annual_revenue) = match basis {
                    SavingsBasis::TariffOffset => {
                        (annual_consumption_kwh * costs.tariff_per_kwh, None)
                    }
                    SavingsBasis::ChargingMargin => {
                        let revenue =
                            annual_consumption_kwh * costs.ev_charging_price_per_kwh;
                        let grid_cost = annual_consumption_kwh * costs.tariff_per_kwh;
                        (revenue - grid_cost, Some(revenue))
                    }
                };

                FinancialBreakdown {
                    total_investment,
                    annual_savings,
                    payback_years: payback_years(total_investment, annual_savings),
                    roi_percentage: roi_percentage(total_investment, annual_savings),
                    cost_per_wp,
                    system_cost: Some(system_cost),
                    battery_cost: Some(battery_cost),
                    annual_revenue,
                }
            }
        }
    }
}

/// Payback period in years; 0 when there are no savings to repay with.
pub fn payback_years(total_investment: f64, annual_savings: f64) -> f64 {
    if annual_savings > 0.0 {
        total_investment / annual_savings
    } else {
        0.0
    }
}

/// Annual savings as a percentage of the investment; 0 for a free system.
pub fn roi_percentage(total_investment: f64, annual_savings: f64) -> f64 {
    if total_investment > 0.0 {
        annual_savings / total_investment * 100.0
    } else {
        0.0
    }
}

/// Lifetime financial metrics for a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialMetrics {
    /// Annualized ROI (%).
    pub roi_annual_pct: f64,
    /// Net-profit ROI over the whole project lifetime (%).
    pub roi_project_pct: f64,
    /// Payback period in months.
    pub payback_months: f64,
    /// Undiscounted savings over the project lifetime.
    pub total_savings: f64,
    /// Lifetime savings minus the up-front investment.
    pub net_profit: f64,
}

/// Computes lifetime metrics from the first-year figures.
pub fn project_metrics(
    total_investment: f64,
    annual_savings: f64,
    project_years: u32,
) -> FinancialMetrics {
    let total_savings = annual_savings * f64::from(project_years);
    let net_profit = total_savings - total_investment;
    let roi_project_pct = if total_investment > 0.0 {
        net_profit / total_investment * 100.0
    } else {
        0.0
    };
    FinancialMetrics {
        roi_annual_pct: roi_percentage(total_investment, annual_savings),
        roi_project_pct,
        payback_months: payback_years(total_investment, annual_savings) * 12.0,
        total_savings,
        net_profit,
    }
}

/// One year of the cash-flow projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearCashFlow {
    /// Project year, starting at 1.
    pub year: u32,
    /// Savings realized in this year, after tariff escalation.
    pub savings: f64,
    /// Cumulative position including the up-front investment.
    pub accumulated: f64,
}

/// Annual cash flow with year-over-year tariff escalation.
///
/// Year 1 starts from `-total_investment`; each following year escalates the
/// savings by `tariff_increase` (e.g. `0.08` for 8%/year).
pub fn annual_cash_flow(
    total_investment: f64,
    annual_savings: f64,
    years: u32,
    tariff_increase: f64,
) -> Vec<YearCashFlow> {
    let mut flows = Vec::with_capacity(years as usize);
    let mut accumulated = -total_investment;
    for year in 1..=years {
        let savings = annual_savings * (1.0 + tariff_increase).powi(year as i32 - 1);
        accumulated += savings;
        flows.push(YearCashFlow {
            year,
            savings,
            accumulated,
        });
    }
    flows
}

/// One month of the near-term cash-flow projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCashFlow {
    /// Project month, starting at 1.
    pub month: u32,
    /// Net flow for the month (savings minus any investment outlay).
    pub monthly_flow: f64,
    /// Cumulative position.
    pub accumulated: f64,
}

/// Monthly cash flow over the first `months` months.
///
/// The full investment lands in month 1; every month contributes the same
/// savings figure.
pub fn monthly_cash_flow(
    total_investment: f64,
    monthly_savings: f64,
    months: u32,
) -> Vec<MonthCashFlow> {
    let mut flows = Vec::with_capacity(months as usize);
    let mut accumulated = 0.0;
    for month in 1..=months {
        let investment = if month == 1 { total_investment } else { 0.0 };
        let monthly_flow = monthly_savings - investment;
        accumulated += monthly_flow;
        flows.push(MonthCashFlow {
            month,
            monthly_flow,
            accumulated,
        });
    }
    flows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn costs() -> CostTable {
        CostTable::default()
    }

    #[test]
    fn grid_tie_prices_flat() {
        let model = CostModel::GridTie { cost_per_wp: 4.5 };
        let result = model.analyze(52_250.0, 104_891.875, 144_000.0, &costs());

        assert!((result.total_investment - 235_125.0).abs() < 1e-9);
        // savings = generation * 0.65
        assert!((result.annual_savings - 68_179.718_75).abs() < 1e-6);
        assert!(result.system_cost.is_none());
        assert!(result.battery_cost.is_none());
    }

    #[test]
    fn storage_model_adds_battery_line() {
        let model = CostModel::WithStorage {
            cost_per_wp: 4.5,
            battery_capacity_kwh: 345.6,
            basis: SavingsBasis::ChargingMargin,
        };
        let result = model.analyze(52_800.0, 0.0, 105_120.0, &costs());

        // system 52 800 * 4.5 = 237 600; battery 345.6 * 800 = 276 480
        assert_eq!(result.system_cost, Some(237_600.0));
        assert!((result.battery_cost.unwrap_or(0.0) - 276_480.0).abs() < 1e-6);
        assert!((result.total_investment - 514_080.0).abs() < 1e-6);
        // margin = 105 120 * (0.80 - 0.65) = 15 768
        assert!((result.annual_savings - 15_768.0).abs() < 1e-6);
        assert!((result.annual_revenue.unwrap_or(0.0) - 84_096.0).abs() < 1e-6);
    }

    #[test]
    fn tariff_offset_uses_consumption() {
        let model = CostModel::WithStorage {
            cost_per_wp: 4.5,
            battery_capacity_kwh: 36.48,
            basis: SavingsBasis::TariffOffset,
        };
        let result = model.analyze(10_000.0, 0.0, 25_550.0, &costs());
        assert!((result.annual_savings - 25_550.0 * 0.65).abs() < 1e-9);
        assert!(result.annual_revenue.is_none());
    }

    #[test]
    fn payback_zero_when_no_savings() {
        assert_eq!(payback_years(100_000.0, 0.0), 0.0);
        assert_eq!(payback_years(100_000.0, -5.0), 0.0);
        assert!((payback_years(100_000.0, 20_000.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn roi_zero_for_free_system() {
        assert_eq!(roi_percentage(0.0, 5_000.0), 0.0);
        assert!((roi_percentage(200_000.0, 20_000.0) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn roi_identity_holds() {
        let model = CostModel::GridTie { cost_per_wp: 4.0 };
        let result = model.analyze(30_000.0, 60_000.0, 60_000.0, &costs());
        let expected = 100.0 * result.annual_savings / result.total_investment;
        assert!((result.roi_percentage - expected).abs() < 1e-9);
    }

    #[test]
    fn project_metrics_over_lifetime() {
        let m = project_metrics(100_000.0, 20_000.0, 25);
        assert!((m.roi_annual_pct - 20.0).abs() < 1e-12);
        assert!((m.total_savings - 500_000.0).abs() < 1e-9);
        assert!((m.net_profit - 400_000.0).abs() < 1e-9);
        assert!((m.roi_project_pct - 400.0).abs() < 1e-9);
        assert!((m.payback_months - 60.0).abs() < 1e-9);
    }

    #[test]
    fn annual_cash_flow_escalates_and_crosses_zero_at_payback() {
        // 5-year payback with no escalation: accumulated hits 0 exactly at year 5
        let flows = annual_cash_flow(100_000.0, 20_000.0, 10, 0.0);
        assert_eq!(flows.len(), 10);
        assert!((flows[4].accumulated).abs() < 1e-9);
        assert!(flows[3].accumulated < 0.0);
        assert!(flows[5].accumulated > 0.0);

        // 8% escalation grows each year's savings
        let escalated = annual_cash_flow(100_000.0, 20_000.0, 3, 0.08);
        assert!((escalated[0].savings - 20_000.0).abs() < 1e-9);
        assert!((escalated[1].savings - 21_600.0).abs() < 1e-9);
        assert!((escalated[2].savings - 23_328.0).abs() < 1e-9);
    }

    #[test]
    fn monthly_cash_flow_front_loads_investment() {
        let flows = monthly_cash_flow(24_000.0, 1_000.0, 24);
        assert_eq!(flows.len(), 24);
        assert!((flows[0].monthly_flow + 23_000.0).abs() < 1e-9);
        assert!((flows[23].accumulated).abs() < 1e-9);
    }
}
