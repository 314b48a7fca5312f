//! solsize entry point — CLI wiring and config-driven calculation runs.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process;

use serde::Deserialize;

use solsize::config::{EngineConfig, TechnicalDefaults};
use solsize::engine::combined::{self, CombinedRequest};
use solsize::engine::{ParameterMap, ScenarioKind, calculate};
use solsize::io::export::export_csv;
use solsize::report::{ReportRow, combined_rows, scenario_rows};

/// Parsed CLI arguments.
struct CliArgs {
    input_path: Option<String>,
    preset: Option<String>,
    config_path: Option<String>,
    state_code: Option<String>,
    report_out: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

/// Run request parsed from a TOML input file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RunRequest {
    /// Scenario wire name, or `"combined"` for a multi-module run.
    #[serde(rename = "type")]
    scenario_type: String,
    /// Flat parameters for a per-scenario run.
    #[serde(default)]
    parameters: BTreeMap<String, f64>,
    /// Module sections for a combined run.
    #[serde(default)]
    combined: Option<CombinedRequest>,
}

/// What one invocation computes.
enum RunKind {
    Scenario(ScenarioKind, ParameterMap),
    Combined(CombinedRequest),
}

fn print_help() {
    eprintln!("solsize — solar sizing and financial-analysis engine");
    eprintln!();
    eprintln!("Usage: solsize [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --input <path>       Load a run request from a TOML file");
    eprintln!("  --preset <name>      Use a built-in example request");
    eprintln!("                       (residential, commercial, industrial,");
    eprintln!("                        common_areas, ev_charging, combined)");
    eprintln!("  --config <path>      Load engine configuration from TOML");
    eprintln!("  --state <UF>         Use the mean irradiation of a Brazilian state");
    eprintln!("  --report-out <path>  Export the report table to CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve              Start the REST API server");
        eprintln!("  --port <u16>         API server port (default: 3000)");
    }
    eprintln!("  --help               Show this help message");
    eprintln!();
    eprintln!("If no --input or --preset is given, the residential preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        input_path: None,
        preset: None,
        config_path: None,
        state_code: None,
        report_out: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--input" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --input requires a path argument");
                    process::exit(1);
                }
                cli.input_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --config requires a path argument");
                    process::exit(1);
                }
                cli.config_path = Some(args[i].clone());
            }
            "--state" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --state requires a state code argument");
                    process::exit(1);
                }
                cli.state_code = Some(args[i].clone());
            }
            "--report-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --report-out requires a path argument");
                    process::exit(1);
                }
                cli.report_out = Some(args[i].clone());
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --port requires a u16 argument");
                    process::exit(1);
                }
                if let Ok(p) = args[i].parse::<u16>() {
                    cli.port = p;
                } else {
                    eprintln!("error: --port value \"{}\" is not a valid u16", args[i]);
                    process::exit(1);
                }
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Builds a run from a parsed TOML request.
fn run_from_request(request: RunRequest) -> Result<RunKind, String> {
    if request.scenario_type == "combined" {
        let combined = request
            .combined
            .ok_or_else(|| "input type is \"combined\" but no [combined] section given".to_string())?;
        return Ok(RunKind::Combined(combined));
    }
    let kind = ScenarioKind::parse(&request.scenario_type).map_err(|e| e.to_string())?;
    Ok(RunKind::Scenario(kind, request.parameters.into()))
}

fn run_from_input_file(path: &Path) -> Result<RunKind, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("cannot read input \"{}\": {e}", path.display()))?;
    let request: RunRequest =
        toml::from_str(&raw).map_err(|e| format!("invalid input \"{}\": {e}", path.display()))?;
    run_from_request(request)
}

/// Built-in example requests, one per scenario plus the combined baseline.
fn run_from_preset(name: &str) -> Result<RunKind, String> {
    let mut params = ParameterMap::new();
    let kind = match name {
        "residential" => {
            params
                .set("num_units", 80.0)
                .set("consumption_per_unit", 150.0)
                .set("available_area", 200.0);
            ScenarioKind::Residential
        }
        "commercial" => {
            params
                .set("monthly_consumption", 2_500.0)
                .set("available_area", 500.0);
            ScenarioKind::Commercial
        }
        "industrial" => {
            params
                .set("monthly_consumption", 20_000.0)
                .set("available_area", 2_000.0);
            ScenarioKind::Industrial
        }
        "common_areas" => {
            params
                .set("daily_consumption", 70.0)
                .set("critical_consumption_per_hour", 4.56)
                .set("backup_hours", 8.0);
            ScenarioKind::CommonAreas
        }
        "ev_charging" => {
            params
                .set("num_parking_spots", 80.0)
                .set("charging_points_percentage", 21.0)
                .set("energy_per_charge", 18.0)
                .set("charges_per_day", 1.0);
            ScenarioKind::EvCharging
        }
        "combined" => return Ok(RunKind::Combined(CombinedRequest::baseline())),
        _ => {
            return Err(format!(
                "unknown preset \"{name}\", available: residential, commercial, industrial, \
                 common_areas, ev_charging, combined"
            ));
        }
    };
    Ok(RunKind::Scenario(kind, params))
}

fn print_rows(rows: &[ReportRow]) {
    let width = rows.iter().map(|r| r.parameter.len()).max().unwrap_or(0);
    for row in rows {
        println!("{:<width$}  {}", row.parameter, row.value);
    }
}

fn main() {
    let cli = parse_args();

    // Load config: --config file first, then the optional state override
    let mut config = if let Some(ref path) = cli.config_path {
        match EngineConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        EngineConfig::default()
    };

    if let Some(ref code) = cli.state_code {
        let radiation = TechnicalDefaults::for_state(code).solar_radiation;
        config.technical.solar_radiation = radiation;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Load the run: --input takes priority, then --preset, then the default
    let run = if let Some(ref path) = cli.input_path {
        run_from_input_file(Path::new(path))
    } else if let Some(ref name) = cli.preset {
        run_from_preset(name)
    } else {
        run_from_preset("residential")
    };
    let run = match run {
        Ok(run) => run,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let rows = match run {
        RunKind::Scenario(kind, params) => match calculate(kind, &params, &config) {
            Ok(outcome) => scenario_rows(&outcome),
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        },
        RunKind::Combined(request) => match combined::evaluate(&request, &config.costs) {
            Ok(outcome) => {
                if !outcome.financial.payback_plausible {
                    eprintln!(
                        "warning: payback of {:.2} years is outside the expected 2-20 year range",
                        outcome.financial.payback_years
                    );
                }
                combined_rows(&outcome)
            }
            Err(issues) => {
                for issue in &issues {
                    eprintln!("error: {issue}");
                }
                process::exit(1);
            }
        },
    };

    print_rows(&rows);

    // Export CSV if requested
    if let Some(ref path) = cli.report_out {
        if let Err(e) = export_csv(&rows, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Report written to {path}");
    }

    // Start API server if requested
    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(solsize::api::AppState { config });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        rt.block_on(solsize::api::serve(state, addr));
    }
}
