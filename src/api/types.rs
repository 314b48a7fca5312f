//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::engine::combined::ValidationIssue;
use crate::engine::ParameterMap;

/// Body of `POST /calculate`.
#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    /// Scenario wire name (`"residential"`, `"ev_charging"`, …).
    #[serde(rename = "type")]
    pub scenario_type: String,
    /// Flat parameter map for the scenario.
    #[serde(default)]
    pub parameters: ParameterMap,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Error response body for combined-request validation failures.
#[derive(Debug, Serialize)]
pub struct IssuesResponse {
    /// Every validation finding, addressed by module and field.
    pub issues: Vec<ValidationIssue>,
}

/// Response body of `GET /scenarios`.
#[derive(Debug, Serialize)]
pub struct ScenariosResponse {
    /// Supported scenario wire names.
    pub scenarios: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculate_request_parses_type_and_parameters() {
        let body = r#"{
            "type": "residential",
            "parameters": {"num_units": 80, "consumption_per_unit": 150, "available_area": 200}
        }"#;
        let req: CalculateRequest = serde_json::from_str(body).expect("valid body");
        assert_eq!(req.scenario_type, "residential");
        assert_eq!(req.parameters.get("num_units"), Some(80.0));
    }

    #[test]
    fn calculate_request_parameters_default_to_empty() {
        let req: CalculateRequest =
            serde_json::from_str(r#"{"type": "commercial"}"#).expect("valid body");
        assert_eq!(req.parameters.get("monthly_consumption"), None);
    }
}
