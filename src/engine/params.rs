//! Flat numeric parameter maps for calculation requests.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::error::CalcError;

/// Scenario input parameters as a flat key → value map.
///
/// Hosts hand parameters over exactly as they arrive from their own request
/// or storage layer; the engine pulls out what each scenario needs and
/// validates on access, so error messages always carry the offending key.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ParameterMap(BTreeMap<String, f64>);

impl ParameterMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a parameter.
    pub fn set(&mut self, key: &str, value: f64) -> &mut Self {
        self.0.insert(key.to_string(), value);
        self
    }

    /// Returns the raw value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// Returns the value for `field`.
    ///
    /// # Errors
    ///
    /// `MissingParameter` when the key is absent; `InvalidParameter` when
    /// the value is not finite.
    pub fn require(&self, field: &str) -> Result<f64, CalcError> {
        let value = self.get(field).ok_or_else(|| CalcError::missing(field))?;
        if !value.is_finite() {
            return Err(CalcError::invalid(field, "must be a finite number"));
        }
        Ok(value)
    }

    /// Returns the value for `field`, requiring it to be `>= 0`.
    ///
    /// # Errors
    ///
    /// `MissingParameter` when absent; `InvalidParameter` when negative or
    /// not finite.
    pub fn require_non_negative(&self, field: &str) -> Result<f64, CalcError> {
        let value = self.require(field)?;
        if value < 0.0 {
            return Err(CalcError::invalid(field, "must be >= 0"));
        }
        Ok(value)
    }

    /// Returns the value for `field` or `default` when absent, requiring a
    /// present value to be `>= 0`.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` when a present value is negative or not finite.
    pub fn non_negative_or(&self, field: &str, default: f64) -> Result<f64, CalcError> {
        match self.get(field) {
            None => Ok(default),
            Some(value) => {
                if !value.is_finite() {
                    return Err(CalcError::invalid(field, "must be a finite number"));
                }
                if value < 0.0 {
                    return Err(CalcError::invalid(field, "must be >= 0"));
                }
                Ok(value)
            }
        }
    }

    /// Returns the value for `field`, requiring it to lie in `[0, 100]`.
    ///
    /// # Errors
    ///
    /// `MissingParameter` when absent; `InvalidParameter` when out of range.
    pub fn percentage(&self, field: &str) -> Result<f64, CalcError> {
        let value = self.require(field)?;
        if !(0.0..=100.0).contains(&value) {
            return Err(CalcError::invalid(field, "must be in [0, 100]"));
        }
        Ok(value)
    }
}

impl FromIterator<(String, f64)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, f64>> for ParameterMap {
    fn from(map: BTreeMap<String, f64>) -> Self {
        Self(map)
    }
}
