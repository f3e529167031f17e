use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::units::Unit;

/// Allowed numeric deviations. Loaded once and never mutated during a
/// comparison pass.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ToleranceConfig {
    pub pt_tolerance: f64,
    pub multiple_tolerance: f64,
    /// Overrides keyed by `<property>.<unit>`, e.g. `段落.行间距.multiple`.
    pub specific_tolerances: HashMap<String, f64>,
    /// Plain numeric line spacing below this value is read as a line-height
    /// multiple rather than points.
    pub line_spacing_ratio_threshold: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        ToleranceConfig {
            pt_tolerance: 0.1,
            multiple_tolerance: 0.05,
            specific_tolerances: HashMap::new(),
            line_spacing_ratio_threshold: 10.0,
        }
    }
}

impl ToleranceConfig {
    /// Parse a tolerance file. A missing or unreadable file is not fatal:
    /// the documented defaults are used instead.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("tolerance config {} not readable ({e}), using defaults", path.display());
                return Self::default();
            }
        };
        Self::from_json_str(&content).unwrap_or_else(|e| {
            log::warn!("tolerance config {} is malformed ({e}), using defaults", path.display());
            Self::default()
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn tolerance(&self, property_key: &str, unit: Unit) -> f64 {
        let specific_key = format!("{property_key}.{}", unit.as_str());
        if let Some(t) = self.specific_tolerances.get(&specific_key) {
            return *t;
        }
        match unit {
            Unit::Pt => self.pt_tolerance,
            Unit::Multiple => self.multiple_tolerance,
            _ => 0.0,
        }
    }
}
