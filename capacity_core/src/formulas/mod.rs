//! # Formula Engine
//!
//! Stateless evaluation of one catalogued design-capacity formula against a
//! property set. The engine never touches the store: callers fetch properties
//! and hand them in.
//!
//! Every intermediate quantity is written to a [`StepTrace`] under a fixed
//! step name, in computation order, so the final result can be audited.
//!
//! ## Failure Semantics
//!
//! - Unknown formula name → `UnsupportedFormula`
//! - Required variable absent → `MissingVariable` naming that variable;
//!   checked before evaluation starts, so no partial steps exist
//! - Non-finite intermediate or final value → `EvaluationError`
//!
//! Variable lookup is case-insensitive, matching the property store.
//!
//! ## Example
//!
//! ```rust
//! use capacity_core::elements::ElementProperty;
//! use capacity_core::formulas::calculate;
//!
//! let props = vec![
//!     ElementProperty::new("b_w", "mm", 300.0),
//!     ElementProperty::new("h", "mm", 500.0),
//!     ElementProperty::new("num_legs", "ea", 2.0),
//!     ElementProperty::new("area_bar", "mm^2", 314.0),
//!     ElementProperty::new("fck", "MPa", 24.0),
//!     ElementProperty::new("fy", "MPa", 400.0),
//! ];
//!
//! let result = calculate("KDS_Compression_Capacity", &props);
//! assert!(result.is_ok());
//! assert_eq!(result.steps.get("A_g"), Some(150000.0));
//! ```

pub mod catalog;
pub mod concrete;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::elements::ElementProperty;
use crate::errors::{DesignError, DesignResult};

pub use catalog::{formula_names, lookup, CodeReference, Formula, FormulaEntry, CATALOG};

/// Case-insensitive name → value view over a property set.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    values: HashMap<String, f64>,
}

impl Variables {
    /// Index a property set. On a case-insensitive name clash the first property wins.
    pub fn from_properties(properties: &[ElementProperty]) -> Self {
        let mut values = HashMap::with_capacity(properties.len());
        for property in properties {
            values
                .entry(property.name.to_ascii_lowercase())
                .or_insert(property.value);
        }
        Self { values }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.values.contains_key(&symbol.to_ascii_lowercase())
    }

    /// Value of a variable, or `MissingVariable` naming `symbol`.
    pub fn get(&self, symbol: &str) -> DesignResult<f64> {
        self.values
            .get(&symbol.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| DesignError::missing_variable(symbol))
    }
}

/// One named intermediate quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub value: f64,
}

/// Ordered name → value trace of one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepTrace {
    steps: Vec<Step>,
}

impl StepTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step and return its value.
    ///
    /// Fails with `EvaluationError` if the value is NaN or infinite.
    pub fn record(&mut self, name: &str, value: f64) -> DesignResult<f64> {
        if !value.is_finite() {
            return Err(DesignError::evaluation(format!("{} evaluated to {}", name, value)));
        }
        match self.steps.iter_mut().find(|s| s.name == name) {
            Some(step) => step.value = value,
            None => self.steps.push(Step {
                name: name.to_string(),
                value,
            }),
        }
        Ok(value)
    }

    /// Value of a previously recorded step
    pub fn get(&self, name: &str) -> Option<f64> {
        self.steps.iter().find(|s| s.name == name).map(|s| s.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Outcome of [`calculate`].
///
/// `steps` is populated only on success; on failure `value` is 0 and `error`
/// carries the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaResult {
    pub formula: String,
    pub value: f64,
    pub steps: StepTrace,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<DesignError>,
}

impl FormulaResult {
    fn success(formula: &str, value: f64, steps: StepTrace) -> Self {
        Self {
            formula: formula.to_string(),
            value,
            steps,
            error: None,
        }
    }

    fn failure(formula: &str, error: DesignError) -> Self {
        Self {
            formula: formula.to_string(),
            value: 0.0,
            steps: StepTrace::new(),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Convert into a `Result`, dropping the trace on failure.
    pub fn into_result(self) -> DesignResult<(f64, StepTrace)> {
        match self.error {
            Some(error) => Err(error),
            None => Ok((self.value, self.steps)),
        }
    }

    /// Operator-facing report for an element.
    ///
    /// ```text
    /// Column1's KDS_Compression_Capacity capacity: 1715.16 kN
    ///   Maximum design axial strength of a tied column (KDS 14 20 20 Section 4.1.2)
    ///   A_g = 150000.0000
    ///   ...
    /// ```
    pub fn summary(&self, element: &str) -> String {
        if let Some(error) = &self.error {
            return format!("{}: {}", element, error);
        }
        let Some(entry) = lookup(&self.formula) else {
            return format!("{}: {}", element, DesignError::unsupported_formula(&self.formula));
        };
        let mut out = format!(
            "{}'s {} capacity: {:.2} {}\n  {} ({})",
            element,
            self.formula,
            self.value,
            entry.units,
            entry.description,
            entry.reference.citation()
        );
        for step in self.steps.iter() {
            out.push_str(&format!("\n  {} = {:.4}", step.name, step.value));
        }
        out
    }
}

/// Evaluate a catalogued formula against a property set.
///
/// Pure and deterministic: identical inputs give bit-identical results.
pub fn calculate(formula_name: &str, properties: &[ElementProperty]) -> FormulaResult {
    let Some(entry) = lookup(formula_name) else {
        return FormulaResult::failure(formula_name, DesignError::unsupported_formula(formula_name));
    };

    let variables = Variables::from_properties(properties);
    if let Some(missing) = entry.required_variables().find(|symbol| !variables.contains(symbol)) {
        debug!(formula = formula_name, variable = missing, "missing formula input");
        return FormulaResult::failure(formula_name, DesignError::missing_variable(missing));
    }

    let mut steps = StepTrace::new();
    let outcome = (entry.evaluate)(&variables, &mut steps).and_then(|value| {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(DesignError::evaluation(format!("result evaluated to {}", value)))
        }
    });

    match outcome {
        Ok(value) => {
            debug!(formula = formula_name, value, steps = steps.len(), "formula evaluated");
            FormulaResult::success(entry.name, value, steps)
        }
        Err(error) => FormulaResult::failure(formula_name, error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Canonical property set covering every catalogued variable
    fn canonical() -> Vec<ElementProperty> {
        vec![
            ElementProperty::new("b_w", "mm", 300.0),
            ElementProperty::new("h", "mm", 500.0),
            ElementProperty::new("d", "mm", 440.0),
            ElementProperty::new("num_legs", "ea", 2.0),
            ElementProperty::new("area_bar", "mm^2", 314.0),
            ElementProperty::new("fck", "MPa", 24.0),
            ElementProperty::new("fy", "MPa", 400.0),
            ElementProperty::new("s_bar", "mm", 200.0),
            ElementProperty::new("lambda_conc", "-", 1.0),
        ]
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_kds_compression_scenario() {
        let result = calculate("KDS_Compression_Capacity", &canonical());
        assert!(result.is_ok());
        assert_eq!(result.steps.get("A_g"), Some(150000.0));
        assert_eq!(result.steps.get("A_st"), Some(628.0));

        let expected = 0.80 * 0.65 * (0.85 * 24.0 * (150000.0 - 628.0) + 400.0 * 628.0) / 1000.0;
        assert!(approx(result.value, expected));
        assert!(approx(result.value, 1715.162176));
        assert_eq!(result.steps.get("phi_Pn_max"), Some(result.value));
    }

    #[test]
    fn test_kds_compression_step_order() {
        let result = calculate("KDS_Compression_Capacity", &canonical());
        let names: Vec<_> = result.steps.names().collect();
        assert_eq!(names, vec!["A_g", "A_st", "phi_comp", "alpha_1", "beta_1", "phi_Pn_max"]);
    }

    #[test]
    fn test_csa_compression() {
        let result = calculate("CSA_Compression_Capacity", &canonical());
        let alpha_1 = (0.85_f64 - 0.0015 * 24.0).max(0.67);
        let expected =
            0.80 * (alpha_1 * 0.65 * 24.0 * (150000.0 - 628.0) + 0.85 * 400.0 * 628.0) / 1000.0;
        assert!(approx(result.value, expected));
        assert!(approx(result.steps.get("alpha_1").unwrap(), 0.814));
        assert!(approx(result.steps.get("beta_1").unwrap(), 0.91));
        let names: Vec<_> = result.steps.names().collect();
        assert_eq!(
            names,
            vec!["A_g", "A_st", "alpha_1", "beta_1", "phi_c", "phi_s", "phi_comp", "phi_Pr_max"]
        );
    }

    #[test]
    fn test_csa_compression_factor_floors() {
        let mut props = canonical();
        props[5].value = 200.0; // fck
        let result = calculate("CSA_Compression_Capacity", &props);
        assert_eq!(result.steps.get("alpha_1"), Some(0.67));
        assert_eq!(result.steps.get("beta_1"), Some(0.67));
    }

    #[test]
    fn test_kds_shear() {
        let result = calculate("KDS_Shear_Capacity", &canonical());
        let phi_v_c = 0.75 * (1.0 / 6.0) * 1.0 * 24.0_f64.sqrt() * 300.0 * 440.0 / 1000.0;
        let phi_v_s = 0.75 * (628.0 * 400.0 * 440.0 / 200.0) / 1000.0;
        let phi_v_s_max = 0.75 * 0.2 * (1.0 - 24.0 / 250.0) * 24.0 * 300.0 * 440.0 / 1000.0;
        assert!(approx(result.steps.get("phi_V_c").unwrap(), phi_v_c));
        assert!(approx(result.steps.get("phi_V_s").unwrap(), phi_v_s));
        assert!(approx(result.steps.get("phi_V_s_max").unwrap(), phi_v_s_max));
        assert!(approx(result.value, phi_v_c + phi_v_s.min(phi_v_s_max)));
        assert_eq!(result.steps.get("phi_V_n"), Some(result.value));
    }

    #[test]
    fn test_csa_shear() {
        let result = calculate("CSA_Shear_Capacity", &canonical());
        let d_v = (0.9_f64 * 440.0).max(0.72 * 500.0);
        assert_eq!(result.steps.get("d_v"), Some(d_v));
        let theta = 35.0 * std::f64::consts::PI / 180.0;
        let cot = theta.cos() / theta.sin();
        assert!(approx(result.steps.get("cot_theta").unwrap(), cot));

        let phi_v_c = 0.65 * 1.0 * 0.18 * 24.0_f64.sqrt() * 300.0 * d_v / 1000.0;
        let phi_v_s = 0.85 * 628.0 * 400.0 * d_v * cot / 200.0 / 1000.0;
        let phi_v_r_max = 0.25 * 0.65 * 24.0 * 300.0 * d_v / 1000.0;
        assert!(approx(result.value, (phi_v_c + phi_v_s).min(phi_v_r_max)));

        let names: Vec<_> = result.steps.names().collect();
        assert_eq!(
            names,
            vec![
                "d_v", "beta", "theta", "cot_theta", "phi_conc", "phi_steel", "A_v", "phi_V_c",
                "phi_V_s", "phi_V_r", "phi_V_r_max"
            ]
        );
    }

    #[test]
    fn test_every_formula_is_deterministic() {
        for name in formula_names() {
            let first = calculate(name, &canonical());
            let second = calculate(name, &canonical());
            assert!(first.is_ok(), "{}", name);
            assert_eq!(first.value.to_bits(), second.value.to_bits(), "{}", name);
            assert_eq!(first.steps, second.steps, "{}", name);
        }
    }

    #[test]
    fn test_missing_variable_names_exactly_the_removed_one() {
        for entry in CATALOG.iter() {
            for symbol in entry.required_variables() {
                let props: Vec<_> = canonical().into_iter().filter(|p| p.name != symbol).collect();
                let result = calculate(entry.name, &props);
                assert_eq!(
                    result.error,
                    Some(DesignError::missing_variable(symbol)),
                    "{} without {}",
                    entry.name,
                    symbol
                );
                assert!(result.steps.is_empty());
                assert_eq!(result.value, 0.0);
            }
        }
    }

    #[test]
    fn test_declared_variables_are_sufficient() {
        for entry in CATALOG.iter() {
            let props: Vec<_> = canonical()
                .into_iter()
                .filter(|p| entry.required_variables().any(|s| s == p.name))
                .collect();
            assert!(calculate(entry.name, &props).is_ok(), "{}", entry.name);
        }
    }

    #[test]
    fn test_unsupported_formula() {
        let result = calculate("ACI_Torsion_Capacity", &canonical());
        assert_eq!(
            result.error,
            Some(DesignError::unsupported_formula("ACI_Torsion_Capacity"))
        );
        assert_eq!(result.value, 0.0);
        assert!(result.steps.is_empty());
    }

    #[test]
    fn test_variable_lookup_ignores_case() {
        let props: Vec<_> = canonical()
            .into_iter()
            .map(|mut p| {
                p.name = p.name.to_uppercase();
                p
            })
            .collect();
        assert!(calculate("KDS_Shear_Capacity", &props).is_ok());
    }

    #[test]
    fn test_domain_error_is_evaluation_error() {
        let mut props = canonical();
        props[5].value = -4.0; // fck, sqrt of a negative
        let result = calculate("KDS_Shear_Capacity", &props);
        assert_eq!(result.error.as_ref().map(|e| e.error_code()), Some("EVALUATION_ERROR"));
        assert!(result.steps.is_empty());

        let mut props = canonical();
        props[7].value = 0.0; // s_bar
        let result = calculate("CSA_Shear_Capacity", &props);
        assert_eq!(result.error.as_ref().map(|e| e.error_code()), Some("EVALUATION_ERROR"));
    }

    #[test]
    fn test_summary_lists_steps() {
        let summary = calculate("KDS_Compression_Capacity", &canonical()).summary("Column1");
        assert!(summary.starts_with("Column1's KDS_Compression_Capacity capacity: 1715.16 kN"));
        assert!(summary.contains("\n  A_g = 150000.0000"));

        let mut lines = summary.lines();
        lines.next();
        assert_eq!(
            lines.next(),
            Some("  Maximum design axial strength of a tied column (KDS 14 20 20 Section 4.1.2)")
        );

        let shear = calculate("CSA_Shear_Capacity", &canonical()).summary("Beam1");
        assert!(shear.contains("(CSA A23.3-19 Clause 11.3)"));

        let failed = calculate("Nope", &canonical()).summary("Column1");
        assert_eq!(failed, "Column1: Unsupported formula type.");
    }

    #[test]
    fn test_into_result() {
        let (value, steps) = calculate("KDS_Shear_Capacity", &canonical()).into_result().unwrap();
        assert!(value > 0.0);
        assert_eq!(steps.len(), 6);
        assert!(calculate("Nope", &canonical()).into_result().is_err());
    }
}
