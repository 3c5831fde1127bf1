//! # Formula Catalog
//!
//! Fixed table of design-capacity formulas. Each [`FormulaEntry`] maps a
//! formula name to its required variables, its code reference and a pure
//! evaluation function, so dispatch is a table lookup and adding a formula
//! means adding a row.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::concrete;
use super::{StepTrace, Variables};
use crate::errors::DesignResult;

// ============================================================================
// Code References
// ============================================================================

/// Design code clause a formula implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CodeReference {
    /// Korean Design Standard (KDS) for concrete structures
    Kds {
        standard: &'static str,
        section: &'static str,
    },
    /// CSA A23.3 - Design of Concrete Structures
    CsaA233 { year: u16, clause: &'static str },
}

impl CodeReference {
    /// Format the reference for display
    pub fn citation(&self) -> String {
        match self {
            CodeReference::Kds { standard, section } => format!("KDS {} Section {}", standard, section),
            CodeReference::CsaA233 { year, clause } => {
                format!("CSA A23.3-{:02} Clause {}", year % 100, clause)
            }
        }
    }
}

// ============================================================================
// Variables
// ============================================================================

// Property names a formula reads from the element's property set.
const B_W: &str = "b_w";
const H: &str = "h";
const D: &str = "d";
const NUM_LEGS: &str = "num_legs";
const AREA_BAR: &str = "area_bar";
const FCK: &str = "fck";
const FY: &str = "fy";
const S_BAR: &str = "s_bar";
const LAMBDA_CONC: &str = "lambda_conc";

// ============================================================================
// Formula Enum
// ============================================================================

/// Every catalogued design-capacity formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formula {
    #[serde(rename = "KDS_Compression_Capacity")]
    KdsCompressionCapacity,
    #[serde(rename = "CSA_Compression_Capacity")]
    CsaCompressionCapacity,
    #[serde(rename = "KDS_Shear_Capacity")]
    KdsShearCapacity,
    #[serde(rename = "CSA_Shear_Capacity")]
    CsaShearCapacity,
}

impl Formula {
    /// All formulas in catalog order
    pub const ALL: [Formula; 4] = [
        Formula::KdsCompressionCapacity,
        Formula::CsaCompressionCapacity,
        Formula::KdsShearCapacity,
        Formula::CsaShearCapacity,
    ];

    /// Look up a formula by its exact catalog name.
    pub fn from_name(name: &str) -> Option<Formula> {
        lookup(name).map(|entry| entry.formula)
    }

    /// Catalog row for this formula
    pub fn entry(&self) -> &'static FormulaEntry {
        &CATALOG[*self as usize]
    }

    pub fn name(&self) -> &'static str {
        self.entry().name
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pure evaluation function: reads inputs, records each step, returns the capacity.
pub type EvaluateFn = fn(&Variables, &mut StepTrace) -> DesignResult<f64>;

/// One catalog row.
#[derive(Debug, Clone, Copy)]
pub struct FormulaEntry {
    pub formula: Formula,
    /// Catalog name used by the command grammar
    pub name: &'static str,
    pub description: &'static str,
    /// Result unit
    pub units: &'static str,
    pub reference: CodeReference,
    /// Inputs that must all be present, in first-use order
    pub variables: &'static [&'static str],
    pub evaluate: EvaluateFn,
}

impl FormulaEntry {
    /// Symbols of the required variables
    pub fn required_variables(&self) -> impl Iterator<Item = &'static str> {
        self.variables.iter().copied()
    }
}

/// The catalog, indexed by `Formula as usize`.
pub static CATALOG: [FormulaEntry; 4] = [
    FormulaEntry {
        formula: Formula::KdsCompressionCapacity,
        name: "KDS_Compression_Capacity",
        description: "Maximum design axial strength of a tied column",
        units: "kN",
        reference: CodeReference::Kds { standard: "14 20 20", section: "4.1.2" },
        variables: &[B_W, H, NUM_LEGS, AREA_BAR, FCK, FY],
        evaluate: concrete::kds_compression_capacity,
    },
    FormulaEntry {
        formula: Formula::CsaCompressionCapacity,
        name: "CSA_Compression_Capacity",
        description: "Maximum factored axial resistance of a tied column",
        units: "kN",
        reference: CodeReference::CsaA233 { year: 2019, clause: "10.10.4" },
        variables: &[B_W, H, NUM_LEGS, AREA_BAR, FCK, FY],
        evaluate: concrete::csa_compression_capacity,
    },
    FormulaEntry {
        formula: Formula::KdsShearCapacity,
        name: "KDS_Shear_Capacity",
        description: "Design shear strength of a beam with vertical stirrups",
        units: "kN",
        reference: CodeReference::Kds { standard: "14 20 22", section: "4.2" },
        variables: &[NUM_LEGS, AREA_BAR, LAMBDA_CONC, FCK, B_W, D, FY, S_BAR],
        evaluate: concrete::kds_shear_capacity,
    },
    FormulaEntry {
        formula: Formula::CsaShearCapacity,
        name: "CSA_Shear_Capacity",
        description: "Factored shear resistance by the simplified method",
        units: "kN",
        reference: CodeReference::CsaA233 { year: 2019, clause: "11.3" },
        variables: &[D, H, NUM_LEGS, AREA_BAR, LAMBDA_CONC, FCK, B_W, FY, S_BAR],
        evaluate: concrete::csa_shear_capacity,
    },
];

static INDEX: Lazy<HashMap<&'static str, &'static FormulaEntry>> =
    Lazy::new(|| CATALOG.iter().map(|entry| (entry.name, entry)).collect());

/// Find a catalog row by exact name.
pub fn lookup(name: &str) -> Option<&'static FormulaEntry> {
    INDEX.get(name).copied()
}

/// Catalog names in catalog order
pub fn formula_names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|entry| entry.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_indexed_by_discriminant() {
        for formula in Formula::ALL {
            assert_eq!(formula.entry().formula, formula);
        }
    }

    #[test]
    fn test_lookup_is_exact() {
        assert_eq!(Formula::from_name("KDS_Shear_Capacity"), Some(Formula::KdsShearCapacity));
        assert!(lookup("kds_shear_capacity").is_none());
        assert!(lookup("ACI_Shear_Capacity").is_none());
    }

    #[test]
    fn test_formula_names_in_order() {
        let names: Vec<_> = formula_names().collect();
        assert_eq!(
            names,
            vec![
                "KDS_Compression_Capacity",
                "CSA_Compression_Capacity",
                "KDS_Shear_Capacity",
                "CSA_Shear_Capacity",
            ]
        );
    }

    #[test]
    fn test_serde_uses_catalog_names() {
        for formula in Formula::ALL {
            let json = serde_json::to_string(&formula).unwrap();
            assert_eq!(json, format!("\"{}\"", formula.name()));
        }
    }

    #[test]
    fn test_citations() {
        assert_eq!(
            Formula::CsaShearCapacity.entry().reference.citation(),
            "CSA A23.3-19 Clause 11.3"
        );
        assert_eq!(
            Formula::KdsCompressionCapacity.entry().reference.citation(),
            "KDS 14 20 20 Section 4.1.2"
        );
    }

    #[test]
    fn test_entries_copy_out_of_the_catalog() {
        let entry = CATALOG[1];
        let reference = entry.reference;
        assert_eq!(reference, CATALOG[1].reference);
        assert_eq!(entry.name, "CSA_Compression_Capacity");
    }

    #[test]
    fn test_required_variables_are_unique() {
        for entry in &CATALOG {
            let mut symbols: Vec<_> = entry.required_variables().collect();
            let total = symbols.len();
            symbols.sort_unstable();
            symbols.dedup();
            assert_eq!(symbols.len(), total, "{}", entry.name);
        }
    }
}
