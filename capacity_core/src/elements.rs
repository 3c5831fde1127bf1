//! # Structural Elements
//!
//! Named structural members and their unit-tagged numeric properties.
//!
//! An element's type is never stored: it is derived from the element name by
//! a case-insensitive prefix match (`Beam...` or `Column...`). That derived
//! type selects the backing [`Partition`].
//!
//! ## Example
//!
//! ```rust
//! use capacity_core::elements::{classify, Partition};
//!
//! assert_eq!(classify("beam-B1").unwrap(), Partition::Beam);
//! assert_eq!(classify("COLUMN_C3").unwrap(), Partition::Column);
//! assert!(classify("Truss1").is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{DesignError, DesignResult};

/// One named, unit-tagged numeric attribute of an element.
///
/// ## JSON Example
///
/// ```json
/// { "name": "b_w", "unit": "mm", "value": 300.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementProperty {
    /// Property name, unique per element under case-insensitive comparison
    pub name: String,
    /// Display unit (e.g., "mm", "MPa", "mm^2")
    pub unit: String,
    /// Numeric value
    pub value: f64,
}

impl ElementProperty {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            value,
        }
    }

    /// Case-insensitive name comparison
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A named structural member. Identity is the name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub properties: Vec<ElementProperty>,
}

impl Element {
    pub fn new(name: impl Into<String>, properties: Vec<ElementProperty>) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }

    /// Find a property by case-insensitive name
    pub fn property(&self, name: &str) -> Option<&ElementProperty> {
        find_property(&self.properties, name)
    }

    /// Derived element type
    pub fn partition(&self) -> DesignResult<Partition> {
        classify(&self.name)
    }
}

/// Find a property by case-insensitive name in an ordered property list.
pub fn find_property<'a>(properties: &'a [ElementProperty], name: &str) -> Option<&'a ElementProperty> {
    properties.iter().find(|p| p.is_named(name))
}

/// Backing subdivision of stored elements, selected by name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Partition {
    Beam,
    Column,
}

impl Partition {
    /// All partitions in listing order (beams first)
    pub const ALL: [Partition; 2] = [Partition::Beam, Partition::Column];

    /// Name prefix that routes an element to this partition
    pub fn prefix(&self) -> &'static str {
        match self {
            Partition::Beam => "Beam",
            Partition::Column => "Column",
        }
    }

    /// Name of the backing collection
    pub fn collection_name(&self) -> &'static str {
        match self {
            Partition::Beam => "Beam_DB",
            Partition::Column => "Column_DB",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Classify an element name into its partition.
///
/// Matches the name prefix case-insensitively against `Beam` and `Column`.
/// Any other prefix fails with [`DesignError::UnknownElementType`].
pub fn classify(element_name: &str) -> DesignResult<Partition> {
    Partition::ALL
        .into_iter()
        .find(|partition| has_prefix_ignore_case(element_name, partition.prefix()))
        .ok_or_else(|| DesignError::unknown_element_type(element_name))
}

fn has_prefix_ignore_case(name: &str, prefix: &str) -> bool {
    name.len() >= prefix.len()
        && name.is_char_boundary(prefix.len())
        && name[..prefix.len()].eq_ignore_ascii_case(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_beam_any_case() {
        for name in ["Beam1", "beam_B2", "BEAM", "bEaMx"] {
            assert_eq!(classify(name).unwrap(), Partition::Beam, "{}", name);
        }
    }

    #[test]
    fn test_classify_column_any_case() {
        for name in ["Column1", "column-C2", "COLUMN"] {
            assert_eq!(classify(name).unwrap(), Partition::Column, "{}", name);
        }
    }

    #[test]
    fn test_classify_unknown_prefix() {
        for name in ["Truss1", "", "Bea", "Col", "XBeam1", "Éeam1"] {
            let err = classify(name).unwrap_err();
            assert_eq!(err, DesignError::unknown_element_type(name));
        }
    }

    #[test]
    fn test_collection_names() {
        assert_eq!(Partition::Beam.collection_name(), "Beam_DB");
        assert_eq!(Partition::Column.collection_name(), "Column_DB");
    }

    #[test]
    fn test_property_lookup_is_case_insensitive() {
        let element = Element::new(
            "Beam1",
            vec![
                ElementProperty::new("b_w", "mm", 300.0),
                ElementProperty::new("fck", "MPa", 24.0),
            ],
        );
        assert_eq!(element.property("FCK").map(|p| p.value), Some(24.0));
        assert!(element.property("fy").is_none());
        assert_eq!(element.partition().unwrap(), Partition::Beam);
    }
}
