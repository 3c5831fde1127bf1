//! # Property Store
//!
//! Resolves an element name to its backing partition and exposes typed reads
//! and single-property updates, hiding the partition split from callers.
//!
//! Backends implement three partition-level primitives; the element-level
//! operations ([`PropertyStore::get_properties`], [`PropertyStore::update_property`],
//! ...) are provided on top of them so every backend shares the same routing
//! and not-found semantics.
//!
//! ## Backends
//!
//! - [`memory::MemoryStore`] - in-process partitions (tests, demos)
//! - [`document::DocumentStore`] - file-backed document database with
//!   atomic saves and partition locking
//!
//! ## Example
//!
//! ```rust
//! use capacity_core::elements::{Element, ElementProperty};
//! use capacity_core::store::{memory::MemoryStore, PropertyStore};
//!
//! # tokio_test_block(async {
//! let store = MemoryStore::with_elements(vec![
//!     Element::new("Beam1", vec![ElementProperty::new("h", "mm", 500.0)]),
//! ]);
//! assert!(store.update_property("Beam1", "H", 550.0).await.unwrap());
//! let props = store.get_properties("Beam1").await.unwrap();
//! assert_eq!(props[0].value, 550.0);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod document;
pub mod lock;
pub mod memory;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::elements::{classify, ElementProperty, Partition};
use crate::errors::{DesignError, DesignResult};

pub use document::DocumentStore;
pub use memory::MemoryStore;

/// Document-oriented element store split into [`Partition`]s.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// Element names in one partition, in the partition's natural order.
    async fn partition_names(&self, partition: Partition) -> DesignResult<Vec<String>>;

    /// Properties of the element whose name matches exactly, or `None`.
    async fn find_element(
        &self,
        partition: Partition,
        element_name: &str,
    ) -> DesignResult<Option<Vec<ElementProperty>>>;

    /// Set one property value in place.
    ///
    /// Returns `None` when no element matches, `Some(false)` when the element
    /// has no property named `property_name` (case-insensitive) and
    /// `Some(true)` after the value was written.
    async fn write_property(
        &self,
        partition: Partition,
        element_name: &str,
        property_name: &str,
        value: f64,
    ) -> DesignResult<Option<bool>>;

    /// Resolve the partition holding an element.
    fn resolve_partition(&self, element_name: &str) -> DesignResult<Partition> {
        classify(element_name)
    }

    /// All element names: beam partition first, then columns. No dedup, no sort.
    async fn list_all_element_names(&self) -> DesignResult<Vec<String>> {
        let mut names = Vec::new();
        for partition in Partition::ALL {
            names.extend(self.partition_names(partition).await?);
        }
        debug!(count = names.len(), "listed element names");
        Ok(names)
    }

    /// Ordered properties of an element.
    ///
    /// Fails with `UnknownElementType` before touching the store when the
    /// prefix is unrecognised, and with `ElementNotFound` when no document
    /// matches the exact name.
    async fn get_properties(&self, element_name: &str) -> DesignResult<Vec<ElementProperty>> {
        let partition = self.resolve_partition(element_name)?;
        debug!(element = element_name, %partition, "fetching properties");
        self.find_element(partition, element_name)
            .await?
            .ok_or_else(|| DesignError::element_not_found(element_name))
    }

    /// Update exactly one property value.
    ///
    /// Returns `Ok(false)` (declined) if the element has no such property.
    async fn update_property(
        &self,
        element_name: &str,
        property_name: &str,
        new_value: f64,
    ) -> DesignResult<bool> {
        let partition = self.resolve_partition(element_name)?;
        match self
            .write_property(partition, element_name, property_name, new_value)
            .await?
        {
            Some(true) => {
                info!(element = element_name, property = property_name, value = new_value, "property updated");
                Ok(true)
            }
            Some(false) => {
                warn!(element = element_name, property = property_name, "update declined: no such property");
                Ok(false)
            }
            None => Err(DesignError::element_not_found(element_name)),
        }
    }
}

/// Set a property value inside an ordered property list.
///
/// Shared by backends: touches only the first case-insensitive match.
pub(crate) fn set_value(properties: &mut [ElementProperty], property_name: &str, value: f64) -> bool {
    match properties.iter_mut().find(|p| p.is_named(property_name)) {
        Some(property) => {
            property.value = value;
            true
        }
        None => false,
    }
}
