//! In-process property store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{set_value, PropertyStore};
use crate::elements::{classify, Element, ElementProperty, Partition};
use crate::errors::{DesignError, DesignResult};

/// Partitions held in memory, each keeping insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    partitions: Mutex<HashMap<Partition, Vec<Element>>>,
}

impl MemoryStore {
    /// Build a store, routing each element to its partition by name.
    ///
    /// Elements with an unrecognised prefix are skipped.
    pub fn with_elements(elements: impl IntoIterator<Item = Element>) -> Self {
        let mut partitions: HashMap<Partition, Vec<Element>> = HashMap::new();
        for element in elements {
            if let Ok(partition) = classify(&element.name) {
                partitions.entry(partition).or_default().push(element);
            }
        }
        Self {
            partitions: Mutex::new(partitions),
        }
    }

    fn lock(&self) -> DesignResult<MutexGuard<'_, HashMap<Partition, Vec<Element>>>> {
        self.partitions
            .lock()
            .map_err(|e| DesignError::store_unavailable("lock", "memory", e.to_string()))
    }
}

#[async_trait]
impl PropertyStore for MemoryStore {
    async fn partition_names(&self, partition: Partition) -> DesignResult<Vec<String>> {
        let partitions = self.lock()?;
        Ok(partitions
            .get(&partition)
            .map(|elements| elements.iter().map(|e| e.name.clone()).collect())
            .unwrap_or_default())
    }

    async fn find_element(
        &self,
        partition: Partition,
        element_name: &str,
    ) -> DesignResult<Option<Vec<ElementProperty>>> {
        let partitions = self.lock()?;
        Ok(partitions
            .get(&partition)
            .and_then(|elements| elements.iter().find(|e| e.name == element_name))
            .map(|e| e.properties.clone()))
    }

    async fn write_property(
        &self,
        partition: Partition,
        element_name: &str,
        property_name: &str,
        value: f64,
    ) -> DesignResult<Option<bool>> {
        let mut partitions = self.lock()?;
        Ok(partitions
            .get_mut(&partition)
            .and_then(|elements| elements.iter_mut().find(|e| e.name == element_name))
            .map(|element| set_value(&mut element.properties, property_name, value)))
    }
}
