//! # Document Store
//!
//! File-backed document database reached by connection string.
//!
//! ## Layout
//!
//! ```text
//! <root>/<database>/
//! ├── Beam_DB.json      JSON array of element documents
//! ├── Column_DB.json
//! └── *.json.lock       present only while an update is in flight
//! ```
//!
//! ## Document Shape
//!
//! ```json
//! {
//!   "ElementName": "Beam1",
//!   "ElementProperty": [
//!     { "PropertyName": "b_w", "PropertyUnit": "mm", "PropertyValue": 300.0 }
//!   ]
//! }
//! ```
//!
//! Fields outside this shape (e.g. `_id`) are carried through untouched when a
//! partition is rewritten, and so is the integer or float form of every
//! `PropertyValue` except the one being updated. A missing partition file reads as an empty partition.
//!
//! ## Saves
//!
//! Updates lock the partition, re-read it, change one value, write to a
//! `.tmp` sibling, fsync and rename over the original. File operations run
//! inline; the session never has two commands in flight.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::debug;

use super::lock::PartitionLock;
use super::PropertyStore;
use crate::elements::{ElementProperty, Partition};
use crate::errors::{DesignError, DesignResult};

/// Default database name
pub const DEFAULT_DATABASE: &str = "DesignStandard_DB";

const FILE_SCHEME: &str = "file://";

/// Persisted element document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDocument {
    #[serde(rename = "ElementName")]
    pub element_name: String,

    #[serde(rename = "ElementProperty", default)]
    pub properties: Vec<PropertyTriple>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Persisted `{PropertyName, PropertyUnit, PropertyValue}` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyTriple {
    #[serde(rename = "PropertyName")]
    pub name: String,

    #[serde(rename = "PropertyUnit")]
    pub unit: String,

    /// Kept as written so untouched integers stay integers on save
    #[serde(rename = "PropertyValue")]
    pub value: Number,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<&PropertyTriple> for ElementProperty {
    fn from(triple: &PropertyTriple) -> Self {
        ElementProperty::new(triple.name.clone(), triple.unit.clone(), triple.numeric_value())
    }
}

impl PropertyTriple {
    /// Value as a float. JSON numbers without arbitrary precision always convert.
    pub fn numeric_value(&self) -> f64 {
        self.value.as_f64().unwrap_or(f64::NAN)
    }
}

impl ElementDocument {
    pub fn element_properties(&self) -> Vec<ElementProperty> {
        self.properties.iter().map(ElementProperty::from).collect()
    }
}

/// File-backed store rooted at `<root>/<database>`.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    database_dir: PathBuf,
}

impl DocumentStore {
    /// Connect to a database.
    ///
    /// Accepts `file://<dir>` or a bare directory path. Other schemes
    /// (`mongodb://`, `http://`, ...) fail with `StoreUnavailable`. The
    /// database directory is created if it does not exist.
    pub fn connect(connection_string: &str, database: &str) -> DesignResult<Self> {
        let root = parse_connection_string(connection_string)?;
        let database_dir = root.join(database);
        fs::create_dir_all(&database_dir).map_err(|e| {
            DesignError::store_unavailable("connect", database_dir.display().to_string(), e.to_string())
        })?;
        debug!(path = %database_dir.display(), "document store connected");
        Ok(Self { database_dir })
    }

    /// Directory holding the partition files
    pub fn database_dir(&self) -> &Path {
        &self.database_dir
    }

    /// Path of a partition's collection file
    pub fn partition_path(&self, partition: Partition) -> PathBuf {
        self.database_dir
            .join(format!("{}.json", partition.collection_name()))
    }

    /// Read every document in a partition.
    pub fn load_partition(&self, partition: Partition) -> DesignResult<Vec<ElementDocument>> {
        let path = self.partition_path(partition);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(DesignError::store_unavailable(
                    "read",
                    path.display().to_string(),
                    e.to_string(),
                ))
            }
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents).map_err(|e| DesignError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })
    }

    /// Replace a partition's documents with atomic write semantics.
    ///
    /// Callers updating existing data should hold the [`PartitionLock`].
    pub fn save_partition(&self, partition: Partition, documents: &[ElementDocument]) -> DesignResult<()> {
        let path = self.partition_path(partition);
        let json = serde_json::to_string_pretty(documents).map_err(|e| DesignError::SerializationError {
            reason: e.to_string(),
        })?;

        let tmp_path = path.with_extension("json.tmp");
        let mut tmp_file = File::create(&tmp_path).map_err(|e| {
            DesignError::store_unavailable("create temp file", tmp_path.display().to_string(), e.to_string())
        })?;
        tmp_file.write_all(json.as_bytes()).map_err(|e| {
            DesignError::store_unavailable("write temp file", tmp_path.display().to_string(), e.to_string())
        })?;
        tmp_file.sync_all().map_err(|e| {
            DesignError::store_unavailable("sync temp file", tmp_path.display().to_string(), e.to_string())
        })?;

        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            DesignError::store_unavailable("rename to final", path.display().to_string(), e.to_string())
        })
    }
}

fn parse_connection_string(connection_string: &str) -> DesignResult<PathBuf> {
    let trimmed = connection_string.trim();
    if let Some(path) = trimmed.strip_prefix(FILE_SCHEME) {
        return Ok(PathBuf::from(path));
    }
    if let Some((scheme, _)) = trimmed.split_once("://") {
        return Err(DesignError::store_unavailable(
            "connect",
            trimmed,
            format!("unsupported scheme '{}', expected a file:// connection string", scheme),
        ));
    }
    if trimmed.is_empty() {
        return Err(DesignError::store_unavailable("connect", trimmed, "empty connection string"));
    }
    Ok(PathBuf::from(trimmed))
}

#[async_trait]
impl PropertyStore for DocumentStore {
    async fn partition_names(&self, partition: Partition) -> DesignResult<Vec<String>> {
        Ok(self
            .load_partition(partition)?
            .into_iter()
            .map(|doc| doc.element_name)
            .collect())
    }

    async fn find_element(
        &self,
        partition: Partition,
        element_name: &str,
    ) -> DesignResult<Option<Vec<ElementProperty>>> {
        Ok(self
            .load_partition(partition)?
            .iter()
            .find(|doc| doc.element_name == element_name)
            .map(ElementDocument::element_properties))
    }

    async fn write_property(
        &self,
        partition: Partition,
        element_name: &str,
        property_name: &str,
        value: f64,
    ) -> DesignResult<Option<bool>> {
        let number = Number::from_f64(value).ok_or_else(|| DesignError::invalid_value(value.to_string()))?;
        let _lock = PartitionLock::acquire(&self.partition_path(partition))?;

        let mut documents = self.load_partition(partition)?;
        let Some(document) = documents.iter_mut().find(|doc| doc.element_name == element_name) else {
            return Ok(None);
        };
        let Some(triple) = document
            .properties
            .iter_mut()
            .find(|t| t.name.eq_ignore_ascii_case(property_name))
        else {
            return Ok(Some(false));
        };

        triple.value = number;
        self.save_partition(partition, &documents)?;
        Ok(Some(true))
    }
}
