//! Knowledge store - external name tables for decoded identifiers
//!
//! The surrounding application maintains a knowledge base mapping
//! identifiers (DIDs, routine IDs, DTCs, ECU addresses) to names. The
//! engine only reads from it: the store is populated once per decoding
//! session, from YAML definition files or in memory, and never mutated
//! afterwards.
//!
//! # YAML Definition Files
//!
//! ```yaml
//! meta:
//!   name: Demo vehicle
//!   version: "1.0"
//!
//! dids:
//!   F190: VIN
//!   F187: Spare Part Number
//!
//! routines:
//!   0203: Injector quantity test
//!
//! ecus:
//!   "1726": Body Control Module
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreResult;

/// Identifier namespace within the knowledge base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeKind {
    /// Routine IDs (UDS 0x31)
    Routine,
    /// Data identifiers (UDS 0x22/0x2E)
    Did,
    /// Trouble codes, keyed by canonical code or raw hex
    Dtc,
    /// ECU bus addresses
    Ecu,
}

/// Metadata about a knowledge definition file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreMeta {
    /// Name of the definition set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Version string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// On-disk shape of a knowledge definition file
#[derive(Debug, Deserialize)]
struct DefinitionFile {
    meta: Option<StoreMeta>,
    routines: Option<HashMap<String, String>>,
    dids: Option<HashMap<String, String>>,
    dtcs: Option<HashMap<String, String>>,
    ecus: Option<HashMap<String, String>>,
}

/// Read-only name tables: kind -> upper-hex identifier -> name
#[derive(Debug, Default)]
pub struct KnowledgeStore {
    tables: HashMap<KnowledgeKind, HashMap<String, String>>,
    meta: StoreMeta,
}

impl KnowledgeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a YAML definition file.
    pub fn from_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load a store from a YAML string.
    pub fn from_yaml(yaml: &str) -> CoreResult<Self> {
        let file: DefinitionFile = serde_yaml::from_str(yaml)?;
        let mut store = Self::new();

        if let Some(meta) = file.meta {
            store.meta = meta;
        }

        let sections = [
            (KnowledgeKind::Routine, file.routines),
            (KnowledgeKind::Did, file.dids),
            (KnowledgeKind::Dtc, file.dtcs),
            (KnowledgeKind::Ecu, file.ecus),
        ];
        for (kind, entries) in sections {
            if let Some(entries) = entries {
                for (id, name) in entries {
                    store.insert(kind, &id, name);
                }
            }
        }

        Ok(store)
    }

    /// Register a name. Identifiers are upper-cased on the way in so
    /// lookups are case-insensitive.
    pub fn insert(&mut self, kind: KnowledgeKind, identifier: &str, name: impl Into<String>) {
        self.tables
            .entry(kind)
            .or_default()
            .insert(identifier.to_ascii_uppercase(), name.into());
    }

    /// Resolve an identifier to its name.
    ///
    /// For routines, a miss with an identifier longer than 4 hex chars
    /// retries with the first 4 - captured routine IDs often carry an
    /// instance or sub-function suffix the knowledge base does not key
    /// on. A miss is `None`, never an error; callers render it as
    /// "Not identified".
    pub fn resolve(&self, kind: KnowledgeKind, identifier: &str) -> Option<&str> {
        let table = self.tables.get(&kind)?;
        let id = identifier.to_ascii_uppercase();

        if let Some(name) = table.get(&id) {
            return Some(name.as_str());
        }

        if kind == KnowledgeKind::Routine && id.len() > 4 {
            if let Some(name) = table.get(&id[..4]) {
                return Some(name.as_str());
            }
        }

        debug!(?kind, identifier = %id, "knowledge lookup miss");
        None
    }

    /// Metadata from the definition file, if any.
    pub fn meta(&self) -> &StoreMeta {
        &self.meta
    }

    /// Total number of entries across all kinds.
    pub fn len(&self) -> usize {
        self.tables.values().map(HashMap::len).sum()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
