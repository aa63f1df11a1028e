//! Cabinet catalog (`catalog.json`)

use std::path::Path;

use anyhow::{Context, Result};
use cabinet_shared::fs::{MAX_SCHEMA_BYTES, read_text_with_limit, write_creating_dirs};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::schema::CabinetDimensions;

/// Catalog entry for one generated cabinet class
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub class_name: String,
    pub module_path: String,
    pub dimensions: CabinetDimensions,
    pub mounting_type: String,
    pub description: String,
}

impl CatalogEntry {
    pub fn new(class_name: &str, dimensions: CabinetDimensions, mounting_type: &str) -> Self {
        Self {
            id: class_name.to_string(),
            name: format!("Cabinet {}", class_name.replace('_', " ")),
            class_name: class_name.to_string(),
            module_path: format!("../cabinets/{0}/{0}.js", class_name),
            dimensions,
            mounting_type: mounting_type.to_string(),
            description: format!("Cabinet {} mm (generated)", dimensions),
        }
    }
}

/// Entries are kept as raw JSON so hand-written fields survive a rewrite
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub cabinets: Vec<Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Catalog {
    /// Load a catalog; a missing file is an empty catalog
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = read_text_with_limit(path, MAX_SCHEMA_BYTES)?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse catalog: {}", path.display()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.cabinets
            .iter()
            .filter_map(|c| c.get("id").and_then(Value::as_str))
    }

    /// Append `entry`, dropping any entry with the same id first.
    ///
    /// Returns true when an entry was replaced.
    pub fn upsert(&mut self, entry: &CatalogEntry) -> Result<bool> {
        let before = self.cabinets.len();
        self.cabinets
            .retain(|c| c.get("id").and_then(Value::as_str) != Some(entry.id.as_str()));
        let replaced = self.cabinets.len() != before;
        self.cabinets
            .push(serde_json::to_value(entry).context("Failed to serialize catalog entry")?);
        Ok(replaced)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize catalog")?;
        write_creating_dirs(path, json)
    }
}

/// Add or replace `entry` in the catalog at `path`
pub fn update_catalog(path: &Path, entry: &CatalogEntry) -> Result<()> {
    let mut catalog = Catalog::load(path)?;
    if catalog.upsert(entry)? {
        warn!(
            "Cabinet '{}' already exists in the catalog, replacing it",
            entry.id
        );
    }
    catalog.save(path)
}
