//! FreeCAD component schemas
//!
//! A cabinet folder holds one JSON file per component. Only the vertex data
//! matters here: the overall cabinet size is taken from the largest absolute
//! coordinate on each axis across every component.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cabinet_shared::fs::{MAX_SCHEMA_BYTES, read_text_with_limit};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// FreeCAD exports coordinates in metres
const METERS_TO_MM: f64 = 1000.0;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no vertices array")]
    NoVertices,

    #[error("flat vertex array length {0} is not a multiple of 3")]
    Ragged(usize),

    #[error("vertex {0} is not a number or an [x, y, z] triple")]
    BadVertex(usize),
}

/// One component schema file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    pub filename: String,
    pub stem: String,
    /// Property name under `this.components`
    pub var_name: String,
}

impl Component {
    pub fn from_filename(filename: &str) -> Self {
        let stem = filename.strip_suffix(".json").unwrap_or(filename).to_string();
        let var_name = stem.replace(['-', ' '], "_");
        Self {
            filename: filename.to_string(),
            stem,
            var_name,
        }
    }
}

/// Every `*.json` file in `dir`, sorted by file name
pub fn analyze_components(dir: &Path) -> Result<Vec<Component>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read folder: {}", dir.display()))?;

    let mut filenames = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            filenames.push(name.to_string());
        }
    }
    filenames.sort();

    Ok(filenames.iter().map(|f| Component::from_filename(f)).collect())
}

/// Cabinet size in whole millimetres
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CabinetDimensions {
    pub width: i64,
    pub height: i64,
    pub depth: i64,
}

impl CabinetDimensions {
    /// Convert a per-axis extent in metres
    pub fn from_extent_m(extent: [f64; 3]) -> Self {
        let [x, y, z] = extent.map(|v| (v * METERS_TO_MM).round() as i64);
        Self {
            width: x,
            height: y,
            depth: z,
        }
    }
}

impl fmt::Display for CabinetDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}×{}", self.width, self.height, self.depth)
    }
}

fn include(extent: &mut [f64; 3], x: f64, y: f64, z: f64) {
    for (axis, v) in extent.iter_mut().zip([x, y, z]) {
        *axis = axis.max(v.abs());
    }
}

fn number(value: &Value, index: usize) -> Result<f64, SchemaError> {
    value.as_f64().ok_or(SchemaError::BadVertex(index))
}

/// Fold one `vertices` array into `extent`.
///
/// Accepts the flat `[x, y, z, x, y, z, ...]` layout and the nested
/// `[[x, y, z], ...]` layout.
fn include_vertices(vertices: &[Value], extent: &mut [f64; 3]) -> Result<(), SchemaError> {
    match vertices.first() {
        None => Ok(()),
        Some(Value::Array(_)) => {
            for (i, vertex) in vertices.iter().enumerate() {
                match vertex.as_array().map(Vec::as_slice) {
                    Some([x, y, z]) => include(extent, number(x, i)?, number(y, i)?, number(z, i)?),
                    _ => return Err(SchemaError::BadVertex(i)),
                }
            }
            Ok(())
        }
        Some(_) => {
            if vertices.len() % 3 != 0 {
                return Err(SchemaError::Ragged(vertices.len()));
            }
            for (i, xyz) in vertices.chunks_exact(3).enumerate() {
                include(extent, number(&xyz[0], i)?, number(&xyz[1], i)?, number(&xyz[2], i)?);
            }
            Ok(())
        }
    }
}

/// Largest absolute X/Y/Z of one schema document, in metres.
///
/// Vertices live either in a top-level `vertices` array or in
/// `objects[].geometry.vertices` (the BufferGeometry export layout).
pub fn schema_extent(schema: &Value) -> Result<[f64; 3], SchemaError> {
    let mut extent = [0.0; 3];

    if let Some(vertices) = schema.get("vertices").and_then(Value::as_array) {
        include_vertices(vertices, &mut extent)?;
        return Ok(extent);
    }

    let objects = schema.get("objects").and_then(Value::as_array);
    let mut found = false;
    for object in objects.into_iter().flatten() {
        if let Some(vertices) = object
            .pointer("/geometry/vertices")
            .and_then(Value::as_array)
        {
            include_vertices(vertices, &mut extent)?;
            found = true;
        }
    }

    if found {
        Ok(extent)
    } else {
        Err(SchemaError::NoVertices)
    }
}

fn component_extent(path: &Path) -> Result<[f64; 3]> {
    let text = read_text_with_limit(path, MAX_SCHEMA_BYTES)?;
    let schema = serde_json::from_str::<Value>(&text).map_err(SchemaError::from)?;
    Ok(schema_extent(&schema)?)
}

/// Cabinet size over every component in `dir`.
///
/// A component that cannot be read is reported and left out.
pub fn calculate_dimensions(dir: &Path, components: &[Component]) -> CabinetDimensions {
    let mut extent = [0.0f64; 3];

    for component in components {
        let path: PathBuf = dir.join(&component.filename);
        match component_extent(&path) {
            Ok(part) => {
                debug!("{}: {:?} m", component.filename, part);
                for (axis, v) in extent.iter_mut().zip(part) {
                    *axis = axis.max(v);
                }
            }
            Err(e) => warn!("Could not read {}: {:#}", component.filename, e),
        }
    }

    CabinetDimensions::from_extent_m(extent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_var_name() {
        let c = Component::from_filename("din-rail 40.json");
        assert_eq!(c.stem, "din-rail 40");
        assert_eq!(c.var_name, "din_rail_40");
    }

    #[test]
    fn test_flat_vertices() {
        let schema = json!({ "vertices": [0.35, -0.25, 0.1, -0.4, 0.2, 0.0] });
        assert_eq!(schema_extent(&schema).unwrap(), [0.4, 0.25, 0.1]);
    }

    #[test]
    fn test_nested_vertices() {
        let schema = json!({ "vertices": [[0.1, 0.2, -0.3], [-0.5, 0.0, 0.0]] });
        assert_eq!(schema_extent(&schema).unwrap(), [0.5, 0.2, 0.3]);
    }

    #[test]
    fn test_objects_layout() {
        let schema = json!({
            "metadata": { "version": "1.0" },
            "objects": [
                { "name": "a", "geometry": { "vertices": [[0.6, 0.0, 0.0]] } },
                { "name": "b", "geometry": { "vertices": [0.0, 0.7, 0.0] } },
                { "name": "empty" }
            ]
        });
        assert_eq!(schema_extent(&schema).unwrap(), [0.6, 0.7, 0.0]);
    }

    #[test]
    fn test_malformed_schemas() {
        assert!(matches!(
            schema_extent(&json!({ "faces": [] })),
            Err(SchemaError::NoVertices)
        ));
        assert!(matches!(
            schema_extent(&json!({ "vertices": [1.0, 2.0] })),
            Err(SchemaError::Ragged(2))
        ));
        assert!(matches!(
            schema_extent(&json!({ "vertices": [[1.0, 2.0, 3.0], [1.0, "x", 3.0]] })),
            Err(SchemaError::BadVertex(1))
        ));
    }

    #[test]
    fn test_dimensions_round_to_mm() {
        let dims = CabinetDimensions::from_extent_m([0.7004, 0.4996, 0.25]);
        assert_eq!(dims, CabinetDimensions { width: 700, height: 500, depth: 250 });
        assert_eq!(dims.to_string(), "700×500×250");
    }
}
