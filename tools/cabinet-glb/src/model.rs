//! Loaded GLB document with resolved buffers and vertex access

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cabinet_shared::fs::{MAX_GLB_BYTES, read_file_with_limit, write_creating_dirs};
use gltf_json as json;
use json::validation::Checked;
use serde::Serialize;
use tracing::{debug, warn};

use crate::bounds::Bounds;
use crate::container::Glb;
use crate::vertices::{PositionSpan, VertexError, accessor_bounds, vec3_value};

/// Header facts about the file a model was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContainerInfo {
    pub file_size: usize,
    pub version: u32,
    pub length: u32,
    pub json_len: usize,
    pub bin_len: usize,
}

/// How much glTF validation a load applies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Validation {
    /// Full glTF validation, except that POSITION accessors may lack
    /// `min`/`max` (older exporters omit them and `adjust` rewrites them)
    #[default]
    Standard,
    /// Parse the JSON chunk as written, for read-only reports
    None,
}

/// A parsed glTF document plus the bytes of each of its buffers
#[derive(Debug, Clone)]
pub struct Model {
    pub root: json::Root,
    /// One entry per `root.buffers`, index aligned
    pub buffers: Vec<Vec<u8>>,
    pub container: ContainerInfo,
}

impl Model {
    /// Read, parse and validate a GLB file
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with(path, Validation::Standard)
    }

    pub fn load_with(path: &Path, validation: Validation) -> Result<Self> {
        let bytes = read_file_with_limit(path, MAX_GLB_BYTES)?;
        let base_dir = path.parent().unwrap_or(Path::new("."));
        Self::from_bytes_with(&bytes, base_dir, validation)
            .with_context(|| format!("Failed to load GLB: {}", path.display()))
    }

    /// Parse GLB bytes; external buffer URIs resolve against `base_dir`
    pub fn from_bytes(bytes: &[u8], base_dir: &Path) -> Result<Self> {
        Self::from_bytes_with(bytes, base_dir, Validation::Standard)
    }

    pub fn from_bytes_with(bytes: &[u8], base_dir: &Path, validation: Validation) -> Result<Self> {
        let glb = Glb::from_slice(bytes)?;
        let container = ContainerInfo {
            file_size: bytes.len(),
            version: glb.version,
            length: glb.length,
            json_len: glb.json_len(),
            bin_len: glb.bin_len(),
        };

        let root =
            serde_json::from_slice::<json::Root>(&glb.json).context("Invalid glTF JSON chunk")?;
        let root = match validation {
            Validation::Standard => validate(root)?,
            Validation::None => root,
        };

        let buffers = resolve_buffers(&root, glb.bin, base_dir)?;
        debug!(
            "Loaded {} nodes, {} meshes, {} buffers",
            root.nodes.len(),
            root.meshes.len(),
            buffers.len()
        );

        Ok(Self {
            root,
            buffers,
            container,
        })
    }

    /// Unique POSITION accessor indices in mesh/primitive order
    pub fn position_accessors(&self) -> Vec<usize> {
        position_accessors(&self.root)
    }

    /// Byte spans of every POSITION accessor, validated against the buffers
    pub fn position_spans(&self) -> Result<Vec<PositionSpan>, VertexError> {
        self.position_accessors()
            .into_iter()
            .map(|accessor| PositionSpan::resolve(&self.root, accessor, &self.buffers))
            .collect()
    }

    /// Every vertex position of every mesh, accessors concatenated in order
    pub fn read_positions(&self) -> Result<Vec<[f32; 3]>, VertexError> {
        let mut positions = Vec::new();
        for span in self.position_spans()? {
            positions.extend(span.read(&self.buffers[span.buffer]));
        }
        Ok(positions)
    }

    /// Write positions back in the order `read_positions` produced them and
    /// refresh each accessor's `min`/`max`.
    pub fn write_positions(&mut self, positions: &[[f32; 3]]) -> Result<(), VertexError> {
        let spans = self.position_spans()?;
        let expected: usize = spans.iter().map(|s| s.count).sum();
        if expected != positions.len() {
            return Err(VertexError::CountMismatch {
                expected,
                actual: positions.len(),
            });
        }

        let mut rest = positions;
        for span in spans {
            let (chunk, tail) = rest.split_at(span.count);
            rest = tail;
            span.write(&mut self.buffers[span.buffer], chunk);

            let accessor = &mut self.root.accessors[span.accessor];
            match Bounds::from_points(chunk.iter().copied()) {
                Some(bounds) => {
                    accessor.min = Some(vec3_value(bounds.min.to_array()));
                    accessor.max = Some(vec3_value(bounds.max.to_array()));
                }
                None => {
                    accessor.min = None;
                    accessor.max = None;
                }
            }
        }
        Ok(())
    }

    /// Union of the `min`/`max` declared on every POSITION accessor
    pub fn declared_bounds(&self) -> Option<Bounds> {
        declared_bounds(&self.root)
    }

    /// Serialise to a GLB. External buffers are written next to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json_bytes =
            json::serialize::to_vec(&self.root).context("Failed to serialize glTF")?;

        let mut bin = None;
        let out_dir = path.parent().unwrap_or(Path::new("."));
        for (buffer, data) in self.root.buffers.iter().zip(&self.buffers) {
            match buffer.uri.as_deref() {
                None => bin = Some(data.clone()),
                Some(uri) => {
                    let external = external_path(out_dir, uri)?;
                    write_creating_dirs(&external, data)?;
                    debug!("Wrote external buffer {:?}", external);
                }
            }
        }

        write_creating_dirs(path, Glb::new(json_bytes, bin).to_vec())
    }
}

/// Unique POSITION accessor indices in mesh/primitive order
pub fn position_accessors(root: &json::Root) -> Vec<usize> {
    let mut seen = BTreeSet::new();
    let mut order = Vec::new();
    for mesh in &root.meshes {
        for primitive in &mesh.primitives {
            let position = primitive
                .attributes
                .get(&Checked::Valid(json::mesh::Semantic::Positions));
            if let Some(index) = position
                && seen.insert(index.value())
            {
                order.push(index.value());
            }
        }
    }
    order
}

/// Union of the `min`/`max` declared on every POSITION accessor
pub fn declared_bounds(root: &json::Root) -> Option<Bounds> {
    position_accessors(root)
        .into_iter()
        .filter_map(|i| root.accessors.get(i).and_then(accessor_bounds))
        .flat_map(|(min, max)| [min, max])
        .fold(None, |acc: Option<Bounds>, p| {
            Some(match acc {
                Some(bounds) => bounds.including(p.into()),
                None => Bounds::point(p.into()),
            })
        })
}

fn is_missing_position_bound(path: &str, error: &json::validation::Error) -> bool {
    matches!(error, json::validation::Error::Missing)
        && path.contains("attributes[\"POSITION\"]")
        && (path.ends_with(".min") || path.ends_with(".max"))
}

fn validate(root: json::Root) -> Result<json::Root> {
    match gltf::Document::from_json(root.clone()) {
        Ok(document) => Ok(document.into_json()),
        Err(gltf::Error::Validation(errors)) => {
            let (unbounded, fatal): (Vec<_>, Vec<_>) = errors
                .into_iter()
                .partition(|(path, error)| is_missing_position_bound(path.as_str(), error));
            if !fatal.is_empty() {
                let details: Vec<String> = fatal
                    .iter()
                    .map(|(path, error)| format!("{}: {}", path, error))
                    .collect();
                anyhow::bail!("glTF document failed validation: {}", details.join("; "));
            }
            warn!("{} POSITION min/max entries missing", unbounded.len());
            Ok(root)
        }
        Err(e) => Err(e).context("glTF document failed validation"),
    }
}

fn external_path(base_dir: &Path, uri: &str) -> Result<PathBuf> {
    if uri.starts_with("data:") {
        anyhow::bail!("Embedded data: URI buffers are not supported");
    }
    Ok(base_dir.join(uri))
}

fn resolve_buffers(
    root: &json::Root,
    mut bin: Option<Vec<u8>>,
    base_dir: &Path,
) -> Result<Vec<Vec<u8>>> {
    let mut buffers = Vec::with_capacity(root.buffers.len());
    for (index, buffer) in root.buffers.iter().enumerate() {
        let data = match buffer.uri.as_deref() {
            None => bin
                .take()
                .with_context(|| format!("Buffer {index} refers to a missing BIN chunk"))?,
            Some(uri) => {
                let path = external_path(base_dir, uri)?;
                read_file_with_limit(&path, MAX_GLB_BYTES)
                    .with_context(|| format!("Failed to read external buffer {index}"))?
            }
        };

        let declared = buffer.byte_length.0 as usize;
        if data.len() < declared {
            anyhow::bail!(
                "Buffer {} declares {} bytes but only {} are available",
                index,
                declared,
                data.len()
            );
        }
        buffers.push(data);
    }
    Ok(buffers)
}
