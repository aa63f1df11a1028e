//! Three.js BufferGeometry JSON export
//!
//! Produces the same `{metadata, objects}` layout the configurator's
//! `FreeCADGeometryLoader` reads, so GLB parts can be loaded alongside
//! FreeCAD exports. Vertices are baked into world space.
//!
//! With an edge angle set, each object also carries line segments for its
//! outline: boundary edges plus every edge whose two faces meet at or above
//! the angle.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use serde::Serialize;
use tracing::debug;

use crate::model::Model;

pub const EXPORT_GENERATOR: &str = "cabinet-glb export-json";
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// Crease angle used by `--edges` when none is given, in degrees
pub const DEFAULT_EDGE_ANGLE: f32 = 30.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Decimals to round coordinates to
    pub precision: Option<u32>,
    /// Crease angle in degrees; `None` skips edge extraction
    pub edge_angle: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeometryExport {
    pub metadata: Metadata,
    pub objects: Vec<ExportObject>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub generator: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_angle: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportObject {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub visible: bool,
    pub geometry: Geometry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges: Option<Edges>,
}

/// Outline segments as `[start, end]` pairs
#[derive(Debug, Clone, Serialize)]
pub struct Edges {
    pub lines: Vec<[[f32; 3]; 2]>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub vertices: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub vertex_count: usize,
    pub triangle_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

fn round_to(value: f32, factor: f32) -> f32 {
    (value * factor).round() / factor
}

/// Collect every triangle primitive reachable from the default scene.
///
/// `model` has already been validated on load; POSITION min/max may be
/// absent, which the reader does not need.
pub fn export_geometry(model: &Model, options: ExportOptions) -> Result<GeometryExport> {
    let document = gltf::Document::from_json_without_validation(model.root.clone());

    let mut objects = Vec::new();
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());
    if let Some(scene) = scene {
        for node in scene.nodes() {
            collect(model, &node, Mat4::IDENTITY, options, &mut objects, 0);
        }
    }

    Ok(GeometryExport {
        metadata: Metadata {
            generator: EXPORT_GENERATOR.to_string(),
            version: EXPORT_FORMAT_VERSION.to_string(),
            precision: options.precision,
            edge_angle: options.edge_angle,
        },
        objects,
    })
}

fn collect(
    model: &Model,
    node: &gltf::Node<'_>,
    parent: Mat4,
    options: ExportOptions,
    objects: &mut Vec<ExportObject>,
    depth: usize,
) {
    // A valid node graph is a forest, so depth never exceeds the node count
    if depth > model.root.nodes.len() {
        return;
    }
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Node_{}", node.index()));

    if let Some(mesh) = node.mesh() {
        let primitive_count = mesh.primitives().len();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                debug!("Skipping non-triangle primitive in '{}'", name);
                continue;
            }
            let object_name = if primitive_count > 1 {
                format!("{}_{}", name, primitive.index())
            } else {
                name.clone()
            };
            if let Some(object) = primitive_object(model, &primitive, world, options, object_name) {
                objects.push(object);
            }
        }
    }

    for child in node.children() {
        collect(model, &child, world, options, objects, depth + 1);
    }
}

fn primitive_object(
    model: &Model,
    primitive: &gltf::Primitive<'_>,
    world: Mat4,
    options: ExportOptions,
    name: String,
) -> Option<ExportObject> {
    let reader = primitive.reader(|buffer| model.buffers.get(buffer.index()).map(Vec::as_slice));
    let factor = options.precision.map(|p| 10f32.powi(p as i32));

    let vertices: Vec<[f32; 3]> = reader
        .read_positions()?
        .map(|p| {
            let w = world.transform_point3(p.into()).to_array();
            match factor {
                Some(f) => w.map(|c| round_to(c, f)),
                None => w,
            }
        })
        .collect();

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };

    let material = primitive.material();
    let (color, opacity) = match material.index() {
        Some(_) => {
            let [r, g, b, a] = material.pbr_metallic_roughness().base_color_factor();
            (Some(Color { r, g, b }), Some(a))
        }
        None => (None, None),
    };

    let edges = options.edge_angle.map(|angle| {
        let lines = feature_edges(&vertices, &indices, angle);
        Edges {
            count: lines.len(),
            lines,
        }
    });

    Some(ExportObject {
        name,
        kind: "Mesh".to_string(),
        visible: true,
        geometry: Geometry {
            kind: "BufferGeometry".to_string(),
            vertex_count: vertices.len(),
            triangle_count: indices.len() / 3,
            vertices,
            indices,
        },
        color,
        opacity,
        edges,
    })
}

/// Bit pattern of a position, with -0.0 folded into 0.0
fn weld_key(p: [f32; 3]) -> [u32; 3] {
    p.map(|c| (c + 0.0).to_bits())
}

/// Boundary edges and creases of at least `angle_deg` degrees.
///
/// Vertices are welded by exact position first, so split normals or UV
/// seams do not turn every triangle border into a boundary. Segments come
/// out ordered by welded vertex id.
pub fn feature_edges(
    vertices: &[[f32; 3]],
    indices: &[u32],
    angle_deg: f32,
) -> Vec<[[f32; 3]; 2]> {
    let mut welded: HashMap<[u32; 3], u32> = HashMap::new();
    let mut points: Vec<Vec3> = Vec::new();
    let remap: Vec<u32> = vertices
        .iter()
        .map(|&p| {
            *welded.entry(weld_key(p)).or_insert_with(|| {
                points.push(Vec3::from_array(p));
                points.len() as u32 - 1
            })
        })
        .collect();

    let mut normals = Vec::new();
    let mut faces_by_edge: BTreeMap<(u32, u32), Vec<usize>> = BTreeMap::new();
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| remap.get(i as usize));
        let (Some(&a), Some(&b), Some(&c)) = (a, b, c) else {
            continue;
        };
        if a == b || b == c || a == c {
            continue;
        }
        let (pa, pb, pc) = (points[a as usize], points[b as usize], points[c as usize]);
        let face = normals.len();
        normals.push((pb - pa).cross(pc - pa).normalize_or_zero());
        for (u, v) in [(a, b), (b, c), (c, a)] {
            faces_by_edge.entry((u.min(v), u.max(v))).or_default().push(face);
        }
    }

    let threshold = angle_deg.to_radians();
    faces_by_edge
        .into_iter()
        .filter(|(_, faces)| match faces.as_slice() {
            [_] => true,
            [f0, f1] => {
                let cos = normals[*f0].dot(normals[*f1]).clamp(-1.0, 1.0);
                cos.acos() >= threshold
            }
            // Non-manifold edges are always drawn
            _ => true,
        })
        .map(|((u, v), _)| [points[u as usize].to_array(), points[v as usize].to_array()])
        .collect()
}

/// Serialise the export, pretty printed unless `compact`
pub fn to_json(export: &GeometryExport, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(export)
    } else {
        serde_json::to_string_pretty(export)
    };
    json.context("Failed to serialize geometry JSON")
}

impl GeometryExport {
    pub fn total_vertices(&self) -> usize {
        self.objects.iter().map(|o| o.geometry.vertex_count).sum()
    }

    pub fn total_triangles(&self) -> usize {
        self.objects.iter().map(|o| o.geometry.triangle_count).sum()
    }
}
