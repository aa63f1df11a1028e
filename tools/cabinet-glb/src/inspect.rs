//! Full model report: structure, materials, geometry and viewer hints

use std::fmt;

use anyhow::Result;
use cabinet_shared::Units;
use gltf_json as json;
use json::mesh::Semantic;
use json::validation::Checked::Valid;
use serde::Serialize;

use crate::bounds::Bounds;
use crate::model::{ContainerInfo, Model};

/// The viewer's camera sits this many diagonals away from the model
pub const CAMERA_DISTANCE_MULTIPLIER: f32 = 2.5;

/// Centre offsets below this (model units) count as centred
const CENTER_TOLERANCE: f32 = 1.0;
/// `min.y` below this (model units) counts as standing on the floor
const FLOOR_TOLERANCE: f32 = 0.1;

#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub container: ContainerInfo,
    pub generator: Option<String>,
    pub gltf_version: String,
    pub counts: Counts,
    pub nodes: Vec<NodeInfo>,
    /// Indented scene tree, one line per node
    pub hierarchy: Vec<String>,
    pub meshes: Vec<MeshInfo>,
    pub materials: Vec<MaterialInfo>,
    /// "Node: X" / "Mesh: Y" for every named node and mesh
    pub names: Vec<String>,
    pub geometry: Option<GeometryInfo>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Counts {
    pub scenes: usize,
    pub nodes: usize,
    pub meshes: usize,
    pub materials: usize,
    pub textures: usize,
    pub animations: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeInfo {
    pub index: usize,
    pub name: String,
    pub kind: String,
    pub translation: Option<[f32; 3]>,
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
    pub children: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeshInfo {
    pub index: usize,
    pub name: String,
    pub primitives: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaterialInfo {
    pub index: usize,
    pub name: String,
    pub base_color: [f32; 4],
    pub base_texture: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeometryInfo {
    pub vertex_count: usize,
    pub bounds: Bounds,
    pub size: [f32; 3],
    pub center: [f32; 3],
    pub diagonal: f32,
    pub units: Units,
    pub size_mm: [f32; 3],
    pub centered_xz: bool,
    pub on_floor: bool,
    /// Uniform scale the viewer must apply to show the model in mm
    pub viewer_scale: f32,
    pub camera_distance_mm: f32,
}

/// Kind label the way the configurator's loaders classify nodes
pub fn node_kind(node: &json::Node) -> String {
    if let Some(mesh) = node.mesh {
        format!("Mesh #{}", mesh.value())
    } else if node.camera.is_some() {
        "Camera".to_string()
    } else if node.children.as_ref().is_some_and(|c| !c.is_empty()) {
        "Group".to_string()
    } else {
        "Empty".to_string()
    }
}

fn node_name(node: &json::Node, index: usize) -> String {
    node.name.clone().unwrap_or_else(|| format!("Node_{index}"))
}

pub fn inspect(model: &Model) -> Result<InspectReport> {
    let root = &model.root;

    let counts = Counts {
        scenes: root.scenes.len(),
        nodes: root.nodes.len(),
        meshes: root.meshes.len(),
        materials: root.materials.len(),
        textures: root.textures.len(),
        animations: root.animations.len(),
    };

    let nodes = root
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| NodeInfo {
            index,
            name: node_name(node, index),
            kind: node_kind(node),
            translation: node.translation,
            rotation: node.rotation.as_ref().map(|r| r.0),
            scale: node.scale,
            children: node
                .children
                .iter()
                .flatten()
                .map(|c| c.value())
                .collect(),
        })
        .collect();

    let meshes = root
        .meshes
        .iter()
        .enumerate()
        .map(|(index, mesh)| MeshInfo {
            index,
            name: mesh.name.clone().unwrap_or_else(|| format!("Mesh_{index}")),
            primitives: mesh.primitives.len(),
        })
        .collect();

    let materials = root
        .materials
        .iter()
        .enumerate()
        .map(|(index, material)| {
            let pbr = &material.pbr_metallic_roughness;
            MaterialInfo {
                index,
                name: material
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Material_{index}")),
                base_color: pbr.base_color_factor.0,
                base_texture: pbr.base_color_texture.as_ref().map(|t| t.index.value()),
            }
        })
        .collect();

    let names = root
        .nodes
        .iter()
        .filter_map(|n| n.name.as_ref().map(|name| format!("Node: {name}")))
        .chain(
            root.meshes
                .iter()
                .filter_map(|m| m.name.as_ref().map(|name| format!("Mesh: {name}"))),
        )
        .collect();

    let positions = model.read_positions()?;
    let geometry = Bounds::from_points(positions.iter().copied())
        .map(|bounds| geometry_info(positions.len(), bounds));
    let recommendations = geometry.as_ref().map(recommend).unwrap_or_default();

    Ok(InspectReport {
        container: model.container,
        generator: root.asset.generator.clone(),
        gltf_version: root.asset.version.clone(),
        counts,
        nodes,
        hierarchy: hierarchy(root),
        meshes,
        materials,
        names,
        geometry,
        recommendations,
    })
}

pub fn geometry_info(vertex_count: usize, bounds: Bounds) -> GeometryInfo {
    let size = bounds.size();
    let center = bounds.center();
    let diagonal = bounds.diagonal();
    let units = Units::from_diagonal(diagonal);
    let factor = units.to_mm_factor();

    GeometryInfo {
        vertex_count,
        bounds,
        size: size.to_array(),
        center: center.to_array(),
        diagonal,
        units,
        size_mm: (size * factor).to_array(),
        centered_xz: center.x.abs() < CENTER_TOLERANCE && center.z.abs() < CENTER_TOLERANCE,
        on_floor: bounds.min.y.abs() < FLOOR_TOLERANCE,
        viewer_scale: factor,
        camera_distance_mm: diagonal * CAMERA_DISTANCE_MULTIPLIER * factor,
    }
}

fn recommend(geometry: &GeometryInfo) -> Vec<String> {
    let mut out = Vec::new();
    let s = geometry.viewer_scale;
    match geometry.units {
        Units::Millimeters => out.push("Model is already in millimetres, no scaling needed".into()),
        units => out.push(format!(
            "Model was exported in {units}: set this.model.scale.set({s}, {s}, {s})"
        )),
    }
    if !geometry.centered_xz {
        out.push(format!(
            "Model is offset on X/Z by ({:.2}, {:.2}): re-centre the origin",
            geometry.center[0], geometry.center[2]
        ));
    }
    if !geometry.on_floor {
        out.push(format!(
            "Model does not stand on the floor (Y min = {:.2}): move the origin to the bottom centre",
            geometry.bounds.min.y
        ));
    }
    out.push(format!(
        "Camera distance: distanceMultiplier = {CAMERA_DISTANCE_MULTIPLIER} (about {:.0} mm)",
        geometry.camera_distance_mm
    ));
    out
}

/// Scene tree starting at the default scene (or scene 0)
pub fn hierarchy(root: &json::Root) -> Vec<String> {
    let scene = root.scene.map(|s| s.value()).unwrap_or(0);
    let Some(scene) = root.scenes.get(scene) else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    lines.push(scene.name.clone().unwrap_or_else(|| "Scene".to_string()));
    let mut path = Vec::new();
    for node in &scene.nodes {
        walk(root, node.value(), 1, &mut path, &mut lines);
    }
    lines
}

fn walk(
    root: &json::Root,
    index: usize,
    depth: usize,
    path: &mut Vec<usize>,
    lines: &mut Vec<String>,
) {
    let Some(node) = root.nodes.get(index) else {
        return;
    };
    // Guard against malformed files with cycles
    if path.contains(&index) {
        return;
    }

    let indent = "  ".repeat(depth);
    let mut line = format!("{indent}{} [{}]", node_name(node, index), node_kind(node));
    if let Some(mesh) = node.mesh.and_then(|m| root.meshes.get(m.value())) {
        let vertices: u64 = mesh
            .primitives
            .iter()
            .filter_map(|p| p.attributes.get(&Valid(Semantic::Positions)))
            .filter_map(|a| root.accessors.get(a.value()))
            .map(|a| a.count.0)
            .sum();
        line.push_str(&format!(" ({vertices} vertices)"));
    }
    lines.push(line);

    path.push(index);
    for child in node.children.iter().flatten() {
        walk(root, child.value(), depth + 1, path, lines);
    }
    path.pop();
}

fn fmt_vec(v: &[f32]) -> String {
    let parts: Vec<String> = v.iter().map(|c| format!("{c:.4}")).collect();
    format!("({})", parts.join(", "))
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.container;
        writeln!(f, "GLB version {}, {} bytes", c.version, c.file_size)?;
        writeln!(f, "  JSON chunk: {} bytes", c.json_len)?;
        writeln!(f, "  BIN chunk:  {} bytes", c.bin_len)?;
        writeln!(
            f,
            "Generator: {} (glTF {})",
            self.generator.as_deref().unwrap_or("N/A"),
            self.gltf_version
        )?;

        let n = &self.counts;
        writeln!(f)?;
        writeln!(f, "Scenes: {}", n.scenes)?;
        writeln!(f, "Nodes: {}", n.nodes)?;
        writeln!(f, "Meshes: {}", n.meshes)?;
        writeln!(f, "Materials: {}", n.materials)?;
        writeln!(f, "Textures: {}", n.textures)?;
        writeln!(f, "Animations: {}", n.animations)?;

        writeln!(f, "\nNodes:")?;
        for node in &self.nodes {
            writeln!(f, "  [{}] {} ({})", node.index, node.name, node.kind)?;
            if let Some(t) = node.translation {
                writeln!(f, "      Position: {}", fmt_vec(&t))?;
            }
            if let Some(r) = node.rotation {
                writeln!(f, "      Rotation: {}", fmt_vec(&r))?;
            }
            if let Some(s) = node.scale {
                writeln!(f, "      Scale: {}", fmt_vec(&s))?;
            }
            if !node.children.is_empty() {
                writeln!(f, "      Children: {:?}", node.children)?;
            }
        }

        if !self.hierarchy.is_empty() {
            writeln!(f, "\nHierarchy:")?;
            for line in &self.hierarchy {
                writeln!(f, "  {line}")?;
            }
        }

        writeln!(f, "\nMeshes:")?;
        for mesh in &self.meshes {
            writeln!(f, "  [{}] {} ({} primitives)", mesh.index, mesh.name, mesh.primitives)?;
        }

        if !self.materials.is_empty() {
            writeln!(f, "\nMaterials:")?;
            for material in &self.materials {
                let [r, g, b, a] = material.base_color;
                writeln!(
                    f,
                    "  [{}] {} base color RGBA({r:.2}, {g:.2}, {b:.2}, {a:.2})",
                    material.index, material.name
                )?;
                if let Some(texture) = material.base_texture {
                    writeln!(f, "      Base texture: {texture}")?;
                }
            }
        }

        writeln!(f, "\nNames:")?;
        for name in &self.names {
            writeln!(f, "  - {name}")?;
        }

        writeln!(f, "\nBounding box:")?;
        match &self.geometry {
            Some(g) => {
                writeln!(f, "  Vertices: {}", g.vertex_count)?;
                writeln!(f, "  Min: {}", fmt_vec(&g.bounds.min.to_array()))?;
                writeln!(f, "  Max: {}", fmt_vec(&g.bounds.max.to_array()))?;
                writeln!(f, "  Center: {}", fmt_vec(&g.center))?;
                writeln!(
                    f,
                    "  Size: {:.4} x {:.4} x {:.4}",
                    g.size[0], g.size[1], g.size[2]
                )?;
                writeln!(f, "  Diagonal: {:.4}", g.diagonal)?;
                writeln!(
                    f,
                    "  Units: {} ({:.0} x {:.0} x {:.0} mm)",
                    g.units, g.size_mm[0], g.size_mm[1], g.size_mm[2]
                )?;
                writeln!(
                    f,
                    "  Centered on X/Z: {}",
                    if g.centered_xz { "yes" } else { "no" }
                )?;
                writeln!(f, "  On floor: {}", if g.on_floor { "yes" } else { "no" })?;
            }
            None => writeln!(f, "  No vertex data")?,
        }

        if !self.recommendations.is_empty() {
            writeln!(f, "\nRecommendations:")?;
            for (i, rec) in self.recommendations.iter().enumerate() {
                writeln!(f, "  {}. {rec}", i + 1)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_geometry_info_meters() {
        let bounds = Bounds {
            min: Vec3::new(-0.35, 0.0, -0.12),
            max: Vec3::new(0.35, 0.5, 0.12),
        };
        let info = geometry_info(8, bounds);
        assert_eq!(info.units, Units::Meters);
        assert!((info.size_mm[0] - 700.0).abs() < 0.01);
        assert!(info.centered_xz);
        assert!(info.on_floor);
        assert!((info.camera_distance_mm - info.diagonal * 2500.0).abs() < 0.01);
    }

    #[test]
    fn test_geometry_info_offset_millimetres() {
        let bounds = Bounds {
            min: Vec3::new(100.0, 200.0, -20.0),
            max: Vec3::new(800.0, 700.0, 220.0),
        };
        let info = geometry_info(8, bounds);
        assert_eq!(info.units, Units::Millimeters);
        assert_eq!(info.viewer_scale, 1.0);
        assert!(!info.centered_xz);
        assert!(!info.on_floor);

        let recs = recommend(&info);
        assert!(recs[0].contains("already in millimetres"));
        assert!(recs.iter().any(|r| r.contains("re-centre")));
        assert!(recs.iter().any(|r| r.contains("floor")));
    }

    #[test]
    fn test_node_kind() {
        let node: json::Node =
            serde_json::from_str(r#"{"name":"BODY","children":[1]}"#).unwrap();
        assert_eq!(node_kind(&node), "Group");
        let node: json::Node = serde_json::from_str(r#"{"mesh":3}"#).unwrap();
        assert_eq!(node_kind(&node), "Mesh #3");
        let node: json::Node = serde_json::from_str(r#"{"name":"Light"}"#).unwrap();
        assert_eq!(node_kind(&node), "Empty");
    }
}
