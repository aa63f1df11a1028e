//! Lift the named cabinet parts to the top level and drop everything else

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use gltf_json as json;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize)]
pub struct FlattenReport {
    pub nodes_before: usize,
    pub nodes_after: usize,
    pub meshes: usize,
    pub kept: Vec<KeptNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeptNode {
    pub name: String,
    pub mesh: Option<usize>,
    /// Mesh was taken from a child because the node itself is a group
    pub mesh_from_child: bool,
}

fn flat_node(root: &json::Root, node: &json::Node) -> (json::Node, bool) {
    let (mesh, from_child) = match node.mesh {
        Some(mesh) => (Some(mesh), false),
        None => {
            let child_mesh = node
                .children
                .iter()
                .flatten()
                .filter_map(|c| root.nodes.get(c.value()))
                .find_map(|c| c.mesh);
            (child_mesh, child_mesh.is_some())
        }
    };

    let flat = json::Node {
        camera: None,
        children: None,
        extensions: Default::default(),
        extras: Default::default(),
        matrix: node.matrix,
        mesh,
        name: node.name.clone(),
        rotation: node.rotation,
        scale: node.scale,
        skin: None,
        translation: node.translation,
        weights: None,
    };
    (flat, from_child)
}

/// Keep only nodes named in `keep` (all mesh nodes when `keep` is empty),
/// each as a root node of scene 0.
pub fn flatten(root: &mut json::Root, keep: &[String]) -> FlattenReport {
    let keep: BTreeSet<&str> = keep.iter().map(String::as_str).collect();
    let nodes_before = root.nodes.len();

    let mut remap = BTreeMap::new();
    let mut new_nodes = Vec::new();
    let mut kept = Vec::new();

    for (index, node) in root.nodes.iter().enumerate() {
        let selected = if keep.is_empty() {
            node.mesh.is_some()
        } else {
            node.name.as_deref().is_some_and(|n| keep.contains(n))
        };
        if !selected {
            continue;
        }

        let (flat, mesh_from_child) = flat_node(root, node);
        let name = flat.name.clone().unwrap_or_else(|| format!("Node_{index}"));
        debug!("Keeping node {} -> {}", index, new_nodes.len());
        if flat.mesh.is_none() {
            warn!("Kept node '{}' has no mesh", name);
        }

        kept.push(KeptNode {
            name,
            mesh: flat.mesh.map(|m| m.value()),
            mesh_from_child,
        });
        remap.insert(index, new_nodes.len() as u32);
        new_nodes.push(flat);
    }

    for name in &keep {
        if !kept.iter().any(|k| k.name == *name) {
            warn!("No node named '{}' found", name);
        }
    }

    let count = new_nodes.len() as u32;
    root.nodes = new_nodes;

    for (i, scene) in root.scenes.iter_mut().enumerate() {
        scene.nodes = if i == 0 {
            (0..count).map(json::Index::new).collect()
        } else {
            scene
                .nodes
                .iter()
                .filter_map(|n| remap.get(&n.value()).map(|&m| json::Index::new(m)))
                .collect()
        };
    }

    // Flattened nodes carry no skins, and animations may only target kept nodes
    root.skins.clear();
    for animation in &mut root.animations {
        animation
            .channels
            .retain_mut(|channel| match remap.get(&channel.target.node.value()) {
                Some(&new) => {
                    channel.target.node = json::Index::new(new);
                    true
                }
                None => false,
            });
    }
    root.animations.retain(|a| !a.channels.is_empty());

    FlattenReport {
        nodes_before,
        nodes_after: root.nodes.len(),
        meshes: root.meshes.len(),
        kept,
    }
}

impl fmt::Display for FlattenReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Before: {} nodes, {} meshes", self.nodes_before, self.meshes)?;
        for node in &self.kept {
            match (node.mesh, node.mesh_from_child) {
                (Some(mesh), false) => writeln!(f, "  kept {} (mesh {mesh})", node.name)?,
                (Some(mesh), true) => {
                    writeln!(f, "  kept {} (mesh {mesh} from child)", node.name)?
                }
                (None, _) => writeln!(f, "  kept {} (no mesh)", node.name)?,
            }
        }
        writeln!(f, "After: {} nodes, all at top level", self.nodes_after)
    }
}
