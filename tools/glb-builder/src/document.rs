//! GLTF document construction

use crate::buffer::{AccessorIndex, BufferBuilder};
use gltf_json as json;
use gltf_json::validation::Checked::Valid;
use std::collections::BTreeMap;

/// Description of a node before it is turned into JSON
#[derive(Debug, Clone, Default)]
pub struct NodeSpec {
    pub name: Option<String>,
    pub mesh: Option<u32>,
    pub children: Vec<u32>,
    pub translation: Option<[f32; 3]>,
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
}

impl NodeSpec {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn mesh(mut self, mesh: u32) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn children(mut self, children: &[u32]) -> Self {
        self.children = children.to_vec();
        self
    }

    pub fn translation(mut self, translation: [f32; 3]) -> Self {
        self.translation = Some(translation);
        self
    }

    pub fn rotation(mut self, rotation: [f32; 4]) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = Some(scale);
        self
    }
}

/// Builder for complete GLTF documents
pub struct GltfBuilder {
    nodes: Vec<json::Node>,
    meshes: Vec<json::Mesh>,
    materials: Vec<json::Material>,
    scenes: Vec<json::Scene>,
}

impl GltfBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            meshes: Vec::new(),
            materials: Vec::new(),
            scenes: Vec::new(),
        }
    }

    /// Add a PBR material, returns its index
    pub fn add_material(&mut self, name: &str, base_color: [f32; 4]) -> u32 {
        let alpha_mode = if base_color[3] < 1.0 {
            json::material::AlphaMode::Blend
        } else {
            json::material::AlphaMode::Opaque
        };

        self.materials.push(json::Material {
            name: Some(name.to_string()),
            alpha_mode: Valid(alpha_mode),
            pbr_metallic_roughness: json::material::PbrMetallicRoughness {
                base_color_factor: json::material::PbrBaseColorFactor(base_color),
                ..Default::default()
            },
            ..Default::default()
        });
        self.materials.len() as u32 - 1
    }

    /// Add a single-primitive triangle mesh, returns its index
    pub fn add_mesh(
        &mut self,
        name: &str,
        positions: AccessorIndex,
        indices: Option<AccessorIndex>,
        material: Option<u32>,
    ) -> u32 {
        self.add_mesh_with_primitives(name, &[(positions, indices, material)])
    }

    /// Add a mesh with several primitives `(positions, indices, material)`
    pub fn add_mesh_with_primitives(
        &mut self,
        name: &str,
        primitives: &[(AccessorIndex, Option<AccessorIndex>, Option<u32>)],
    ) -> u32 {
        let primitives = primitives
            .iter()
            .map(|(positions, indices, material)| {
                let mut attributes = BTreeMap::new();
                attributes.insert(
                    Valid(json::mesh::Semantic::Positions),
                    positions.as_json_index(),
                );

                json::mesh::Primitive {
                    attributes,
                    extensions: Default::default(),
                    extras: Default::default(),
                    indices: indices.map(|i| i.as_json_index()),
                    material: material.map(json::Index::new),
                    mode: Valid(json::mesh::Mode::Triangles),
                    targets: None,
                }
            })
            .collect();

        self.meshes.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            primitives,
            weights: None,
        });
        self.meshes.len() as u32 - 1
    }

    /// Add a node, returns its index
    pub fn add_node(&mut self, spec: NodeSpec) -> u32 {
        self.nodes.push(json::Node {
            camera: None,
            children: if spec.children.is_empty() {
                None
            } else {
                Some(spec.children.iter().map(|c| json::Index::new(*c)).collect())
            },
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: spec.mesh.map(json::Index::new),
            name: spec.name,
            rotation: spec.rotation.map(json::scene::UnitQuaternion),
            scale: spec.scale,
            skin: None,
            translation: spec.translation,
            weights: None,
        });
        self.nodes.len() as u32 - 1
    }

    /// Add a scene
    pub fn add_scene(&mut self, name: &str, root_nodes: &[u32]) {
        self.scenes.push(json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            nodes: root_nodes.iter().map(|n| json::Index::new(*n)).collect(),
        });
    }

    /// Build final GLTF Root referencing the packed buffer
    pub fn build(self, buffer: &BufferBuilder, generator: &str) -> json::Root {
        let buffers = vec![json::Buffer {
            byte_length: (buffer.data().len() as u64).into(),
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            uri: None,
        }];

        json::Root {
            accessors: buffer.accessors().to_vec(),
            animations: Vec::new(),
            asset: json::Asset {
                copyright: None,
                extensions: Default::default(),
                extras: Default::default(),
                generator: Some(generator.to_string()),
                min_version: None,
                version: "2.0".to_string(),
            },
            buffers,
            buffer_views: buffer.views().to_vec(),
            cameras: Vec::new(),
            extensions: Default::default(),
            extensions_required: Vec::new(),
            extensions_used: Vec::new(),
            extras: Default::default(),
            images: Vec::new(),
            materials: self.materials,
            meshes: self.meshes,
            nodes: self.nodes,
            samplers: Vec::new(),
            scene: if self.scenes.is_empty() {
                None
            } else {
                Some(json::Index::new(0))
            },
            scenes: self.scenes,
            skins: Vec::new(),
            textures: Vec::new(),
        }
    }
}

impl Default for GltfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gltf_builder_hierarchy() {
        let mut buffer = BufferBuilder::new();
        let positions = buffer.pack_positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]]);

        let mut gltf = GltfBuilder::new();
        let material = gltf.add_material("Steel", [0.75, 0.75, 0.75, 1.0]);
        let mesh = gltf.add_mesh("Triangle", positions, None, Some(material));
        let child = gltf.add_node(NodeSpec::named("BODY_mesh").mesh(mesh));
        let group = gltf.add_node(NodeSpec::named("BODY").children(&[child]));
        gltf.add_scene("Scene", &[group]);

        let root = gltf.build(&buffer, "test");

        assert_eq!(root.meshes.len(), 1);
        assert_eq!(root.nodes.len(), 2);
        assert_eq!(root.materials.len(), 1);
        assert_eq!(root.scenes[0].nodes.len(), 1);
        assert_eq!(root.asset.version, "2.0");
    }
}
