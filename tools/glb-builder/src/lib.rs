//! GLB generation utilities for the cabinet asset tools
//!
//! Builds small, fully valid GLB files in memory so tools can be tested
//! against the same node layouts Blender exports for the cabinet models:
//! - BufferBuilder: Pack positions and indices with automatic alignment
//! - GltfBuilder: Meshes, materials, node hierarchy and scene
//! - assemble_glb: Header + JSON chunk + BIN chunk
//!
//! # Example
//!
//! ```
//! use glb_builder::*;
//!
//! let mut buffer = BufferBuilder::new();
//! let positions = buffer.pack_positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]]);
//! let indices = buffer.pack_indices_u16(&[0, 1, 2]);
//!
//! let mut gltf = GltfBuilder::new();
//! let mesh = gltf.add_mesh("Triangle", positions, Some(indices), None);
//! let node = gltf.add_node(NodeSpec::named("BODY").mesh(mesh));
//! gltf.add_scene("Scene", &[node]);
//!
//! let root = gltf.build(&buffer, "glb-builder");
//! let glb_bytes = assemble_glb(&root, buffer.data());
//! assert_eq!(&glb_bytes[0..4], b"glTF");
//! ```

pub mod buffer;
pub mod document;
pub mod shapes;
pub mod utils;

pub use buffer::{AccessorIndex, BufferBuilder};
pub use document::{GltfBuilder, NodeSpec};
pub use utils::{align_buffer, assemble_glb, compute_bounds};

// Re-export commonly used gltf-json types
pub use gltf_json as json;
pub use gltf_json::validation::Checked::Valid;
