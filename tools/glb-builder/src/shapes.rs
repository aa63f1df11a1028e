//! Ready-made geometry and a cabinet-shaped test asset

use crate::{BufferBuilder, GltfBuilder, NodeSpec, assemble_glb};

/// Axis-aligned box as 8 corners and 12 triangles
pub fn box_mesh(min: [f32; 3], max: [f32; 3]) -> (Vec<[f32; 3]>, Vec<u16>) {
    let [x0, y0, z0] = min;
    let [x1, y1, z1] = max;
    let positions = vec![
        [x0, y0, z0],
        [x1, y0, z0],
        [x1, y1, z0],
        [x0, y1, z0],
        [x0, y0, z1],
        [x1, y0, z1],
        [x1, y1, z1],
        [x0, y1, z1],
    ];
    #[rustfmt::skip]
    let indices = vec![
        0, 2, 1, 0, 3, 2, // back
        4, 5, 6, 4, 6, 7, // front
        0, 1, 5, 0, 5, 4, // bottom
        3, 7, 6, 3, 6, 2, // top
        0, 4, 7, 0, 7, 3, // left
        1, 2, 6, 1, 6, 5, // right
    ];
    (positions, indices)
}

/// Outer size of [`cabinet_glb`] before scaling: 0.7 x 0.5 x 0.24
pub const CABINET_SIZE: [f32; 3] = [0.7, 0.5, 0.24];

/// Offset of the cabinet's minimum corner, so the asset is neither
/// centred nor standing on the floor.
pub const CABINET_MIN: [f32; 3] = [0.1, 0.2, -0.02];

/// A small cabinet laid out like a Blender export.
///
/// ```text
/// Cabinet (group)
/// ├── BODY (group) ── BODY_mesh (mesh 0)
/// ├── DOOR (mesh 1, translated)
/// ├── DIN_RAIL_40.001 (mesh 2)
/// └── Light (empty)
/// ```
///
/// Coordinates are multiplied by `scale` (1.0 = metres, 1000.0 = mm).
pub fn cabinet_glb(scale: f32) -> Vec<u8> {
    let s = |v: [f32; 3]| [v[0] * scale, v[1] * scale, v[2] * scale];
    let min = CABINET_MIN;
    let max = [
        min[0] + CABINET_SIZE[0],
        min[1] + CABINET_SIZE[1],
        min[2] + CABINET_SIZE[2],
    ];

    let mut buffer = BufferBuilder::new();

    let (body, body_idx) = box_mesh(s(min), s(max));
    let body_pos = buffer.pack_positions(&body);
    let body_indices = buffer.pack_indices_u16(&body_idx);

    let (door, door_idx) = box_mesh(
        s([min[0], min[1], max[2] - 0.02]),
        s([max[0], max[1], max[2]]),
    );
    let door_pos = buffer.pack_positions(&door);
    let door_indices = buffer.pack_indices_u16(&door_idx);

    let (rail, rail_idx) = box_mesh(
        s([min[0] + 0.05, min[1] + 0.2, min[2] + 0.02]),
        s([max[0] - 0.05, min[1] + 0.235, min[2] + 0.03]),
    );
    let rail_pos = buffer.pack_positions(&rail);
    let rail_indices = buffer.pack_indices_u16(&rail_idx);

    let mut gltf = GltfBuilder::new();
    let body_material = gltf.add_material("CabinetBody", [0.85, 0.85, 0.85, 1.0]);
    let rail_material = gltf.add_material("MetalRail", [0.75, 0.75, 0.75, 1.0]);
    let glass_material = gltf.add_material("DoorGlass", [0.6, 0.7, 0.8, 0.4]);

    let body_mesh = gltf.add_mesh("BODY", body_pos, Some(body_indices), Some(body_material));
    let door_mesh = gltf.add_mesh("DOOR", door_pos, Some(door_indices), Some(glass_material));
    let rail_mesh = gltf.add_mesh(
        "DIN_RAIL_40",
        rail_pos,
        Some(rail_indices),
        Some(rail_material),
    );

    let body_child = gltf.add_node(NodeSpec::named("BODY_mesh").mesh(body_mesh));
    let body_group = gltf.add_node(NodeSpec::named("BODY").children(&[body_child]));
    let door_node = gltf.add_node(
        NodeSpec::named("DOOR")
            .mesh(door_mesh)
            .translation([0.0, 0.0, 0.001 * scale]),
    );
    let rail_node = gltf.add_node(NodeSpec::named("DIN_RAIL_40.001").mesh(rail_mesh));
    let light = gltf.add_node(NodeSpec::named("Light"));
    let root = gltf.add_node(
        NodeSpec::named("Cabinet").children(&[body_group, door_node, rail_node, light]),
    );
    gltf.add_scene("Scene", &[root]);

    let document = gltf.build(&buffer, "glb-builder");
    assemble_glb(&document, buffer.data())
}
