//! Size of the first mesh from its POSITION accessor bounds

use std::fmt;

use cabinet_shared::Dimensions;
use glam::Vec3;
use gltf_json as json;
use json::mesh::Semantic;
use json::validation::Checked::Valid;
use serde::Serialize;

use crate::model::ContainerInfo;
use crate::vertices::{accessor_bounds, describe_accessor};

/// Sizes along X below this are read as metres
const METERS_SIZE_LIMIT: f32 = 10.0;

#[derive(Debug, Clone, Serialize)]
pub struct MeasureReport {
    pub container: ContainerInfo,
    pub mesh_name: Option<String>,
    pub accessor: Option<PositionAccessor>,
    pub expected: Dimensions,
    pub expected_diagonal: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionAccessor {
    pub index: usize,
    pub count: u64,
    /// `TYPE/COMPONENT`, e.g. `VEC3/F32`
    pub format: String,
    pub buffer_view: Option<usize>,
    /// Absent when the accessor carries no `min`/`max`
    pub extent: Option<Extent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Extent {
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub size: [f32; 3],
    pub diagonal: f32,
    pub looks_like_meters: bool,
    /// Expected diagonal / measured diagonal
    pub scale_factor: f32,
}

/// Measure the first primitive of the first mesh against `expected` (mm)
pub fn measure(root: &json::Root, container: ContainerInfo, expected: Dimensions) -> MeasureReport {
    let expected_diagonal = expected.diagonal();
    let first_mesh = root.meshes.first();

    let accessor = first_mesh
        .and_then(|mesh| mesh.primitives.first())
        .and_then(|primitive| primitive.attributes.get(&Valid(Semantic::Positions)))
        .and_then(|index| {
            let acc = root.accessors.get(index.value())?;
            Some(PositionAccessor {
                index: index.value(),
                count: acc.count.0,
                format: describe_accessor(acc),
                buffer_view: acc.buffer_view.map(|v| v.value()),
                extent: accessor_bounds(acc).map(|(min, max)| extent(min, max, expected_diagonal)),
            })
        });

    MeasureReport {
        container,
        mesh_name: first_mesh.map(|m| m.name.clone().unwrap_or_else(|| "(unnamed)".into())),
        accessor,
        expected,
        expected_diagonal,
    }
}

fn extent(min: [f32; 3], max: [f32; 3], expected_diagonal: f32) -> Extent {
    let size = Vec3::from(max) - Vec3::from(min);
    let diagonal = size.length();
    Extent {
        min,
        max,
        size: size.to_array(),
        diagonal,
        looks_like_meters: size.x < METERS_SIZE_LIMIT,
        scale_factor: if diagonal > 0.0 {
            expected_diagonal / diagonal
        } else {
            0.0
        },
    }
}

impl fmt::Display for MeasureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GLB version: {}", self.container.version)?;
        writeln!(f, "File size: {} bytes", self.container.length)?;
        writeln!(f, "JSON chunk: {} bytes", self.container.json_len)?;
        writeln!(f, "BIN chunk: {} bytes", self.container.bin_len)?;

        let Some(mesh_name) = &self.mesh_name else {
            return writeln!(f, "\nNo meshes in model");
        };
        writeln!(f, "\nFirst mesh: {mesh_name}")?;

        let Some(acc) = &self.accessor else {
            return writeln!(f, "First primitive has no POSITION accessor");
        };
        writeln!(f, "\nPOSITION accessor #{}:", acc.index)?;
        writeln!(f, "  Count: {} vertices", acc.count)?;
        writeln!(f, "  Format: {}", acc.format)?;
        if let Some(view) = acc.buffer_view {
            writeln!(f, "  BufferView: {view}")?;
        }

        let Some(e) = &acc.extent else {
            return writeln!(f, "  min/max: absent");
        };
        writeln!(f, "\nBounds (from accessor):")?;
        writeln!(f, "  Min: [{:.6}, {:.6}, {:.6}]", e.min[0], e.min[1], e.min[2])?;
        writeln!(f, "  Max: [{:.6}, {:.6}, {:.6}]", e.max[0], e.max[1], e.max[2])?;

        let [x, y, z] = e.size;
        writeln!(f, "\nSize:")?;
        writeln!(f, "  X (width):  {x:.6} units")?;
        writeln!(f, "  Y (height): {y:.6} units")?;
        writeln!(f, "  Z (depth):  {z:.6} units")?;
        writeln!(f, "  Diagonal:   {:.6} units", e.diagonal)?;

        writeln!(f, "\nIf units are metres:")?;
        writeln!(f, "  {:.1} x {:.1} x {:.1} mm", x * 1000.0, y * 1000.0, z * 1000.0)?;
        writeln!(f, "If units are millimetres:")?;
        writeln!(f, "  {x:.1} x {y:.1} x {z:.1} mm")?;

        writeln!(f, "\nExpected cabinet: {}", self.expected)?;
        writeln!(f, "Expected diagonal: {:.1} mm", self.expected_diagonal)?;
        if e.looks_like_meters {
            writeln!(f, "GLB is in metres -> scaleFactor ~ {:.1}", e.scale_factor)
        } else {
            writeln!(f, "GLB is in millimetres -> scaleFactor ~ {:.3}", e.scale_factor)
        }
    }
}
