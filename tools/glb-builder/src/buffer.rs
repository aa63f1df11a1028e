//! Binary buffer packing with automatic alignment and accessor creation

use crate::utils::{align_buffer, compute_bounds};
use gltf_json as json;
use gltf_json::validation::Checked::Valid;

/// Accessor index returned by buffer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessorIndex(pub u32);

impl AccessorIndex {
    pub fn as_json_index(&self) -> json::Index<json::Accessor> {
        json::Index::new(self.0)
    }
}

/// Builder for the single embedded buffer of a GLB
pub struct BufferBuilder {
    buffer: Vec<u8>,
    views: Vec<json::buffer::View>,
    accessors: Vec<json::Accessor>,
}

impl BufferBuilder {
    /// Create a new empty buffer builder
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            views: Vec::new(),
            accessors: Vec::new(),
        }
    }

    /// Get the binary buffer data
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the buffer views
    pub fn views(&self) -> &[json::buffer::View] {
        &self.views
    }

    /// Get the accessors
    pub fn accessors(&self) -> &[json::Accessor] {
        &self.accessors
    }

    /// Pack tightly laid out Vec3 positions with min/max bounds
    pub fn pack_positions(&mut self, positions: &[[f32; 3]]) -> AccessorIndex {
        let (min, max) = compute_bounds(positions);
        self.pack_vec3(positions, Some((min, max)))
    }

    /// Pack Vec3 positions without min/max (older exporters omit them)
    pub fn pack_positions_unbounded(&mut self, positions: &[[f32; 3]]) -> AccessorIndex {
        self.pack_vec3(positions, None)
    }

    /// Pack positions and normals interleaved in one view (stride 24).
    ///
    /// Returns `(positions, normals)` accessors sharing the view.
    pub fn pack_interleaved(
        &mut self,
        positions: &[[f32; 3]],
        normals: &[[f32; 3]],
    ) -> (AccessorIndex, AccessorIndex) {
        assert_eq!(positions.len(), normals.len(), "attribute count mismatch");

        let offset = self.buffer.len();
        for (pos, normal) in positions.iter().zip(normals) {
            self.buffer.extend_from_slice(bytemuck::cast_slice(pos));
            self.buffer.extend_from_slice(bytemuck::cast_slice(normal));
        }

        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: (positions.len() * 24).into(),
            byte_offset: Some((offset as u64).into()),
            byte_stride: Some(json::buffer::Stride(24)),
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: Some(Valid(json::buffer::Target::ArrayBuffer)),
        });
        let view = self.views.len() as u32 - 1;

        let (min, max) = compute_bounds(positions);
        let positions_idx = self.push_accessor(
            view,
            0,
            positions.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            Some((min, max)),
        );
        let normals_idx = self.push_accessor(
            view,
            12,
            normals.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            None,
        );

        align_buffer(&mut self.buffer);
        (positions_idx, normals_idx)
    }

    /// Pack u16 indices
    pub fn pack_indices_u16(&mut self, indices: &[u16]) -> AccessorIndex {
        let bytes: Vec<u8> = indices.iter().flat_map(|i| i.to_le_bytes()).collect();
        self.pack_indices(&bytes, indices.len(), json::accessor::ComponentType::U16)
    }

    /// Pack u32 indices, for meshes with more than 65535 vertices
    pub fn pack_indices_u32(&mut self, indices: &[u32]) -> AccessorIndex {
        let bytes: Vec<u8> = indices.iter().flat_map(|i| i.to_le_bytes()).collect();
        self.pack_indices(&bytes, indices.len(), json::accessor::ComponentType::U32)
    }

    fn pack_indices(
        &mut self,
        bytes: &[u8],
        count: usize,
        component_type: json::accessor::ComponentType,
    ) -> AccessorIndex {
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytes);

        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: bytes.len().into(),
            byte_offset: Some((offset as u64).into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: Some(Valid(json::buffer::Target::ElementArrayBuffer)),
        });
        let view = self.views.len() as u32 - 1;

        let accessor_idx = self.push_accessor(
            view,
            0,
            count,
            component_type,
            json::accessor::Type::Scalar,
            None,
        );

        align_buffer(&mut self.buffer);
        accessor_idx
    }

    fn pack_vec3(
        &mut self,
        data: &[[f32; 3]],
        bounds: Option<(Vec<f32>, Vec<f32>)>,
    ) -> AccessorIndex {
        let offset = self.buffer.len();
        for item in data {
            self.buffer.extend_from_slice(bytemuck::cast_slice(item));
        }

        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: (data.len() * 12).into(),
            byte_offset: Some((offset as u64).into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: Some(Valid(json::buffer::Target::ArrayBuffer)),
        });
        let view = self.views.len() as u32 - 1;

        let accessor_idx = self.push_accessor(
            view,
            0,
            data.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            bounds,
        );

        align_buffer(&mut self.buffer);
        accessor_idx
    }

    fn push_accessor(
        &mut self,
        view: u32,
        byte_offset: u64,
        count: usize,
        component_type: json::accessor::ComponentType,
        type_: json::accessor::Type,
        bounds: Option<(Vec<f32>, Vec<f32>)>,
    ) -> AccessorIndex {
        let (min, max) = match bounds {
            Some((min, max)) => (
                Some(json::Value::Array(
                    min.into_iter().map(json::Value::from).collect(),
                )),
                Some(json::Value::Array(
                    max.into_iter().map(json::Value::from).collect(),
                )),
            ),
            None => (None, None),
        };

        let accessor_idx = self.accessors.len() as u32;
        self.accessors.push(json::Accessor {
            buffer_view: Some(json::Index::new(view)),
            byte_offset: Some(byte_offset.into()),
            count: count.into(),
            component_type: Valid(json::accessor::GenericComponentType(component_type)),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(type_),
            min,
            max,
            name: None,
            normalized: false,
            sparse: None,
        });
        AccessorIndex(accessor_idx)
    }
}

impl Default for BufferBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_positions_sets_bounds() {
        let mut builder = BufferBuilder::new();
        let idx = builder.pack_positions(&[[0.0, 0.0, 0.0], [1.0, 2.0, 3.0]]);

        assert_eq!(idx, AccessorIndex(0));
        assert_eq!(builder.data().len(), 24);
        let accessor = &builder.accessors()[0];
        assert!(accessor.min.is_some());
        assert!(accessor.max.is_some());
    }

    #[test]
    fn test_pack_interleaved_shares_view() {
        let mut builder = BufferBuilder::new();
        let (pos, normal) = builder.pack_interleaved(
            &[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]],
            &[[0.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        );

        assert_eq!(pos, AccessorIndex(0));
        assert_eq!(normal, AccessorIndex(1));
        assert_eq!(builder.views().len(), 1);
        assert_eq!(builder.data().len(), 48);
    }

    #[test]
    fn test_pack_indices_alignment() {
        let mut builder = BufferBuilder::new();
        let idx = builder.pack_indices_u16(&[0, 1, 2]);

        assert_eq!(idx, AccessorIndex(0));
        // 3 indices * 2 bytes = 6 bytes, aligned to 8
        assert_eq!(builder.data().len(), 8);
    }

    #[test]
    fn test_pack_indices_u32() {
        let mut builder = BufferBuilder::new();
        builder.pack_positions(&[[0.0; 3]; 3]);
        let idx = builder.pack_indices_u32(&[0, 1, 70_000]);

        assert_eq!(idx, AccessorIndex(1));
        assert_eq!(builder.data().len(), 36 + 12);
        assert_eq!(&builder.data()[44..48], &70_000u32.to_le_bytes());
    }
}
