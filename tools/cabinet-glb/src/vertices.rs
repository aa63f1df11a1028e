//! POSITION accessor resolution
//!
//! Follows accessor -> bufferView -> buffer to the byte range holding the
//! vertex positions. Only tightly packed or strided `VEC3`/`FLOAT` data is
//! handled, which covers everything Blender and FreeCAD export.

use gltf_json as json;
use json::accessor::{ComponentType, GenericComponentType, Type};
use json::validation::Checked;
use thiserror::Error;

/// Default distance between two VEC3 float elements
pub const VEC3_F32_STRIDE: usize = 12;

#[derive(Debug, Error)]
pub enum VertexError {
    #[error("accessor {0} does not exist")]
    MissingAccessor(usize),

    #[error("accessor {0} has no bufferView")]
    NoBufferView(usize),

    #[error("accessor {0} is sparse")]
    Sparse(usize),

    #[error("accessor {accessor} is not VEC3 float data ({found})")]
    Unsupported { accessor: usize, found: String },

    #[error("bufferView {view} of accessor {accessor} does not exist")]
    MissingView { accessor: usize, view: usize },

    #[error("buffer {buffer} of accessor {accessor} has no data")]
    MissingBuffer { accessor: usize, buffer: usize },

    #[error("accessor {accessor} reads up to byte {end} but buffer {buffer} has {len} bytes")]
    OutOfBounds {
        accessor: usize,
        buffer: usize,
        end: usize,
        len: usize,
    },

    #[error("expected {expected} positions, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
}

/// Byte location of one POSITION accessor's elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionSpan {
    pub accessor: usize,
    pub buffer: usize,
    /// Offset of element 0 within the buffer
    pub offset: usize,
    pub stride: usize,
    pub count: usize,
}

impl PositionSpan {
    /// Resolve the span for `accessor` and check it lies inside its buffer
    pub fn resolve(
        root: &json::Root,
        accessor: usize,
        buffers: &[Vec<u8>],
    ) -> Result<Self, VertexError> {
        let acc = root
            .accessors
            .get(accessor)
            .ok_or(VertexError::MissingAccessor(accessor))?;

        if acc.sparse.is_some() {
            return Err(VertexError::Sparse(accessor));
        }

        let is_f32 = matches!(
            acc.component_type,
            Checked::Valid(GenericComponentType(ComponentType::F32))
        );
        let is_vec3 = matches!(acc.type_, Checked::Valid(Type::Vec3));
        if !is_f32 || !is_vec3 {
            return Err(VertexError::Unsupported {
                accessor,
                found: describe_accessor(acc),
            });
        }

        let view_index = acc
            .buffer_view
            .ok_or(VertexError::NoBufferView(accessor))?
            .value();
        let view = root
            .buffer_views
            .get(view_index)
            .ok_or(VertexError::MissingView {
                accessor,
                view: view_index,
            })?;

        let buffer = view.buffer.value();
        let data = buffers
            .get(buffer)
            .ok_or(VertexError::MissingBuffer { accessor, buffer })?;

        let span = Self {
            accessor,
            buffer,
            offset: view.byte_offset.map(|o| o.0 as usize).unwrap_or(0)
                + acc.byte_offset.map(|o| o.0 as usize).unwrap_or(0),
            stride: view.byte_stride.map(|s| s.0).unwrap_or(VEC3_F32_STRIDE),
            count: acc.count.0 as usize,
        };

        let end = span.end();
        if end > data.len() {
            return Err(VertexError::OutOfBounds {
                accessor,
                buffer,
                end,
                len: data.len(),
            });
        }
        Ok(span)
    }

    /// One past the last byte touched by this span
    pub fn end(&self) -> usize {
        match self.count {
            0 => self.offset,
            n => self.offset + (n - 1) * self.stride + VEC3_F32_STRIDE,
        }
    }

    fn element(&self, i: usize) -> usize {
        self.offset + i * self.stride
    }

    /// Read every element of the span from its buffer
    pub fn read(&self, data: &[u8]) -> Vec<[f32; 3]> {
        (0..self.count)
            .map(|i| {
                let at = self.element(i);
                [
                    read_f32(data, at),
                    read_f32(data, at + 4),
                    read_f32(data, at + 8),
                ]
            })
            .collect()
    }

    /// Overwrite the span's elements in place
    pub fn write(&self, data: &mut [u8], values: &[[f32; 3]]) {
        for (i, value) in values.iter().take(self.count).enumerate() {
            let at = self.element(i);
            for (axis, component) in value.iter().enumerate() {
                data[at + axis * 4..at + axis * 4 + 4].copy_from_slice(&component.to_le_bytes());
            }
        }
    }
}

fn read_f32(data: &[u8], at: usize) -> f32 {
    f32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

/// Human readable `TYPE/componentType` pair for an accessor
pub fn describe_accessor(acc: &json::Accessor) -> String {
    let type_ = match acc.type_ {
        Checked::Valid(t) => format!("{t:?}").to_uppercase(),
        Checked::Invalid => "INVALID".to_string(),
    };
    let component = match acc.component_type {
        Checked::Valid(GenericComponentType(c)) => format!("{c:?}").to_uppercase(),
        Checked::Invalid => "INVALID".to_string(),
    };
    format!("{type_}/{component}")
}

/// Accessor `min`/`max` as vec3, when both are present and well formed
pub fn accessor_bounds(acc: &json::Accessor) -> Option<([f32; 3], [f32; 3])> {
    let min = vec3_from_value(acc.min.as_ref()?)?;
    let max = vec3_from_value(acc.max.as_ref()?)?;
    Some((min, max))
}

fn vec3_from_value(value: &json::Value) -> Option<[f32; 3]> {
    let items = value.as_array()?;
    if items.len() != 3 {
        return None;
    }
    let mut out = [0.0; 3];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item.as_f64()? as f32;
    }
    Some(out)
}

/// JSON array value for an accessor `min`/`max`
pub fn vec3_value(v: [f32; 3]) -> json::Value {
    json::Value::Array(v.iter().map(|c| json::Value::from(*c)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glb_builder::{BufferBuilder, GltfBuilder};

    fn root_with(buffer: &BufferBuilder) -> json::Root {
        GltfBuilder::new().build(buffer, "test")
    }

    #[test]
    fn test_resolve_tight_positions() {
        let mut buffer = BufferBuilder::new();
        buffer.pack_indices_u16(&[0, 1, 2]);
        let positions = buffer.pack_positions(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let root = root_with(&buffer);
        let data = vec![buffer.data().to_vec()];

        let span = PositionSpan::resolve(&root, positions.0 as usize, &data).unwrap();
        assert_eq!(span.offset, 8);
        assert_eq!(span.stride, 12);
        assert_eq!(span.count, 2);
        assert_eq!(span.end(), 32);
        assert_eq!(span.read(&data[0]), vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    }

    #[test]
    fn test_interleaved_stride_and_offset() {
        let mut buffer = BufferBuilder::new();
        let (positions, normals) = buffer.pack_interleaved(
            &[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
            &[[0.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        );
        let root = root_with(&buffer);
        let mut data = vec![buffer.data().to_vec()];

        let span = PositionSpan::resolve(&root, positions.0 as usize, &data).unwrap();
        assert_eq!(span.stride, 24);
        assert_eq!(span.read(&data[0]), vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);

        span.write(&mut data[0], &[[10.0, 20.0, 30.0], [40.0, 50.0, 60.0]]);
        assert_eq!(
            span.read(&data[0]),
            vec![[10.0, 20.0, 30.0], [40.0, 50.0, 60.0]]
        );

        // Normals in between were left alone
        let normal_span = PositionSpan::resolve(&root, normals.0 as usize, &data).unwrap();
        assert_eq!(normal_span.offset, 12);
        assert_eq!(normal_span.read(&data[0]), vec![[0.0, 1.0, 0.0]; 2]);
    }

    #[test]
    fn test_rejects_index_accessor() {
        let mut buffer = BufferBuilder::new();
        let indices = buffer.pack_indices_u16(&[0, 1, 2]);
        let root = root_with(&buffer);
        let data = vec![buffer.data().to_vec()];

        let err = PositionSpan::resolve(&root, indices.0 as usize, &data).unwrap_err();
        assert!(matches!(err, VertexError::Unsupported { .. }));
        assert!(err.to_string().contains("SCALAR/U16"));
    }

    #[test]
    fn test_rejects_missing_buffer_view() {
        let mut buffer = BufferBuilder::new();
        let positions = buffer.pack_positions(&[[0.0; 3]]);
        let mut root = root_with(&buffer);
        root.accessors[positions.0 as usize].buffer_view = None;

        let err = PositionSpan::resolve(&root, 0, &[buffer.data().to_vec()]).unwrap_err();
        assert!(matches!(err, VertexError::NoBufferView(0)));
    }

    #[test]
    fn test_rejects_read_past_buffer_end() {
        let mut buffer = BufferBuilder::new();
        buffer.pack_positions(&[[0.0; 3], [1.0; 3]]);
        let mut root = root_with(&buffer);
        root.accessors[0].count = 3usize.into();

        let err = PositionSpan::resolve(&root, 0, &[buffer.data().to_vec()]).unwrap_err();
        assert!(matches!(
            err,
            VertexError::OutOfBounds { end: 36, len: 24, .. }
        ));
    }

    #[test]
    fn test_accessor_bounds_parsing() {
        let mut buffer = BufferBuilder::new();
        buffer.pack_positions(&[[0.0, -1.0, 2.0], [3.0, 4.0, -5.0]]);
        buffer.pack_positions_unbounded(&[[0.0; 3]]);
        let root = root_with(&buffer);

        let (min, max) = accessor_bounds(&root.accessors[0]).unwrap();
        assert_eq!(min, [0.0, -1.0, -5.0]);
        assert_eq!(max, [3.0, 4.0, 2.0]);
        assert!(accessor_bounds(&root.accessors[1]).is_none());
    }
}
