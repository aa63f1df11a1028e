//! Utility functions for GLB construction

use gltf_json as json;

const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

/// Compute bounding box for positions
pub fn compute_bounds(positions: &[[f32; 3]]) -> (Vec<f32>, Vec<f32>) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];

    for pos in positions {
        for axis in 0..3 {
            min[axis] = min[axis].min(pos[axis]);
            max[axis] = max[axis].max(pos[axis]);
        }
    }

    (min.to_vec(), max.to_vec())
}

/// Align buffer to 4-byte boundary
pub fn align_buffer(buffer: &mut Vec<u8>) {
    let padded = buffer.len().next_multiple_of(4);
    buffer.resize(padded, 0);
}

/// Assemble GLB binary from a JSON root and the embedded buffer.
///
/// Panics if the root cannot be serialised, which only happens for
/// hand-built documents containing non-finite floats.
pub fn assemble_glb(root: &json::Root, buffer_data: &[u8]) -> Vec<u8> {
    let json_bytes = json::serialize::to_vec(root).expect("Failed to serialize GLTF JSON");

    let json_len = json_bytes.len().next_multiple_of(4);
    let bin_len = buffer_data.len().next_multiple_of(4);
    let total_length = 12 + 8 + json_len + 8 + bin_len;

    let mut glb = Vec::with_capacity(total_length);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_length as u32).to_le_bytes());

    write_chunk(&mut glb, CHUNK_JSON, &json_bytes, b' ');
    write_chunk(&mut glb, CHUNK_BIN, buffer_data, 0);

    glb
}

fn write_chunk(glb: &mut Vec<u8>, chunk_type: u32, payload: &[u8], pad: u8) {
    let padded_len = payload.len().next_multiple_of(4);
    glb.extend_from_slice(&(padded_len as u32).to_le_bytes());
    glb.extend_from_slice(&chunk_type.to_le_bytes());
    glb.extend_from_slice(payload);
    glb.resize(glb.len() + padded_len - payload.len(), pad);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_bounds_simple() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 2.0, 3.0], [-1.0, -2.0, -3.0]];
        let (min, max) = compute_bounds(&positions);
        assert_eq!(min, vec![-1.0, -2.0, -3.0]);
        assert_eq!(max, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_align_buffer() {
        let mut buffer = vec![1, 2, 3];
        align_buffer(&mut buffer);
        assert_eq!(buffer, vec![1, 2, 3, 0]);

        let mut aligned = vec![1, 2, 3, 4];
        align_buffer(&mut aligned);
        assert_eq!(aligned.len(), 4);
    }

    #[test]
    fn test_write_chunk_pads() {
        let mut out = Vec::new();
        write_chunk(&mut out, CHUNK_JSON, b"{}", b' ');
        assert_eq!(out.len(), 8 + 4);
        assert_eq!(&out[0..4], &4u32.to_le_bytes());
        assert_eq!(&out[4..8], b"JSON");
        assert_eq!(&out[8..], b"{}  ");
    }
}
