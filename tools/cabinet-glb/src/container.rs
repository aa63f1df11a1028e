//! GLB container layout
//!
//! ```text
//! header   magic "glTF" | version u32 | total length u32
//! chunk 0  length u32 | "JSON" | UTF-8 JSON, space padded
//! chunk 1  length u32 | "BIN\0" | binary buffer, zero padded (optional)
//! ```
//!
//! All integers are little endian and every chunk is 4-byte aligned.

use cabinet_shared::GLB_FORMAT;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GlbError {
    #[error("file too small for a GLB header ({0} bytes)")]
    TooShort(usize),

    #[error("not a GLB file (magic {0:?})")]
    BadMagic([u8; 4]),

    #[error("unsupported GLB version {0} (only version 2 is supported)")]
    UnsupportedVersion(u32),

    #[error("header declares {declared} bytes but file has {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("chunk at offset {offset} is truncated")]
    TruncatedChunk { offset: usize },

    #[error("first chunk must be JSON (found type {0:#010x})")]
    MissingJsonChunk(u32),

    #[error("second chunk must be BIN (found type {0:#010x})")]
    UnexpectedChunk(u32),
}

/// Parsed GLB: header fields plus the raw chunk payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glb {
    pub version: u32,
    /// Total length declared in the header
    pub length: u32,
    /// JSON chunk payload (may carry trailing padding spaces)
    pub json: Vec<u8>,
    /// BIN chunk payload (may carry trailing zero padding)
    pub bin: Option<Vec<u8>>,
}

struct Chunk<'a> {
    kind: u32,
    payload: &'a [u8],
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn read_chunk(data: &[u8], offset: usize) -> Result<Chunk<'_>, GlbError> {
    let header_end = offset + GLB_FORMAT.chunk_header_len;
    if header_end > data.len() {
        return Err(GlbError::TruncatedChunk { offset });
    }
    let length = read_u32(data, offset) as usize;
    let kind = read_u32(data, offset + 4);
    let end = header_end
        .checked_add(length)
        .filter(|end| *end <= data.len())
        .ok_or(GlbError::TruncatedChunk { offset })?;

    Ok(Chunk {
        kind,
        payload: &data[header_end..end],
    })
}

impl Glb {
    /// Build a container from a JSON document and optional binary buffer
    pub fn new(json: Vec<u8>, bin: Option<Vec<u8>>) -> Self {
        let mut glb = Self {
            version: GLB_FORMAT.version,
            length: 0,
            json,
            bin,
        };
        glb.length = glb.encoded_len() as u32;
        glb
    }

    /// Parse the header and the JSON/BIN chunks
    pub fn from_slice(data: &[u8]) -> Result<Self, GlbError> {
        if data.len() < GLB_FORMAT.header_len {
            return Err(GlbError::TooShort(data.len()));
        }

        let magic = [data[0], data[1], data[2], data[3]];
        if &magic != GLB_FORMAT.magic {
            return Err(GlbError::BadMagic(magic));
        }

        let version = read_u32(data, 4);
        if version != GLB_FORMAT.version {
            return Err(GlbError::UnsupportedVersion(version));
        }

        let length = read_u32(data, 8);
        if length as usize > data.len() {
            return Err(GlbError::LengthMismatch {
                declared: length as usize,
                actual: data.len(),
            });
        }
        let data = &data[..length as usize];

        let json_chunk = read_chunk(data, GLB_FORMAT.header_len)?;
        if json_chunk.kind != GLB_FORMAT.json_chunk {
            return Err(GlbError::MissingJsonChunk(json_chunk.kind));
        }

        let bin_offset =
            GLB_FORMAT.header_len + GLB_FORMAT.chunk_header_len + json_chunk.payload.len();
        let bin = if bin_offset < data.len() {
            let chunk = read_chunk(data, bin_offset)?;
            if chunk.kind != GLB_FORMAT.bin_chunk {
                return Err(GlbError::UnexpectedChunk(chunk.kind));
            }
            Some(chunk.payload.to_vec())
        } else {
            None
        };

        Ok(Self {
            version,
            length,
            json: json_chunk.payload.to_vec(),
            bin,
        })
    }

    /// Size in bytes of the JSON chunk payload
    pub fn json_len(&self) -> usize {
        self.json.len()
    }

    /// Size in bytes of the BIN chunk payload (0 when absent)
    pub fn bin_len(&self) -> usize {
        self.bin.as_ref().map(Vec::len).unwrap_or(0)
    }

    /// Total file size `to_vec` will produce
    pub fn encoded_len(&self) -> usize {
        let chunk = GLB_FORMAT.chunk_header_len;
        let mut total = GLB_FORMAT.header_len + chunk + self.json.len().next_multiple_of(4);
        if let Some(bin) = &self.bin {
            total += chunk + bin.len().next_multiple_of(4);
        }
        total
    }

    /// Assemble the GLB binary
    pub fn to_vec(&self) -> Vec<u8> {
        let total_length = self.encoded_len();
        let mut glb = Vec::with_capacity(total_length);

        // Header
        glb.extend_from_slice(GLB_FORMAT.magic);
        glb.extend_from_slice(&GLB_FORMAT.version.to_le_bytes());
        glb.extend_from_slice(&(total_length as u32).to_le_bytes());

        // JSON chunk, padded with spaces
        write_chunk(&mut glb, GLB_FORMAT.json_chunk, &self.json, b' ');

        // BIN chunk, padded with zeros
        if let Some(bin) = &self.bin {
            write_chunk(&mut glb, GLB_FORMAT.bin_chunk, bin, 0);
        }

        glb
    }
}

fn write_chunk(glb: &mut Vec<u8>, kind: u32, payload: &[u8], pad: u8) {
    let padded_len = payload.len().next_multiple_of(4);
    glb.extend_from_slice(&(padded_len as u32).to_le_bytes());
    glb.extend_from_slice(&kind.to_le_bytes());
    glb.extend_from_slice(payload);
    glb.extend(std::iter::repeat_n(pad, padded_len - payload.len()));
}
