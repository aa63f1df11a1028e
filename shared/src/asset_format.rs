//! GLB container constants.
//!
//! `AssetFormat` is the single source of truth for the binary layout values
//! and file naming conventions the tools rely on.
//!
//! # Example
//!
//! ```
//! use cabinet_shared::GLB_FORMAT;
//!
//! assert_eq!(GLB_FORMAT.magic, b"glTF");
//! assert_eq!(GLB_FORMAT.header_len, 12);
//! assert_eq!(GLB_FORMAT.adjusted_suffix, "_adjusted");
//! ```

/// Binary container layout plus the output naming used by the tools.
#[derive(Debug, Clone, Copy)]
pub struct AssetFormat {
    /// File extension without dot
    pub extension: &'static str,

    /// Magic bytes at start of file (4 bytes)
    pub magic: &'static [u8; 4],

    /// Only container version the tools read and write
    pub version: u32,

    /// Size of the file header (magic + version + length)
    pub header_len: usize,

    /// Size of a chunk header (length + type)
    pub chunk_header_len: usize,

    /// Chunk type of the JSON chunk ("JSON" little endian)
    pub json_chunk: u32,

    /// Chunk type of the binary chunk ("BIN\0" little endian)
    pub bin_chunk: u32,

    /// Suffix appended to the file stem by `adjust`
    pub adjusted_suffix: &'static str,

    /// Suffix appended to the file stem by `flatten`
    pub flat_suffix: &'static str,
}

/// GLB 2.0 as produced by Blender and consumed by the Three.js viewer.
pub const GLB_FORMAT: AssetFormat = AssetFormat {
    extension: "glb",
    magic: b"glTF",
    version: 2,
    header_len: 12,
    chunk_header_len: 8,
    json_chunk: 0x4E4F_534A,
    bin_chunk: 0x004E_4942,
    adjusted_suffix: "_adjusted",
    flat_suffix: "_flat",
};

impl AssetFormat {
    /// Derive an output path next to `input`: `<stem><suffix>.<extension>`.
    pub fn sibling_path(&self, input: &std::path::Path, suffix: &str) -> std::path::PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        input.with_file_name(format!("{stem}{suffix}.{}", self.extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_chunk_types_spell_ascii() {
        assert_eq!(&GLB_FORMAT.json_chunk.to_le_bytes(), b"JSON");
        assert_eq!(&GLB_FORMAT.bin_chunk.to_le_bytes(), b"BIN\0");
    }

    #[test]
    fn test_sibling_path() {
        let out = GLB_FORMAT.sibling_path(Path::new("models/tsh_700.glb"), "_flat");
        assert_eq!(out, Path::new("models/tsh_700_flat.glb"));
    }
}
