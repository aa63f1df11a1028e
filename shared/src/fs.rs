//! Filesystem helpers shared across the asset tools.

use std::path::Path;

use anyhow::{Context, Result};

/// Maximum allowed GLB (or external .bin) size for reading into memory.
pub const MAX_GLB_BYTES: u64 = 512 * 1024 * 1024; // 512 MiB
/// Maximum allowed component schema / catalog size.
pub const MAX_SCHEMA_BYTES: u64 = 64 * 1024 * 1024; // 64 MiB

/// Read a file into memory with a size cap.
pub fn read_file_with_limit(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;
    let len = metadata.len();
    if len > max_bytes {
        anyhow::bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            len,
            max_bytes
        );
    }
    std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Read a UTF-8 text file into memory with a size cap.
pub fn read_text_with_limit(path: &Path, max_bytes: u64) -> Result<String> {
    let bytes = read_file_with_limit(path, max_bytes)?;
    String::from_utf8(bytes).with_context(|| format!("File is not UTF-8: {}", path.display()))
}

/// Write a file, creating parent directories as needed.
pub fn write_creating_dirs(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}
