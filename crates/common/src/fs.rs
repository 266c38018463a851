use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::errors::{AppError, Result};

/// Writes `contents` to `path` through a sibling temp file and a rename, so
/// readers never observe a half-written file. Creates the parent directory.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path)
        .map_err(|err| AppError::Io(err.error))?;
    Ok(())
}
