use anyhow::{anyhow, Context, Result};
use std::{fs, path::Path};

/// Reads a policy or batch file whole, refusing symlinks, non-regular files
/// and anything larger than `max_bytes`.
///
/// Batch files are validated from the returned bytes and hashed into the
/// report, so the cap applies to what was read as well as to the metadata.
/// A batch appended to after the `stat` is rejected rather than truncated.
pub fn read_validated(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let meta = fs::symlink_metadata(path).with_context(|| format!("stat {}", path.display()))?;
    if meta.file_type().is_symlink() {
        return Err(anyhow!("Refusing to read symlink: {}", path.display()));
    }
    if !meta.is_file() {
        return Err(anyhow!("Not a regular file: {}", path.display()));
    }
    check_size(path, meta.len(), max_bytes)?;

    let data = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    check_size(path, data.len() as u64, max_bytes)?;
    Ok(data)
}

fn check_size(path: &Path, len: u64, max_bytes: u64) -> Result<()> {
    if len > max_bytes {
        return Err(anyhow!(
            "File too large: {} ({len} bytes, max {max_bytes} bytes)",
            path.display(),
        ));
    }
    Ok(())
}
