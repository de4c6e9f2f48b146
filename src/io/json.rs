//! JSON encoding and file writing for the run artifacts.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, create_dir_all};
use std::path::Path;

/// Serialize `value` to JSON bytes, pretty-printed with two-space indent when `pretty`.
///
/// Non-ASCII text is written verbatim.
///
/// # Errors
/// Returns an error if `value` fails to serialize.
pub fn to_json_bytes<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<Vec<u8>> {
    let mut bytes = if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    }
    .context("serialize JSON")?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Write `value` as a JSON document at `path`, creating parent directories.
///
/// # Returns
/// The exact bytes written.
///
/// # Errors
/// Returns an error if serialization fails or the file cannot be written.
pub fn write_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T, pretty: bool) -> Result<Vec<u8>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let bytes = to_json_bytes(value, pretty).with_context(|| format!("encode {}", path.display()))?;
    fs::write(path, &bytes).with_context(|| format!("create {}", path.display()))?;
    Ok(bytes)
}
