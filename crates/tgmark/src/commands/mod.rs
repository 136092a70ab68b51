//! Command implementations.

use std::io::Read;

use anyhow::Context;
use camino::Utf8Path;

pub mod check;
pub mod crop;
pub mod escape_url;
pub mod info;
pub mod render;
pub mod sanitize;
#[cfg(feature = "mcp")]
pub mod serve;

/// Read a file and validate its size against the configured limit.
pub fn read_input_file(path: &Utf8Path, max_bytes: Option<usize>) -> anyhow::Result<String> {
    // Preflight: check file size via metadata before reading into memory.
    let metadata =
        std::fs::metadata(path.as_std_path()).with_context(|| format!("failed to read {path}"))?;
    if let Some(max) = max_bytes {
        let size = metadata.len() as usize;
        if size > max {
            anyhow::bail!("input too large: {path} is {size} bytes (limit: {max} bytes)");
        }
    }

    let content = std::fs::read_to_string(path.as_std_path())
        .with_context(|| format!("failed to read {path}"))?;
    Ok(content)
}

/// Read text from `path`, or from stdin when `path` is `None` or `-`.
pub fn read_input(path: Option<&Utf8Path>, max_bytes: Option<usize>) -> anyhow::Result<String> {
    match path {
        Some(path) if path.as_str() != "-" => read_input_file(path, max_bytes),
        _ => read_stdin(std::io::stdin().lock(), max_bytes),
    }
}

fn read_stdin(reader: impl Read, max_bytes: Option<usize>) -> anyhow::Result<String> {
    let mut bytes = Vec::new();
    // Read one byte past the limit to tell "exactly max" from "too large".
    let cap = max_bytes.map_or(u64::MAX, |max| max as u64 + 1);
    reader
        .take(cap)
        .read_to_end(&mut bytes)
        .context("failed to read stdin")?;
    if let Some(max) = max_bytes
        && bytes.len() > max
    {
        anyhow::bail!("input too large: stdin exceeds {max} bytes");
    }
    String::from_utf8(bytes).context("stdin is not valid UTF-8")
}
