//! Whole-document I/O: bytes in, [`Feed`] out, and back.
//!
//! [`decode`] and [`encode`] are the pure core. The file helpers sit on top
//! of them and fold "could not read the bytes" and "could not decode the
//! bytes" into one [`LoadError`], since either way the caller has no feed.

use std::io::{Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use thiserror::Error;

use super::error::DecodeError;
use super::model::Feed;

/// Default ceiling for a single document, from disk or the network.
pub const DEFAULT_MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

/// No feed could be produced from a source.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The byte source failed: missing file, network error, size limit.
    #[error("Document unavailable: {0}")]
    Unavailable(String),

    #[error("Document could not be decoded: {0}")]
    Decode(#[from] DecodeError),
}

/// A feed could not be written to a sink.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Failed to encode feed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Decodes a JSON Feed document.
///
/// # Errors
///
/// [`DecodeError::Json`] when the bytes are not JSON; otherwise whatever
/// [`Feed::from_value`] reports.
pub fn decode(bytes: &[u8]) -> Result<Feed, DecodeError> {
    let value: Value = serde_json::from_slice(bytes)?;
    Feed::from_value(&value)
}

/// Encodes a feed as compact JSON. The same feed always yields the same
/// bytes.
pub fn encode(feed: &Feed) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(feed)
}

/// Encodes a feed as indented JSON, for reading by people.
pub fn to_pretty_string(feed: &Feed) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(feed)
}

/// Reads a local document, refusing files larger than `limit` bytes.
pub fn read_file(path: &Path, limit: u64) -> Result<Vec<u8>, LoadError> {
    let unavailable = |e: std::io::Error| LoadError::Unavailable(format!("{}: {}", path.display(), e));

    let file = std::fs::File::open(path).map_err(unavailable)?;
    let meta = file.metadata().map_err(unavailable)?;
    if !meta.is_file() {
        return Err(LoadError::Unavailable(format!(
            "{}: not a regular file",
            path.display()
        )));
    }
    if meta.len() > limit {
        return Err(LoadError::Unavailable(format!(
            "{}: document is {} bytes (max {} bytes)",
            path.display(),
            meta.len(),
            limit
        )));
    }

    // The file may have grown since the metadata was read.
    read_capped(file, limit)
        .map_err(unavailable)?
        .ok_or_else(|| {
            LoadError::Unavailable(format!(
                "{}: document exceeds {} bytes (max {} bytes)",
                path.display(),
                limit,
                limit
            ))
        })
}

/// Reads everything from `reader`, or `None` once it yields more than
/// `limit` bytes.
fn read_capped(reader: impl Read, limit: u64) -> std::io::Result<Option<Vec<u8>>> {
    let mut bytes = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut bytes)?;
    Ok((bytes.len() as u64 <= limit).then_some(bytes))
}

/// Reads and decodes a local document.
pub fn load_file(path: &Path, limit: u64) -> Result<Feed, LoadError> {
    let bytes = read_file(path, limit)?;
    let feed = decode(&bytes)?;
    tracing::debug!(
        path = %path.display(),
        title = %feed.title(),
        items = feed.items.len(),
        "Loaded feed document"
    );
    Ok(feed)
}

/// Encodes `feed` and writes it to `path` atomically.
///
/// The bytes go to a uniquely named temporary file in the same directory,
/// which is synced and then renamed over `path`, so readers see either the
/// old document or the complete new one.
pub fn save_file(feed: &Feed, path: &Path, pretty: bool) -> Result<(), SaveError> {
    let bytes = if pretty {
        to_pretty_string(feed)?.into_bytes()
    } else {
        encode(feed)?
    };
    write_atomic(path, &bytes)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Saved feed document");
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), SaveError> {
    let io_error = |p: &Path, source: std::io::Error| SaveError::Io {
        path: p.display().to_string(),
        source,
    };

    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{:016x}", suffix));

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .map_err(|e| io_error(&temp_path, e))?;

    let written = file.write_all(bytes).and_then(|()| file.sync_all());
    drop(file);
    if let Err(e) = written {
        let _ = std::fs::remove_file(&temp_path);
        return Err(io_error(&temp_path, e));
    }

    // Windows refuses to rename over an existing file.
    #[cfg(windows)]
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(io_error(path, e));
        }
    }

    std::fs::rename(&temp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        io_error(path, e)
    })
}
