//! Diagram Document Persistence
//!
//! Loads and saves the canonical snapshot as a pretty-printed JSON document
//! with the `{nodeDataArray, linkDataArray, modelData}` layout. Theme state
//! and the skip-sync flag are runtime-only and never reach disk.

use std::fs;
use std::path::Path;

use crate::error::DiagramError;

use super::model::GraphSnapshot;

/// Errors from reading or writing a diagram document.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed diagram document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid diagram document: {0}")]
    Invalid(#[from] DiagramError),
}

/// Read a diagram document from disk.
///
/// Hand-edited documents are not trusted: the snapshot is checked against
/// the document invariants before it reaches the store or the engine.
pub fn load(path: impl AsRef<Path>) -> Result<GraphSnapshot, PersistError> {
    let raw = fs::read_to_string(path)?;
    let snapshot: GraphSnapshot = serde_json::from_str(&raw)?;
    snapshot.validate()?;
    Ok(snapshot)
}

/// Write a diagram document to disk, replacing any existing file.
pub fn save(path: impl AsRef<Path>, snapshot: &GraphSnapshot) -> Result<(), PersistError> {
    let raw = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, raw)?;
    Ok(())
}
