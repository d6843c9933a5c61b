//! Error taxonomy for the synchronization core.
//!
//! Only [`DiagramError::EngineUnavailable`] is fatal and propagates to the
//! host as a construction failure. Consistency violations are caught by the
//! binding adapter, logged, and dropped; duplicate explicit keys in edits
//! are not errors at all (they are silently resolved by key-scan
//! reassignment). Documents entering the system are held to a stricter
//! standard: see [`DiagramError::DuplicateKey`] and
//! [`DiagramError::KeyOutOfRange`].

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagramError {
    /// The host never produced a rendering-engine instance.
    #[error("render engine instance was never constructed")]
    EngineUnavailable,

    /// An edit references a node key that does not resolve to a live node.
    #[error("edit references missing node key {key}")]
    MissingNode { key: i64 },

    /// Removal of a node was refused because links still reference it
    /// (reject removal policy only).
    #[error("node {key} is still referenced by {links} link(s)")]
    NodeInUse { key: i64, links: usize },

    /// A document carries the same key twice within the flat key space.
    #[error("document declares key {key} more than once")]
    DuplicateKey { key: i64 },

    /// A document key falls outside its range (node keys are positive,
    /// link keys negative).
    #[error("document key {key} is outside its range")]
    KeyOutOfRange { key: i64 },
}
