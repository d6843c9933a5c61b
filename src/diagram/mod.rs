//! Canonical Diagram State
//!
//! Data model and single-writer store for the diagram's node/link graph:
//! - Records, snapshot, and the GoJS-compatible document layout
//! - Incremental deltas exchanged with the rendering engine
//! - Key assignment and cascade-removal rules
//! - Light/dark theme state and its observer
//! - Document persistence

pub mod delta;
pub mod model;
pub mod persist;
pub mod store;
pub mod theme;

pub use delta::GraphDelta;
pub use model::{GraphSnapshot, LinkKey, LinkRecord, ModelData, NodeKey, NodeRecord, Point, UNKEYED};
pub use persist::PersistError;
pub use store::{GraphStore, RemovalPolicy};
pub use theme::{ThemeObserver, ThemeState};
