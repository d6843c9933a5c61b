//! Diagram Studio - diagram-state synchronization core
//!
//! Two-way binding between an application-owned canonical graph store and
//! an external rendering/layout engine, plus theming and interaction event
//! relay. Single-threaded and event-driven: every edit - host- or
//! engine-originated - routes through one `apply_delta` entry point.

pub mod diagram;
pub mod engine;
pub mod error;
pub mod sync;

// Re-export commonly used types
pub use diagram::{
    GraphDelta, GraphSnapshot, GraphStore, LinkKey, LinkRecord, ModelData, NodeKey, NodeRecord,
    Point, RemovalPolicy, ThemeObserver, ThemeState,
};
pub use engine::{EngineEvent, EventKind, HeadlessEngine, RenderEngine, SubscriptionId};
pub use error::DiagramError;
pub use sync::{BindingAdapter, DiagramView, EventRelay, RelayState};
