//! Rendering Engine Contract
//!
//! The layout/rendering engine is an external collaborator; this crate only
//! depends on the narrow surface the synchronization core needs: pushing a
//! full snapshot, applying incremental deltas, mutating per-link
//! presentation attributes, reading the scene back, and a notification
//! subscribe/unsubscribe channel. [`headless::HeadlessEngine`] implements
//! the contract in memory for tests and renderer-less hosts.

pub mod headless;

use std::sync::mpsc::Sender;

use crate::diagram::{GraphDelta, GraphSnapshot, LinkKey};

pub use headless::HeadlessEngine;

/// Handle for one notification subscription.
pub type SubscriptionId = u64;

/// Interaction-class notification channels an engine exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    SelectionChanged,
}

/// A notification emitted by the engine in response to user interaction.
///
/// These are view-level events, distinct from the model deltas the engine
/// reports for data edits.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The set of selected parts changed; keys are drawn from the flat
    /// node/link identifier space.
    SelectionChanged { selected: Vec<i64> },
}

impl EngineEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EngineEvent::SelectionChanged { .. } => EventKind::SelectionChanged,
        }
    }
}

/// The surface of the external rendering/layout engine this core consumes.
pub trait RenderEngine {
    /// Identity of this engine instance, unique within the process. The
    /// event relay uses it to tell a re-attach from an instance swap.
    fn instance_id(&self) -> u64;

    /// Replace the engine's scene graph with the given snapshot.
    fn load(&mut self, snapshot: &GraphSnapshot);

    /// Apply an incremental, already-canonicalized delta to the scene
    /// graph.
    fn apply(&mut self, delta: &GraphDelta);

    /// Mutate a link's presentation stroke color. Presentation only: the
    /// canonical data exported by the engine is unaffected.
    fn set_link_stroke(&mut self, key: LinkKey, color: &str);

    /// Read the scene graph back as canonical data.
    fn export(&self) -> GraphSnapshot;

    /// Register a notification sink for one interaction class. Events are
    /// delivered on the same logical thread that caused them.
    fn subscribe(&mut self, kind: EventKind, sink: Sender<EngineEvent>) -> SubscriptionId;

    /// Drop a subscription; unknown ids are ignored.
    fn unsubscribe(&mut self, id: SubscriptionId);
}
