//! Headless In-Memory Engine
//!
//! A [`RenderEngine`] with no layout, rendering, or hit testing: the scene
//! graph is plain record vectors plus a per-link stroke-color map. It backs
//! the CLI and the test suite, and doubles as a reference for what the
//! adapter expects from a real engine binding.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;

use crate::diagram::{GraphDelta, GraphSnapshot, LinkKey};

use super::{EngineEvent, EventKind, RenderEngine, SubscriptionId};

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

struct Subscriber {
    id: SubscriptionId,
    kind: EventKind,
    sink: Sender<EngineEvent>,
}

/// In-memory scene graph.
pub struct HeadlessEngine {
    instance_id: u64,
    scene: GraphSnapshot,
    /// Presentation state keyed by link; lives beside the records, never
    /// inside them, so exports stay free of derived colors.
    strokes: HashMap<LinkKey, String>,
    subscribers: Vec<Subscriber>,
    next_subscription: SubscriptionId,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self {
            instance_id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            scene: GraphSnapshot::default(),
            strokes: HashMap::new(),
            subscribers: Vec::new(),
            next_subscription: 1,
        }
    }

    /// Current stroke color of a link, if one was ever set.
    pub fn link_stroke(&self, key: LinkKey) -> Option<&str> {
        self.strokes.get(&key).map(String::as_str)
    }

    /// Number of live subscriptions for one interaction class.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.iter().filter(|s| s.kind == kind).count()
    }

    /// Deliver a notification to every matching subscriber, as a user
    /// interaction inside a real engine would.
    pub fn emit(&mut self, event: EngineEvent) {
        let kind = event.kind();
        // Senders whose receiver is gone are pruned as we go.
        self.subscribers.retain(|s| {
            if s.kind != kind {
                return true;
            }
            s.sink.send(event.clone()).is_ok()
        });
    }

    /// Convenience for tests and demos: report a selection change.
    pub fn select(&mut self, selected: Vec<i64>) {
        self.emit(EngineEvent::SelectionChanged { selected });
    }
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderEngine for HeadlessEngine {
    fn instance_id(&self) -> u64 {
        self.instance_id
    }

    fn load(&mut self, snapshot: &GraphSnapshot) {
        self.scene = snapshot.clone();
        self.scene.skip_sync = false;
        self.strokes.retain(|key, _| self.scene.link(*key).is_some());
    }

    fn apply(&mut self, delta: &GraphDelta) {
        if let Some(model_data) = delta.model_data {
            self.scene.model_data = model_data;
        }
        for record in delta.inserted_nodes.iter().chain(&delta.modified_nodes) {
            match self.scene.nodes.iter_mut().find(|n| n.key == record.key) {
                Some(existing) => *existing = record.clone(),
                None => self.scene.nodes.push(record.clone()),
            }
        }
        for record in delta.inserted_links.iter().chain(&delta.modified_links) {
            match self.scene.links.iter_mut().find(|l| l.key == record.key) {
                Some(existing) => *existing = record.clone(),
                None => self.scene.links.push(record.clone()),
            }
        }
        for key in &delta.removed_node_keys {
            self.scene.nodes.retain(|n| n.key != *key);
        }
        for key in &delta.removed_link_keys {
            self.scene.links.retain(|l| l.key != *key);
            self.strokes.remove(key);
        }
    }

    fn set_link_stroke(&mut self, key: LinkKey, color: &str) {
        if self.scene.link(key).is_some() {
            self.strokes.insert(key, color.to_string());
        }
    }

    fn export(&self) -> GraphSnapshot {
        self.scene.clone()
    }

    fn subscribe(&mut self, kind: EventKind, sink: Sender<EngineEvent>) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push(Subscriber { id, kind, sink });
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|s| s.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::{LinkRecord, ModelData, NodeRecord};
    use std::sync::mpsc::channel;

    fn sample() -> GraphSnapshot {
        GraphSnapshot::new(
            vec![
                NodeRecord::new("A").with_key(1),
                NodeRecord::new("B").with_key(2),
            ],
            vec![LinkRecord::new(1, 2).with_key(-1)],
            ModelData::default(),
        )
    }

    #[test]
    fn test_load_then_export_roundtrips() {
        let mut engine = HeadlessEngine::new();
        let snapshot = sample();
        engine.load(&snapshot);
        assert_eq!(engine.export(), snapshot);
    }

    #[test]
    fn test_strokes_are_presentation_only() {
        let mut engine = HeadlessEngine::new();
        let snapshot = sample();
        engine.load(&snapshot);
        engine.set_link_stroke(-1, "white");
        assert_eq!(engine.link_stroke(-1), Some("white"));
        // Exported data is unchanged by presentation mutation.
        assert_eq!(engine.export(), snapshot);
    }

    #[test]
    fn test_stroke_of_removed_link_is_dropped() {
        let mut engine = HeadlessEngine::new();
        engine.load(&sample());
        engine.set_link_stroke(-1, "white");
        engine.apply(&GraphDelta::remove_link(-1));
        assert_eq!(engine.link_stroke(-1), None);
    }

    #[test]
    fn test_subscribe_emit_unsubscribe() {
        let mut engine = HeadlessEngine::new();
        let (tx, rx) = channel();
        let id = engine.subscribe(EventKind::SelectionChanged, tx);
        assert_eq!(engine.subscriber_count(EventKind::SelectionChanged), 1);

        engine.select(vec![1]);
        assert_eq!(
            rx.try_recv().unwrap(),
            EngineEvent::SelectionChanged { selected: vec![1] }
        );

        engine.unsubscribe(id);
        assert_eq!(engine.subscriber_count(EventKind::SelectionChanged), 0);
        engine.select(vec![2]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_instance_ids_are_unique() {
        let a = HeadlessEngine::new();
        let b = HeadlessEngine::new();
        assert_ne!(a.instance_id(), b.instance_id());
    }
}
