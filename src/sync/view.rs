//! Diagram View
//!
//! Owns one engine instance together with the store, binding adapter,
//! event relay, and theme observer, and gives their lifecycle an explicit
//! shape: construction performs the initial sync and relay attach, teardown
//! synchronously detaches the relay and releases the engine before
//! returning. Everything runs on one logical thread; each method is a
//! complete handler - store mutation, derived recoloring, and host
//! notification finish before it returns.

use crate::diagram::{
    GraphDelta, GraphSnapshot, GraphStore, LinkKey, LinkRecord, ModelData, NodeKey, NodeRecord,
    RemovalPolicy, ThemeObserver, ThemeState,
};
use crate::engine::{EngineEvent, RenderEngine};
use crate::error::DiagramError;

use super::adapter::BindingAdapter;
use super::relay::{EventRelay, RelayState};

pub struct DiagramView<E: RenderEngine> {
    /// `None` once torn down; the engine is exclusively owned by this view.
    engine: Option<E>,
    store: GraphStore,
    adapter: BindingAdapter,
    relay: EventRelay,
    observer: ThemeObserver,
}

impl<E: RenderEngine> DiagramView<E> {
    /// Build a view around an engine instance the host constructed.
    ///
    /// `engine == None` means the host failed to construct one; that is the
    /// single fatal error of this core and propagates as
    /// [`DiagramError::EngineUnavailable`]. The initial snapshot must pass
    /// [`GraphSnapshot::validate`]; otherwise it is pushed into the engine,
    /// strokes are colored for the initial theme
    /// (read once from `theme_signal`, dark when absent), and the relay
    /// attaches.
    pub fn new(
        engine: Option<E>,
        initial: GraphSnapshot,
        policy: RemovalPolicy,
        theme_signal: Option<&str>,
        on_interaction: impl FnMut(&EngineEvent) + 'static,
        on_model_change: impl FnMut(&GraphDelta) + 'static,
    ) -> Result<Self, DiagramError> {
        let mut engine = engine.ok_or(DiagramError::EngineUnavailable)?;
        // Host-supplied state is a system boundary like a document on disk.
        initial.validate()?;
        let observer = ThemeObserver::new(theme_signal);
        let mut store = GraphStore::new(initial, policy);
        let mut adapter = BindingAdapter::new(on_model_change);
        let mut relay = EventRelay::new(on_interaction);

        relay.attach(&mut engine);
        adapter.sync_to_engine(&mut store, &mut engine, observer.current());

        Ok(Self {
            engine: Some(engine),
            store,
            adapter,
            relay,
            observer,
        })
    }

    pub fn snapshot(&self) -> &GraphSnapshot {
        self.store.snapshot()
    }

    pub fn theme(&self) -> ThemeState {
        self.observer.current()
    }

    pub fn relay_state(&self) -> RelayState {
        self.relay.state()
    }

    /// Whether the view still owns an engine (false after [`Self::teardown`]).
    pub fn is_active(&self) -> bool {
        self.engine.is_some()
    }

    /// Direct access to the owned engine, for hosts that drive it and for
    /// tests that simulate interactions.
    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.engine.as_mut()
    }

    /// Host render pass: push the snapshot to the engine unless the
    /// skip-sync flag says the engine already has this state.
    pub fn sync(&mut self) -> Result<(), DiagramError> {
        let engine = self.engine.as_mut().ok_or(DiagramError::EngineUnavailable)?;
        self.adapter
            .sync_to_engine(&mut self.store, engine, self.observer.current());
        Ok(())
    }

    /// Commit a host-driven edit and sync the engine.
    pub fn apply_delta(&mut self, delta: GraphDelta) -> Result<GraphDelta, DiagramError> {
        let engine = self.engine.as_mut().ok_or(DiagramError::EngineUnavailable)?;
        self.adapter
            .commit_host_delta(&mut self.store, engine, delta, self.observer.current())
    }

    /// Create a node; the store assigns its key.
    pub fn add_node(&mut self, record: NodeRecord) -> Result<NodeKey, DiagramError> {
        let applied = self.apply_delta(GraphDelta::insert_node(record))?;
        let node = applied
            .inserted_nodes
            .first()
            .expect("node insert always yields a record");
        Ok(node.key)
    }

    /// Create a link between two existing nodes; the store assigns its key.
    pub fn add_link(&mut self, record: LinkRecord) -> Result<LinkKey, DiagramError> {
        let applied = self.apply_delta(GraphDelta::insert_link(record))?;
        let link = applied
            .inserted_links
            .first()
            .expect("link insert always yields a record");
        Ok(link.key)
    }

    /// Remove a node under the configured removal policy.
    pub fn remove_node(&mut self, key: NodeKey) -> Result<GraphDelta, DiagramError> {
        self.apply_delta(GraphDelta::remove_node(key))
    }

    /// Flip the model-wide relink permission.
    pub fn set_can_relink(&mut self, can_relink: bool) -> Result<(), DiagramError> {
        self.apply_delta(GraphDelta::set_model_data(ModelData { can_relink }))?;
        Ok(())
    }

    /// Merge an edit the engine originated (drag, label edit, drawn or
    /// relinked link). Invalid edits are dropped and logged; after teardown
    /// this is a no-op.
    pub fn handle_engine_edit(&mut self, delta: GraphDelta) {
        let Some(engine) = self.engine.as_mut() else {
            log::debug!("engine edit after teardown ignored");
            return;
        };
        self.adapter
            .handle_engine_edit(&mut self.store, engine, delta, self.observer.current());
    }

    /// Feed a change notification from the external theme signal. A real
    /// transition triggers the recolor pass over all current links; the
    /// canonical records are never touched.
    pub fn theme_signal_changed(&mut self, value: Option<&str>) {
        let Some(next) = self.observer.signal_changed(value) else {
            return;
        };
        if let Some(engine) = self.engine.as_mut() {
            self.adapter.recolor_all(&self.store, engine, next);
        }
    }

    /// Forward queued engine interaction notifications to the host
    /// callback.
    pub fn pump_events(&mut self) {
        self.relay.pump();
    }

    /// Swap in a fresh engine instance: the relay re-attaches (discarding
    /// the stale subscription) and the full snapshot is pushed into the new
    /// instance.
    pub fn replace_engine(&mut self, mut engine: E) {
        self.relay.attach(&mut engine);
        self.store.set_skip_sync(false);
        self.adapter
            .sync_to_engine(&mut self.store, &mut engine, self.observer.current());
        self.engine = Some(engine);
    }

    /// Detach the relay and release the engine. Synchronous and idempotent;
    /// once this returns no handler can fire and no notification can reach
    /// the host.
    pub fn teardown(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            self.relay.detach(&mut engine);
        }
    }
}

impl<E: RenderEngine> Drop for DiagramView<E> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::HeadlessEngine;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sample_snapshot() -> GraphSnapshot {
        GraphSnapshot::new(
            vec![
                NodeRecord::new("A").with_key(1),
                NodeRecord::new("B").with_key(2),
            ],
            vec![],
            ModelData::default(),
        )
    }

    fn view() -> (
        DiagramView<HeadlessEngine>,
        Rc<RefCell<Vec<EngineEvent>>>,
        Rc<RefCell<Vec<GraphDelta>>>,
    ) {
        let interactions = Rc::new(RefCell::new(Vec::new()));
        let deltas = Rc::new(RefCell::new(Vec::new()));
        let (i_sink, d_sink) = (interactions.clone(), deltas.clone());
        let view = DiagramView::new(
            Some(HeadlessEngine::new()),
            sample_snapshot(),
            RemovalPolicy::Cascade,
            None,
            move |event: &EngineEvent| i_sink.borrow_mut().push(event.clone()),
            move |delta: &GraphDelta| d_sink.borrow_mut().push(delta.clone()),
        )
        .unwrap();
        (view, interactions, deltas)
    }

    #[test]
    fn test_missing_engine_is_a_construction_failure() {
        let result = DiagramView::<HeadlessEngine>::new(
            None,
            sample_snapshot(),
            RemovalPolicy::Cascade,
            None,
            |_| {},
            |_| {},
        );
        assert_eq!(result.err(), Some(DiagramError::EngineUnavailable));
    }

    #[test]
    fn test_inconsistent_initial_snapshot_is_a_construction_failure() {
        let broken = GraphSnapshot::new(
            vec![NodeRecord::new("A").with_key(1)],
            vec![LinkRecord::new(1, 9).with_key(-1)],
            ModelData::default(),
        );
        let result = DiagramView::<HeadlessEngine>::new(
            Some(HeadlessEngine::new()),
            broken,
            RemovalPolicy::Cascade,
            None,
            |_| {},
            |_| {},
        );
        assert_eq!(result.err(), Some(DiagramError::MissingNode { key: 9 }));
    }

    #[test]
    fn test_construction_syncs_and_attaches() {
        let (mut view, _, _) = view();
        assert!(view.is_active());
        assert_eq!(view.relay_state(), RelayState::Attached);
        assert_eq!(view.theme(), ThemeState::Dark);
        let snapshot = view.snapshot().clone();
        assert_eq!(view.engine_mut().unwrap().export(), snapshot);
    }

    #[test]
    fn test_link_keys_assigned_minus_one_then_minus_two() {
        let (mut view, _, _) = view();
        assert_eq!(view.add_link(LinkRecord::new(1, 2)).unwrap(), -1);
        assert_eq!(view.add_link(LinkRecord::new(2, 1)).unwrap(), -2);
    }

    #[test]
    fn test_theme_toggle_recolors_without_touching_records() {
        let (mut view, _, _) = view();
        view.add_link(LinkRecord::new(1, 2)).unwrap();
        assert_eq!(view.engine_mut().unwrap().link_stroke(-1), Some("white"));
        let before = view.snapshot().clone();

        view.theme_signal_changed(Some("light"));
        assert_eq!(view.theme(), ThemeState::Light);
        assert_eq!(view.engine_mut().unwrap().link_stroke(-1), Some("black"));
        assert_eq!(view.snapshot(), &before);

        view.theme_signal_changed(Some("dark"));
        assert_eq!(view.engine_mut().unwrap().link_stroke(-1), Some("white"));
        assert_eq!(view.snapshot(), &before);
    }

    #[test]
    fn test_interactions_reach_host_while_attached() {
        let (mut view, interactions, _) = view();
        view.engine_mut().unwrap().select(vec![1]);
        view.pump_events();
        assert_eq!(
            interactions.borrow().as_slice(),
            &[EngineEvent::SelectionChanged { selected: vec![1] }]
        );
    }

    #[test]
    fn test_no_delivery_after_teardown() {
        let (mut view, interactions, _) = view();
        // A notification queued but not yet pumped when teardown begins.
        view.engine_mut().unwrap().select(vec![1]);
        view.teardown();

        assert!(!view.is_active());
        assert_eq!(view.relay_state(), RelayState::Detached);
        view.pump_events();
        assert!(interactions.borrow().is_empty());

        // Late edits are ignored, not panics.
        view.handle_engine_edit(GraphDelta::remove_node(1));
        assert!(view.snapshot().contains_node(1));
        assert_eq!(view.sync().err(), Some(DiagramError::EngineUnavailable));
    }

    #[test]
    fn test_host_edits_notify_model_change_callback() {
        let (mut view, _, deltas) = view();
        view.add_link(LinkRecord::new(1, 2)).unwrap();
        view.remove_node(2).unwrap();
        let seen = deltas.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].removed_node_keys, vec![2]);
        assert_eq!(seen[1].removed_link_keys, vec![-1]);
    }

    #[test]
    fn test_engine_edit_suppresses_feedback_sync() {
        let (mut view, _, deltas) = view();
        let edit = GraphDelta {
            modified_links: vec![LinkRecord::new(1, 2).with_key(-1)],
            ..Default::default()
        };
        view.engine_mut().unwrap().apply(&edit);
        view.handle_engine_edit(edit);

        assert!(view.snapshot().skip_sync);
        assert_eq!(deltas.borrow().len(), 1);
        view.sync().unwrap();
        assert!(!view.snapshot().skip_sync);
    }

    #[test]
    fn test_replace_engine_resyncs_and_swaps_subscription() {
        let (mut view, interactions, _) = view();
        view.add_link(LinkRecord::new(1, 2)).unwrap();
        // Leave an undelivered notification in the doomed instance.
        view.engine_mut().unwrap().select(vec![7]);

        view.replace_engine(HeadlessEngine::new());
        let snapshot = view.snapshot().clone();
        let engine = view.engine_mut().unwrap();
        assert_eq!(engine.export(), snapshot);
        assert_eq!(engine.link_stroke(-1), Some("white"));

        engine.select(vec![1]);
        view.pump_events();
        // Only the new instance's notification arrives.
        assert_eq!(
            interactions.borrow().as_slice(),
            &[EngineEvent::SelectionChanged { selected: vec![1] }]
        );
    }

    #[test]
    fn test_set_can_relink_reaches_engine() {
        let (mut view, _, _) = view();
        view.set_can_relink(false).unwrap();
        assert!(!view.snapshot().model_data.can_relink);
        assert!(!view.engine_mut().unwrap().export().model_data.can_relink);
    }
}
