//! Binding Adapter
//!
//! The two-way bridge between the canonical [`GraphStore`] and the
//! rendering engine's mutable scene graph. Host-driven changes flow
//! store -> engine as a full sync; engine-originated edits flow back as
//! incremental deltas merged through the store's single-writer entry point.
//! The skip-sync flag breaks the feedback loop: a snapshot that already
//! reflects engine state must not be pushed back into the engine.
//!
//! Link stroke color is a derived presentation property of the current
//! theme. It is recomputed here - synchronously, inside the same edit
//! transaction - whenever the link set changes structurally or the theme
//! flips, so the view never shows a stale stroke.

use crate::diagram::{GraphDelta, GraphStore, ThemeState};
use crate::engine::RenderEngine;
use crate::error::DiagramError;

/// Host callback invoked with the canonical delta of every committed edit
/// (for persistence or undo at the host level).
pub type ModelChangeCallback = Box<dyn FnMut(&GraphDelta)>;

pub struct BindingAdapter {
    on_model_change: ModelChangeCallback,
}

impl BindingAdapter {
    pub fn new(on_model_change: impl FnMut(&GraphDelta) + 'static) -> Self {
        Self {
            on_model_change: Box::new(on_model_change),
        }
    }

    /// Push the store's current snapshot into the engine, unless the
    /// snapshot is flagged as already reflecting engine state. The flag is
    /// consumed either way.
    pub fn sync_to_engine(
        &mut self,
        store: &mut GraphStore,
        engine: &mut dyn RenderEngine,
        theme: ThemeState,
    ) {
        if store.consume_skip_sync() {
            log::debug!("sync suppressed: snapshot already reflects engine state");
            return;
        }
        engine.load(store.snapshot());
        self.recolor_all(store, engine, theme);
    }

    /// Commit a host-driven edit: merge into the store, full-sync the
    /// engine, recolor, and notify the host.
    pub fn commit_host_delta(
        &mut self,
        store: &mut GraphStore,
        engine: &mut dyn RenderEngine,
        delta: GraphDelta,
        theme: ThemeState,
    ) -> Result<GraphDelta, DiagramError> {
        let applied = store.apply_delta(delta)?;
        store.set_skip_sync(false);
        engine.load(store.snapshot());
        self.recolor_all(store, engine, theme);
        if !applied.is_empty() {
            (self.on_model_change)(&applied);
        }
        Ok(applied)
    }

    /// Merge an engine-originated edit back into the store.
    ///
    /// The engine has already mutated its own scene graph, so on success the
    /// snapshot is flagged skip-sync and only the derived stroke colors of
    /// the links the edit touched are written back. An edit referencing a
    /// missing node (or refused by the removal policy) is dropped and
    /// logged; it never crashes and never leaves partial state.
    pub fn handle_engine_edit(
        &mut self,
        store: &mut GraphStore,
        engine: &mut dyn RenderEngine,
        delta: GraphDelta,
        theme: ThemeState,
    ) -> Option<GraphDelta> {
        let applied = match store.apply_delta(delta) {
            Ok(applied) => applied,
            Err(err) => {
                log::warn!("consistency violation, dropping engine edit: {err}");
                return None;
            }
        };
        store.set_skip_sync(true);
        for key in applied.touched_link_keys() {
            engine.set_link_stroke(key, theme.link_stroke());
        }
        if !applied.is_empty() {
            (self.on_model_change)(&applied);
        }
        Some(applied)
    }

    /// Theme-driven pass over every current link. Touches presentation
    /// state only; canonical records are never mutated here.
    pub fn recolor_all(
        &self,
        store: &GraphStore,
        engine: &mut dyn RenderEngine,
        theme: ThemeState,
    ) {
        let color = theme.link_stroke();
        for link in &store.snapshot().links {
            engine.set_link_stroke(link.key, color);
        }
    }
}
