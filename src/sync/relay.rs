//! Event Relay
//!
//! Forwards interaction notifications (selection changes) from the
//! rendering engine to a single host callback. Attachment is an explicit
//! state machine rather than something implied by a UI framework's
//! mount/unmount: the relay subscribes exactly once per engine instance,
//! detaches deterministically, and can never deliver after teardown or from
//! a stale subscription that survived an instance swap.

use std::sync::mpsc::{channel, Receiver};

use crate::engine::{EngineEvent, EventKind, RenderEngine, SubscriptionId};

/// Where the relay is in its attach/detach lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelayState {
    /// Never attached to an engine instance.
    #[default]
    Unattached,
    /// Subscribed to the current engine instance.
    Attached,
    /// Explicitly detached; a new engine instance may re-attach.
    Detached,
}

/// Host callback receiving relayed interaction events.
pub type InteractionCallback = Box<dyn FnMut(&EngineEvent)>;

pub struct EventRelay {
    state: RelayState,
    /// Instance the current subscription belongs to.
    engine_instance: Option<u64>,
    subscription: Option<SubscriptionId>,
    rx: Option<Receiver<EngineEvent>>,
    on_event: InteractionCallback,
}

impl EventRelay {
    pub fn new(on_event: impl FnMut(&EngineEvent) + 'static) -> Self {
        Self {
            state: RelayState::Unattached,
            engine_instance: None,
            subscription: None,
            rx: None,
            on_event: Box::new(on_event),
        }
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Subscribe to the engine's selection-changed channel.
    ///
    /// Idempotent per instance: re-attaching to the engine we are already
    /// subscribed to does nothing. Attaching to a different instance first
    /// discards the stale subscription (its receiver is dropped, so even a
    /// sender lingering inside the old engine can no longer deliver).
    pub fn attach(&mut self, engine: &mut dyn RenderEngine) {
        if self.state == RelayState::Attached
            && self.engine_instance == Some(engine.instance_id())
        {
            return;
        }
        self.discard_subscription();

        let (tx, rx) = channel();
        let id = engine.subscribe(EventKind::SelectionChanged, tx);
        self.subscription = Some(id);
        self.engine_instance = Some(engine.instance_id());
        self.rx = Some(rx);
        self.state = RelayState::Attached;
    }

    /// Unsubscribe from the given engine and drop any queued, undelivered
    /// notifications.
    pub fn detach(&mut self, engine: &mut dyn RenderEngine) {
        if self.engine_instance == Some(engine.instance_id()) {
            if let Some(id) = self.subscription {
                engine.unsubscribe(id);
            }
        }
        self.discard_subscription();
        self.state = RelayState::Detached;
    }

    /// Deliver every queued notification to the host callback, in arrival
    /// order. Does nothing unless attached.
    pub fn pump(&mut self) {
        if self.state != RelayState::Attached {
            return;
        }
        let Some(rx) = &self.rx else {
            return;
        };
        while let Ok(event) = rx.try_recv() {
            (self.on_event)(&event);
        }
    }

    fn discard_subscription(&mut self) {
        self.subscription = None;
        self.engine_instance = None;
        self.rx = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::HeadlessEngine;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Seen = Rc<RefCell<Vec<EngineEvent>>>;

    fn relay() -> (EventRelay, Seen) {
        let seen: Seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let relay = EventRelay::new(move |event: &EngineEvent| {
            sink.borrow_mut().push(event.clone());
        });
        (relay, seen)
    }

    #[test]
    fn test_attach_pump_delivers_in_order() {
        let mut engine = HeadlessEngine::new();
        let (mut relay, seen) = relay();
        assert_eq!(relay.state(), RelayState::Unattached);

        relay.attach(&mut engine);
        engine.select(vec![1]);
        engine.select(vec![2]);
        relay.pump();

        assert_eq!(
            seen.borrow().as_slice(),
            &[
                EngineEvent::SelectionChanged { selected: vec![1] },
                EngineEvent::SelectionChanged { selected: vec![2] },
            ]
        );
    }

    #[test]
    fn test_reattach_to_same_instance_subscribes_once() {
        let mut engine = HeadlessEngine::new();
        let (mut relay, seen) = relay();

        relay.attach(&mut engine);
        relay.attach(&mut engine);
        assert_eq!(engine.subscriber_count(EventKind::SelectionChanged), 1);

        engine.select(vec![1]);
        relay.pump();
        // One subscription, one delivery.
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_no_delivery_after_detach() {
        let mut engine = HeadlessEngine::new();
        let (mut relay, seen) = relay();

        relay.attach(&mut engine);
        engine.select(vec![1]);
        relay.detach(&mut engine);
        assert_eq!(relay.state(), RelayState::Detached);
        assert_eq!(engine.subscriber_count(EventKind::SelectionChanged), 0);

        // Neither the event queued before detach nor one emitted after may
        // reach the host.
        engine.select(vec![2]);
        relay.pump();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_instance_swap_discards_stale_subscription() {
        let mut old_engine = HeadlessEngine::new();
        let mut new_engine = HeadlessEngine::new();
        let (mut relay, seen) = relay();

        relay.attach(&mut old_engine);
        // The old instance is replaced without an explicit detach; the stale
        // subscription must not produce duplicate or ghost deliveries.
        relay.attach(&mut new_engine);

        old_engine.select(vec![7]);
        new_engine.select(vec![1]);
        relay.pump();

        assert_eq!(
            seen.borrow().as_slice(),
            &[EngineEvent::SelectionChanged { selected: vec![1] }]
        );
        // The stale sender was pruned on its first failed delivery.
        assert_eq!(old_engine.subscriber_count(EventKind::SelectionChanged), 0);
    }

    #[test]
    fn test_detach_then_reattach_delivers_exactly_once() {
        let mut engine = HeadlessEngine::new();
        let (mut relay, seen) = relay();

        relay.attach(&mut engine);
        relay.detach(&mut engine);
        relay.attach(&mut engine);
        assert_eq!(relay.state(), RelayState::Attached);
        assert_eq!(engine.subscriber_count(EventKind::SelectionChanged), 1);

        engine.select(vec![3]);
        relay.pump();
        assert_eq!(seen.borrow().len(), 1);
    }
}
