//! Event objects and listener registry
//!
//! Dispatch follows the DOM model: a propagation path is computed from the
//! target up to the window, capture listeners run top-down, then bubble
//! listeners run bottom-up. Composed events cross shadow boundaries to the
//! host element.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::node::NodeId;

/// Common event types
pub mod event_types {
    pub const CLICK: &str = "click";
    /// Emitted by [`click_outside`](crate::click_outside::click_outside)
    pub const CLICK_OUTSIDE: &str = "click_outside";
}

new_key_type! {
    /// Handle returned by `add_event_listener`
    pub struct ListenerId;
}

/// Something listeners can be attached to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Window,
    Node(NodeId),
}

impl From<NodeId> for EventTarget {
    fn from(node: NodeId) -> Self {
        EventTarget::Node(node)
    }
}

/// Current dispatch phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EventPhase {
    #[default]
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

/// Listener registration flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub once: bool,
}

impl ListenerOptions {
    pub const fn capture() -> Self {
        Self {
            capture: true,
            once: false,
        }
    }
}

/// A dispatched event
#[derive(Clone, Debug)]
pub struct Event {
    event_type: String,
    bubbles: bool,
    composed: bool,
    cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
    phase: EventPhase,
    target: Option<EventTarget>,
    current_target: Option<EventTarget>,
    path: Vec<EventTarget>,
}

impl Event {
    /// A plain event: no bubbling, not composed, not cancelable
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            bubbles: false,
            composed: false,
            cancelable: false,
            default_prevented: false,
            propagation_stopped: false,
            phase: EventPhase::None,
            target: None,
            current_target: None,
            path: Vec::new(),
        }
    }

    /// A notification that bubbles and crosses shadow boundaries
    pub fn custom(event_type: impl Into<String>) -> Self {
        Self::new(event_type).with_bubbles(true).with_composed(true)
    }

    /// A pointer activation, as produced by a real click
    pub fn click() -> Self {
        Self::new(event_types::CLICK)
            .with_bubbles(true)
            .with_composed(true)
            .with_cancelable(true)
    }

    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    pub fn with_composed(mut self, composed: bool) -> Self {
        self.composed = composed;
        self
    }

    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn composed(&self) -> bool {
        self.composed
    }

    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    /// Mark the event as handled. Ignored for non-cancelable events.
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn phase(&self) -> EventPhase {
        self.phase
    }

    /// The node the event was dispatched at
    pub fn target(&self) -> Option<EventTarget> {
        self.target
    }

    /// The target whose listener is currently running
    pub fn current_target(&self) -> Option<EventTarget> {
        self.current_target
    }

    /// Propagation path, innermost first
    pub fn composed_path(&self) -> &[EventTarget] {
        &self.path
    }

    pub(crate) fn begin(&mut self, target: NodeId, path: Vec<EventTarget>) {
        self.target = Some(EventTarget::Node(target));
        self.path = path;
        self.propagation_stopped = false;
    }

    pub(crate) fn enter(&mut self, phase: EventPhase, current: EventTarget) {
        self.phase = phase;
        self.current_target = Some(current);
    }

    pub(crate) fn finish(&mut self) {
        self.phase = EventPhase::None;
        self.current_target = None;
    }
}

/// Listener callback
pub type Listener = Rc<dyn Fn(&mut Event)>;

struct ListenerEntry {
    target: EventTarget,
    event_type: String,
    options: ListenerOptions,
    handler: Listener,
}

/// Registered listeners, keyed by target and event type
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    entries: SlotMap<ListenerId, ListenerEntry>,
    by_target: FxHashMap<(EventTarget, String), SmallVec<[ListenerId; 4]>>,
}

impl ListenerRegistry {
    pub(crate) fn add(
        &mut self,
        target: EventTarget,
        event_type: &str,
        options: ListenerOptions,
        handler: Listener,
    ) -> ListenerId {
        let id = self.entries.insert(ListenerEntry {
            target,
            event_type: event_type.to_string(),
            options,
            handler,
        });
        self.by_target
            .entry((target, event_type.to_string()))
            .or_default()
            .push(id);
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let Some(entry) = self.entries.remove(id) else {
            return false;
        };
        let key = (entry.target, entry.event_type);
        if let Some(ids) = self.by_target.get_mut(&key) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.by_target.remove(&key);
            }
        }
        true
    }

    /// Snapshot the handlers for one target/phase. `once` listeners are
    /// unregistered as part of the snapshot.
    pub(crate) fn take_matching(
        &mut self,
        target: EventTarget,
        event_type: &str,
        capture: bool,
    ) -> SmallVec<[Listener; 4]> {
        let key = (target, event_type.to_string());
        let Some(ids) = self.by_target.get(&key) else {
            return SmallVec::new();
        };

        let mut handlers = SmallVec::new();
        let mut expired: SmallVec<[ListenerId; 2]> = SmallVec::new();
        for id in ids {
            if let Some(entry) = self.entries.get(*id) {
                if entry.options.capture == capture {
                    handlers.push(Rc::clone(&entry.handler));
                    if entry.options.once {
                        expired.push(*id);
                    }
                }
            }
        }
        for id in expired {
            self.remove(id);
        }
        handlers
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
