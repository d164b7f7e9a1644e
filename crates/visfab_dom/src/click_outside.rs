//! Click-outside detection
//!
//! Listens for clicks anywhere in the window (capture phase) and dispatches
//! a `click_outside` event on the watched node when the click originated
//! outside of it and nobody marked the click as handled.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::document::{Document, Dom};
use crate::events::{event_types, Event, EventTarget, ListenerId, ListenerOptions};
use crate::node::NodeId;

/// Disposer for an active click-outside watch
#[derive(Debug)]
pub struct ClickOutside {
    dom: Weak<Document>,
    node: NodeId,
    listener: Cell<Option<ListenerId>>,
}

/// Start watching clicks outside `node`
pub fn click_outside(dom: &Dom, node: NodeId) -> ClickOutside {
    let weak = Rc::downgrade(dom);
    let listener = dom.add_event_listener(
        EventTarget::Window,
        event_types::CLICK,
        ListenerOptions::capture(),
        move |event| {
            let Some(dom) = weak.upgrade() else {
                return;
            };
            if is_outside(&dom, node, event) && !event.default_prevented() {
                tracing::trace!(?node, "click outside");
                dom.dispatch_event(node, Event::new(event_types::CLICK_OUTSIDE));
            }
        },
    );

    ClickOutside {
        dom: Rc::downgrade(dom),
        node,
        listener: Cell::new(Some(listener)),
    }
}

fn is_outside(dom: &Document, node: NodeId, event: &Event) -> bool {
    match event.composed_path().first() {
        Some(EventTarget::Node(origin)) => !dom.contains(node, *origin),
        _ => true,
    }
}

impl ClickOutside {
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn is_active(&self) -> bool {
        self.listener.get().is_some()
    }

    /// Stop watching. Returns `false` if already disposed.
    pub fn destroy(&self) -> bool {
        let Some(listener) = self.listener.take() else {
            return false;
        };
        if let Some(dom) = self.dom.upgrade() {
            dom.remove_event_listener(listener);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn setup() -> (Dom, NodeId, NodeId, NodeId, Rc<RefCell<u32>>) {
        let dom = Document::new();
        let watched = dom.create_element("div");
        let inside = dom.create_element("span");
        let outside = dom.create_element("p");
        dom.append(dom.body(), watched).unwrap();
        dom.append(watched, inside).unwrap();
        dom.append(dom.body(), outside).unwrap();

        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        dom.add_event_listener(
            watched,
            event_types::CLICK_OUTSIDE,
            ListenerOptions::default(),
            move |_| *counter.borrow_mut() += 1,
        );
        (dom, watched, inside, outside, hits)
    }

    #[test]
    fn test_outside_click_notifies() {
        let (dom, watched, _, outside, hits) = setup();
        let _watch = click_outside(&dom, watched);
        dom.dispatch_event(outside, Event::click());
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_inside_click_is_ignored() {
        let (dom, watched, inside, _, hits) = setup();
        let _watch = click_outside(&dom, watched);
        dom.dispatch_event(inside, Event::click());
        dom.dispatch_event(watched, Event::click());
        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn test_handled_click_is_ignored() {
        let (dom, watched, _, outside, hits) = setup();
        let _watch = click_outside(&dom, watched);
        let mut click = Event::click();
        click.prevent_default();
        dom.dispatch_event(outside, click);
        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn test_destroy_detaches_once() {
        let (dom, watched, _, outside, hits) = setup();
        let listeners_before = dom.listener_count();
        let watch = click_outside(&dom, watched);
        assert_eq!(dom.listener_count(), listeners_before + 1);

        assert!(watch.destroy());
        assert!(!watch.destroy());
        assert!(!watch.is_active());
        assert_eq!(dom.listener_count(), listeners_before);

        dom.dispatch_event(outside, Event::click());
        assert_eq!(*hits.borrow(), 0);
    }
}
