//! The document: node arena, tree mutation, attributes, styles and dispatch
//!
//! All methods take `&self`. Internal state lives behind `RefCell`s and no
//! borrow is held while listeners or element reactions run, so callbacks are
//! free to mutate the document again.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::error::{DomError, Result};
use crate::events::{
    Event, EventPhase, EventTarget, Listener, ListenerId, ListenerOptions, ListenerRegistry,
};
use crate::node::{ElementData, Node, NodeId, NodeKind};
use crate::registry::{CustomElementRegistry, ElementConstructor, ElementReactions, Upgraded};

/// Shared handle to a document
pub type Dom = Rc<Document>;

/// An in-memory document
pub struct Document {
    this: Weak<Document>,
    nodes: RefCell<SlotMap<NodeId, Node>>,
    root: NodeId,
    body: NodeId,
    listeners: RefCell<ListenerRegistry>,
    registry: RefCell<CustomElementRegistry>,
    upgraded: RefCell<FxHashMap<NodeId, Upgraded>>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.borrow().len())
            .field("listeners", &self.listeners.borrow().len())
            .field("upgraded", &self.upgraded.borrow().len())
            .finish()
    }
}

impl Document {
    /// Create an empty document with a `<body>`
    pub fn new() -> Dom {
        Rc::new_cyclic(|this| {
            let mut nodes = SlotMap::with_key();
            let root = nodes.insert(Node::new(NodeKind::Document));
            let body = nodes.insert(Node::new(NodeKind::Element(ElementData::new("body"))));
            nodes[body].parent = Some(root);
            nodes[root].children.push(body);

            Document {
                this: this.clone(),
                nodes: RefCell::new(nodes),
                root,
                body,
                listeners: RefCell::new(ListenerRegistry::default()),
                registry: RefCell::new(CustomElementRegistry::new()),
                upgraded: RefCell::new(FxHashMap::default()),
            }
        })
    }

    /// A strong handle to this document
    pub fn handle(&self) -> Option<Dom> {
        self.this.upgrade()
    }

    pub fn document_node(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    // =========================================================================
    // Node creation
    // =========================================================================

    pub fn create_element(&self, tag: &str) -> NodeId {
        self.nodes
            .borrow_mut()
            .insert(Node::new(NodeKind::Element(ElementData::new(tag))))
    }

    pub fn create_text(&self, data: &str) -> NodeId {
        self.nodes
            .borrow_mut()
            .insert(Node::new(NodeKind::Text(data.to_string())))
    }

    /// Create an element for a defined custom tag and run its constructor
    pub fn create_custom_element(&self, tag: &str) -> Result<NodeId> {
        let constructor = self
            .registry
            .borrow()
            .get(tag)
            .ok_or_else(|| DomError::UndefinedElement(tag.to_string()))?;
        let dom = self
            .handle()
            .ok_or_else(|| DomError::Construction {
                tag: tag.to_string(),
                reason: "document is being dropped".to_string(),
            })?;

        let node = self.create_element(tag);
        let upgraded = constructor(&dom, node)?;
        self.upgraded.borrow_mut().insert(node, upgraded);
        tracing::debug!(tag, ?node, "custom element upgraded");
        Ok(node)
    }

    /// Register a custom element constructor
    pub fn define(&self, tag: &str, constructor: ElementConstructor) -> Result<()> {
        self.registry.borrow_mut().define(tag, constructor)
    }

    pub fn is_defined(&self, tag: &str) -> bool {
        self.registry.borrow().is_defined(tag)
    }

    /// The concrete element behind an upgraded node
    pub fn custom_element<T: 'static>(&self, node: NodeId) -> Option<Rc<T>> {
        let instance: Rc<dyn Any> = self.upgraded.borrow().get(&node)?.instance.clone();
        instance.downcast::<T>().ok()
    }

    /// Attach an open shadow root to `host`
    pub fn attach_shadow(&self, host: NodeId) -> Result<NodeId> {
        let mut nodes = self.nodes.borrow_mut();
        let element = nodes
            .get(host)
            .ok_or(DomError::MissingNode(host))?
            .element()
            .ok_or(DomError::NotAnElement(host))?;
        if element.shadow_root.is_some() {
            return Err(DomError::ShadowRootExists(host));
        }

        let shadow = nodes.insert(Node::new(NodeKind::ShadowRoot { host }));
        if let Some(element) = nodes[host].element_mut() {
            element.shadow_root = Some(shadow);
        }
        Ok(shadow)
    }

    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.nodes.borrow().get(host)?.element()?.shadow_root
    }

    // =========================================================================
    // Tree queries
    // =========================================================================

    pub fn exists(&self, node: NodeId) -> bool {
        self.nodes.borrow().contains_key(node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.borrow().get(node)?.parent
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .borrow()
            .get(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn tag(&self, node: NodeId) -> Option<String> {
        Some(self.nodes.borrow().get(node)?.element()?.tag.clone())
    }

    pub fn text(&self, node: NodeId) -> Option<String> {
        match &self.nodes.borrow().get(node)?.kind {
            NodeKind::Text(data) => Some(data.clone()),
            _ => None,
        }
    }

    /// Inclusive descendant check. Does not cross shadow boundaries.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let nodes = self.nodes.borrow();
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// Whether the node is reachable from the document, through shadow hosts
    pub fn is_connected(&self, node: NodeId) -> bool {
        let nodes = self.nodes.borrow();
        Self::connected_in(&nodes, node, self.root)
    }

    fn connected_in(nodes: &SlotMap<NodeId, Node>, node: NodeId, root: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == root {
                return true;
            }
            let Some(entry) = nodes.get(current) else {
                return false;
            };
            current = match (entry.parent, &entry.kind) {
                (Some(parent), _) => parent,
                (None, NodeKind::ShadowRoot { host }) => *host,
                (None, _) => return false,
            };
        }
    }

    /// First element in tree order (shadow trees excluded) matching `tag`
    pub fn find_by_tag(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        let nodes = self.nodes.borrow();
        let mut stack = vec![scope];
        while let Some(id) = stack.pop() {
            let node = nodes.get(id)?;
            if node.element().is_some_and(|e| e.tag == tag) {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    // =========================================================================
    // Tree mutation
    // =========================================================================

    pub fn append(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert(parent, child, None)
    }

    /// Insert `child` into `parent` before `anchor` (appended when `None`).
    /// A child that already has a parent is moved.
    pub fn insert(&self, parent: NodeId, child: NodeId, anchor: Option<NodeId>) -> Result<()> {
        let (was_connected, now_connected) = {
            let mut nodes = self.nodes.borrow_mut();
            let parent_node = nodes.get(parent).ok_or(DomError::MissingNode(parent))?;
            if !parent_node.is_container() {
                return Err(DomError::NotAContainer(parent));
            }
            if !nodes.contains_key(child) {
                return Err(DomError::MissingNode(child));
            }
            if let Some(anchor) = anchor {
                if nodes.get(anchor).and_then(|n| n.parent) != Some(parent) {
                    return Err(DomError::AnchorNotChild { parent, anchor });
                }
            }
            // Reject cycles: the child may not be an inclusive ancestor of the parent
            let mut current = Some(parent);
            while let Some(id) = current {
                if id == child {
                    return Err(DomError::HierarchyRequest { parent, child });
                }
                current = nodes.get(id).and_then(|n| n.parent);
            }

            let was_connected = Self::connected_in(&nodes, child, self.root);
            if let Some(old_parent) = nodes[child].parent.take() {
                nodes[old_parent].children.retain(|c| *c != child);
            }
            let position = match anchor {
                Some(anchor) => nodes[parent]
                    .children
                    .iter()
                    .position(|c| *c == anchor)
                    .unwrap_or(nodes[parent].children.len()),
                None => nodes[parent].children.len(),
            };
            nodes[parent].children.insert(position, child);
            nodes[child].parent = Some(parent);
            (was_connected, Self::connected_in(&nodes, child, self.root))
        };

        if was_connected && !now_connected {
            self.react_disconnected(child);
        } else if !was_connected && now_connected {
            self.react_connected(child);
        }
        Ok(())
    }

    /// Remove `node` from its parent
    pub fn detach(&self, node: NodeId) -> Result<()> {
        let was_connected = {
            let mut nodes = self.nodes.borrow_mut();
            let entry = nodes.get(node).ok_or(DomError::MissingNode(node))?;
            let parent = entry.parent.ok_or(DomError::NoParent(node))?;
            let was_connected = Self::connected_in(&nodes, node, self.root);
            nodes[parent].children.retain(|c| *c != node);
            nodes[node].parent = None;
            was_connected
        };

        if was_connected {
            self.react_disconnected(node);
        }
        Ok(())
    }

    // =========================================================================
    // Attributes, styles, checkedness
    // =========================================================================

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes
            .borrow()
            .get(node)?
            .element()?
            .attributes
            .get(name)
            .cloned()
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    /// All attributes in insertion order
    pub fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        self.nodes
            .borrow()
            .get(node)
            .and_then(Node::element)
            .map(|e| {
                e.attributes
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.write_attribute(node, name, Some(value))
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) -> Result<()> {
        self.write_attribute(node, name, None)
    }

    /// Set or remove an attribute, skipping the write when it already holds `value`
    pub fn attr(&self, node: NodeId, name: &str, value: Option<&str>) -> Result<()> {
        if self.attribute(node, name).as_deref() == value {
            return Ok(());
        }
        self.write_attribute(node, name, value)
    }

    fn write_attribute(&self, node: NodeId, name: &str, value: Option<&str>) -> Result<()> {
        let old = {
            let mut nodes = self.nodes.borrow_mut();
            let element = nodes
                .get_mut(node)
                .ok_or(DomError::MissingNode(node))?
                .element_mut()
                .ok_or(DomError::NotAnElement(node))?;
            match value {
                Some(value) => element.attributes.insert(name.to_string(), value.to_string()),
                None => element.attributes.shift_remove(name),
            }
        };

        if old.is_none() && value.is_none() {
            return Ok(());
        }

        let reactions = self.upgraded.borrow().get(&node).map(|u| u.reactions.clone());
        if let Some(reactions) = reactions {
            if reactions.observed_attributes().contains(&name) {
                reactions.attribute_changed(name, old.as_deref(), value);
            }
        }
        Ok(())
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.nodes
            .borrow()
            .get(node)?
            .element()?
            .style
            .get(property)
            .cloned()
    }

    /// Set an inline style property, or remove it when `value` is `None`
    pub fn set_style(&self, node: NodeId, property: &str, value: Option<&str>) -> Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        let element = nodes
            .get_mut(node)
            .ok_or(DomError::MissingNode(node))?
            .element_mut()
            .ok_or(DomError::NotAnElement(node))?;
        match value {
            Some(value) => {
                element.style.insert(property.to_string(), value.to_string());
            }
            None => {
                element.style.shift_remove(property);
            }
        }
        Ok(())
    }

    pub fn checked(&self, node: NodeId) -> bool {
        self.nodes
            .borrow()
            .get(node)
            .and_then(Node::element)
            .is_some_and(|e| e.checked)
    }

    pub fn set_checked(&self, node: NodeId, checked: bool) -> Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        let element = nodes
            .get_mut(node)
            .ok_or(DomError::MissingNode(node))?
            .element_mut()
            .ok_or(DomError::NotAnElement(node))?;
        element.checked = checked;
        Ok(())
    }

    // =========================================================================
    // Events
    // =========================================================================

    pub fn add_event_listener<F>(
        &self,
        target: impl Into<EventTarget>,
        event_type: &str,
        options: ListenerOptions,
        handler: F,
    ) -> ListenerId
    where
        F: Fn(&mut Event) + 'static,
    {
        let handler: Listener = Rc::new(handler);
        self.listeners
            .borrow_mut()
            .add(target.into(), event_type, options, handler)
    }

    /// Returns `false` when the listener was already removed
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        self.listeners.borrow_mut().remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Dispatch `event` at `target` and return it after propagation
    pub fn dispatch_event(&self, target: NodeId, mut event: Event) -> Event {
        let path = self.event_path(target, event.composed());
        event.begin(target, path.clone());
        let target = EventTarget::Node(target);

        for current in path.iter().rev() {
            let phase = if *current == target {
                EventPhase::AtTarget
            } else {
                EventPhase::Capturing
            };
            self.invoke(*current, phase, true, &mut event);
            if event.propagation_stopped() {
                event.finish();
                return event;
            }
        }

        for (depth, current) in path.iter().enumerate() {
            if depth > 0 && !event.bubbles() {
                break;
            }
            let phase = if depth == 0 {
                EventPhase::AtTarget
            } else {
                EventPhase::Bubbling
            };
            self.invoke(*current, phase, false, &mut event);
            if event.propagation_stopped() {
                break;
            }
        }

        event.finish();
        event
    }

    fn invoke(&self, current: EventTarget, phase: EventPhase, capture: bool, event: &mut Event) {
        let handlers =
            self.listeners
                .borrow_mut()
                .take_matching(current, event.event_type(), capture);
        if handlers.is_empty() {
            return;
        }
        event.enter(phase, current);
        for handler in handlers {
            handler(event);
        }
    }

    /// Propagation path from `target` outwards, ending at the window when the
    /// target is connected
    fn event_path(&self, target: NodeId, composed: bool) -> Vec<EventTarget> {
        let nodes = self.nodes.borrow();
        let mut path = Vec::new();
        let mut current = Some(target);
        while let Some(id) = current {
            let Some(node) = nodes.get(id) else {
                break;
            };
            path.push(EventTarget::Node(id));
            current = match (node.parent, &node.kind) {
                (Some(parent), _) => Some(parent),
                (None, NodeKind::ShadowRoot { host }) if composed => Some(*host),
                (None, NodeKind::Document) => {
                    path.push(EventTarget::Window);
                    None
                }
                (None, _) => None,
            };
        }
        path
    }

    // =========================================================================
    // Element reactions
    // =========================================================================

    fn upgraded_in_subtree(&self, node: NodeId) -> SmallVec<[Rc<dyn ElementReactions>; 2]> {
        let nodes = self.nodes.borrow();
        let upgraded = self.upgraded.borrow();
        let mut found = SmallVec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let Some(entry) = nodes.get(id) else {
                continue;
            };
            if let Some(element) = upgraded.get(&id) {
                found.push(element.reactions.clone());
            }
            if let Some(shadow) = entry.element().and_then(|e| e.shadow_root) {
                stack.push(shadow);
            }
            stack.extend(entry.children.iter().rev().copied());
        }
        found
    }

    fn react_connected(&self, node: NodeId) {
        for reactions in self.upgraded_in_subtree(node) {
            reactions.connected();
        }
    }

    fn react_disconnected(&self, node: NodeId) {
        for reactions in self.upgraded_in_subtree(node) {
            reactions.disconnected();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_insert_before_anchor() {
        let dom = Document::new();
        let parent = dom.create_element("main");
        let a = dom.create_element("a");
        let b = dom.create_element("b");
        let c = dom.create_element("c");

        dom.append(parent, a).unwrap();
        dom.append(parent, c).unwrap();
        dom.insert(parent, b, Some(c)).unwrap();
        assert_eq!(dom.children(parent), vec![a, b, c]);
    }

    #[test]
    fn test_insert_rejects_foreign_anchor() {
        let dom = Document::new();
        let parent = dom.create_element("main");
        let child = dom.create_element("div");
        let stranger = dom.create_element("span");

        assert_eq!(
            dom.insert(parent, child, Some(stranger)),
            Err(DomError::AnchorNotChild {
                parent,
                anchor: stranger
            })
        );
    }

    #[test]
    fn test_insert_rejects_cycle() {
        let dom = Document::new();
        let outer = dom.create_element("div");
        let inner = dom.create_element("div");
        dom.append(outer, inner).unwrap();

        assert_eq!(
            dom.append(inner, outer),
            Err(DomError::HierarchyRequest {
                parent: inner,
                child: outer
            })
        );
    }

    #[test]
    fn test_detach_without_parent_is_an_error() {
        let dom = Document::new();
        let orphan = dom.create_element("div");
        assert_eq!(dom.detach(orphan), Err(DomError::NoParent(orphan)));
    }

    #[test]
    fn test_move_between_parents() {
        let dom = Document::new();
        let first = dom.create_element("div");
        let second = dom.create_element("div");
        let child = dom.create_text("x");

        dom.append(first, child).unwrap();
        dom.append(second, child).unwrap();
        assert!(dom.children(first).is_empty());
        assert_eq!(dom.parent(child), Some(second));
    }

    #[test]
    fn test_attr_skips_identical_value() {
        let dom = Document::new();
        let node = dom.create_element("input");
        dom.attr(node, "type", Some("checkbox")).unwrap();
        dom.attr(node, "type", Some("checkbox")).unwrap();
        assert_eq!(dom.attribute(node, "type").as_deref(), Some("checkbox"));

        dom.attr(node, "type", None).unwrap();
        assert!(!dom.has_attribute(node, "type"));
    }

    #[test]
    fn test_style_set_and_remove() {
        let dom = Document::new();
        let node = dom.create_element("div");
        dom.set_style(node, "--height", Some("50px")).unwrap();
        assert_eq!(dom.style(node, "--height").as_deref(), Some("50px"));
        dom.set_style(node, "--height", None).unwrap();
        assert_eq!(dom.style(node, "--height"), None);
    }

    #[test]
    fn test_text_nodes_are_not_containers() {
        let dom = Document::new();
        let text = dom.create_text(" ");
        let child = dom.create_element("div");
        assert_eq!(dom.append(text, child), Err(DomError::NotAContainer(text)));
        assert_eq!(dom.text(text).as_deref(), Some(" "));
    }

    #[test]
    fn test_shadow_tree_connectivity() {
        let dom = Document::new();
        let host = dom.create_element("vis-fab");
        let shadow = dom.attach_shadow(host).unwrap();
        let inner = dom.create_element("main");
        dom.append(shadow, inner).unwrap();

        assert!(!dom.is_connected(inner));
        dom.append(dom.body(), host).unwrap();
        assert!(dom.is_connected(inner));
        // contains() stops at the shadow boundary
        assert!(!dom.contains(host, inner));
        assert_eq!(dom.attach_shadow(host), Err(DomError::ShadowRootExists(host)));
    }

    #[test]
    fn test_capture_then_bubble_order() {
        let dom = Document::new();
        let outer = dom.create_element("div");
        let inner = dom.create_element("span");
        dom.append(dom.body(), outer).unwrap();
        dom.append(outer, inner).unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        for (target, label, capture) in [
            (EventTarget::Window, "window-capture", true),
            (EventTarget::Node(outer), "outer-capture", true),
            (EventTarget::Node(inner), "inner", false),
            (EventTarget::Node(outer), "outer-bubble", false),
            (EventTarget::Window, "window-bubble", false),
        ] {
            let log = log.clone();
            dom.add_event_listener(
                target,
                "click",
                ListenerOptions {
                    capture,
                    once: false,
                },
                move |_| log.borrow_mut().push(label),
            );
        }

        dom.dispatch_event(inner, Event::click());
        assert_eq!(
            *log.borrow(),
            vec![
                "window-capture",
                "outer-capture",
                "inner",
                "outer-bubble",
                "window-bubble"
            ]
        );
    }

    #[test]
    fn test_non_bubbling_event_stays_at_target() {
        let dom = Document::new();
        let outer = dom.create_element("div");
        let inner = dom.create_element("span");
        dom.append(outer, inner).unwrap();

        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        dom.add_event_listener(outer, "ping", ListenerOptions::default(), move |_| {
            counter.set(counter.get() + 1)
        });

        dom.dispatch_event(inner, Event::new("ping"));
        assert_eq!(hits.get(), 0);
        dom.dispatch_event(inner, Event::new("ping").with_bubbles(true));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_composed_event_crosses_shadow_root() {
        let dom = Document::new();
        let host = dom.create_element("vis-fab");
        dom.append(dom.body(), host).unwrap();
        let shadow = dom.attach_shadow(host).unwrap();
        let inner = dom.create_element("input");
        dom.append(shadow, inner).unwrap();

        let event = dom.dispatch_event(inner, Event::custom("toggle"));
        assert_eq!(event.composed_path().first(), Some(&EventTarget::Node(inner)));
        assert!(event.composed_path().contains(&EventTarget::Node(host)));
        assert_eq!(event.composed_path().last(), Some(&EventTarget::Window));

        let closed = dom.dispatch_event(inner, Event::new("local").with_bubbles(true));
        assert!(!closed.composed_path().contains(&EventTarget::Node(host)));
    }

    #[test]
    fn test_stop_propagation() {
        let dom = Document::new();
        let outer = dom.create_element("div");
        let inner = dom.create_element("span");
        dom.append(outer, inner).unwrap();

        let reached = Rc::new(Cell::new(false));
        let flag = reached.clone();
        dom.add_event_listener(inner, "click", ListenerOptions::default(), |event| {
            event.stop_propagation()
        });
        dom.add_event_listener(outer, "click", ListenerOptions::default(), move |_| {
            flag.set(true)
        });

        dom.dispatch_event(inner, Event::click());
        assert!(!reached.get());
    }

    #[test]
    fn test_listener_may_mutate_document() {
        let dom = Document::new();
        let node = dom.create_element("div");
        let weak = Rc::downgrade(&dom);
        dom.add_event_listener(node, "click", ListenerOptions::default(), move |_| {
            if let Some(dom) = weak.upgrade() {
                let extra = dom.create_element("span");
                dom.append(node, extra).unwrap();
                dom.set_attribute(node, "data-clicked", "yes").unwrap();
            }
        });

        dom.dispatch_event(node, Event::click());
        assert_eq!(dom.children(node).len(), 1);
        assert_eq!(dom.attribute(node, "data-clicked").as_deref(), Some("yes"));
    }
}
