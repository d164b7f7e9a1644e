//! Custom element hosting
//!
//! [`ElementHost`] ties a component to the custom element it renders into:
//! it owns the shadow root and the stylesheet, forwards connect and
//! disconnect to the component, and sends host-level DOM events.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use visfab_dom::{Document, Dom, Event, NodeId};

use crate::component::{Component, Subscription};
use crate::error::Result;
use crate::value::Value;

/// Component side of a custom element
#[derive(Debug)]
pub struct ElementHost {
    dom: Weak<Document>,
    host: NodeId,
    shadow_root: NodeId,
    component: RefCell<Option<Component>>,
}

impl ElementHost {
    /// Open a shadow root on `host` and install `stylesheet` in it
    pub fn attach(dom: &Dom, host: NodeId, stylesheet: &str) -> Result<Self> {
        let shadow_root = dom.attach_shadow(host)?;
        if !stylesheet.is_empty() {
            let style = dom.create_element("style");
            let text = dom.create_text(stylesheet);
            dom.append(style, text)?;
            dom.append(shadow_root, style)?;
        }
        Ok(Self {
            dom: Rc::downgrade(dom),
            host,
            shadow_root,
            component: RefCell::new(None),
        })
    }

    pub fn bind(&self, component: Component) {
        *self.component.borrow_mut() = Some(component);
    }

    pub fn component(&self) -> Option<Component> {
        self.component.borrow().clone()
    }

    pub fn host(&self) -> NodeId {
        self.host
    }

    pub fn shadow_root(&self) -> NodeId {
        self.shadow_root
    }

    pub fn dom(&self) -> Option<Dom> {
        self.dom.upgrade()
    }

    /// Current host attributes, used as initial props
    pub fn attribute_props(&self) -> Vec<(String, String)> {
        self.dom()
            .map(|dom| dom.attributes(self.host))
            .unwrap_or_default()
    }

    pub fn connected(&self) {
        if let Some(component) = self.component() {
            component.connected();
        }
    }

    pub fn disconnected(&self) {
        if let Some(component) = self.component() {
            component.disconnected();
        }
    }

    /// Destroy the component and remove its nodes from the shadow root.
    /// Returns `false` when there was nothing left to destroy.
    pub fn destroy(&self) -> bool {
        self.component().is_some_and(|component| component.destroy(true))
    }

    pub fn set<I, K, V>(&self, props: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        if let Some(component) = self.component() {
            component.set(props);
        }
    }

    pub fn on<F: Fn(&Value) + 'static>(&self, event_type: &str, callback: F) -> Option<Subscription> {
        self.component().map(|component| component.on(event_type, callback))
    }

    /// Dispatch a bubbling, composed event named `event_type` on the host
    pub fn dispatch_host_event(&self, event_type: &str) -> Option<Event> {
        let dom = self.dom()?;
        tracing::trace!(host = ?self.host, event_type, "host event");
        Some(dom.dispatch_event(self.host, Event::custom(event_type)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentDefinition, ComponentOptions, Fragment, Props};
    use crate::microtask::MicrotaskQueue;
    use crate::scheduler::Scheduler;
    use visfab_dom::ListenerOptions;

    struct Empty;

    impl ComponentDefinition for Empty {
        fn name(&self) -> &'static str {
            "x-empty"
        }

        fn props(&self) -> &[(&'static str, usize)] {
            &[("label", 0)]
        }

        fn instance(&self, _component: &Component, props: &Props) -> Vec<Value> {
            vec![props.get("label").cloned().unwrap_or_default()]
        }

        fn create_fragment(&self, _component: &Component, _ctx: &[Value]) -> Option<Box<dyn Fragment>> {
            None
        }
    }

    #[test]
    fn test_attach_installs_stylesheet() {
        let dom = Document::new();
        let host = dom.create_element("x-empty");
        dom.set_attribute(host, "label", "hi").unwrap();

        let element = ElementHost::attach(&dom, host, ":host { display: block; }").unwrap();
        let style = dom.find_by_tag(element.shadow_root(), "style").unwrap();
        let text = dom.children(style)[0];
        assert_eq!(dom.text(text).as_deref(), Some(":host { display: block; }"));
        assert_eq!(element.attribute_props(), vec![("label".to_string(), "hi".to_string())]);
        assert!(ElementHost::attach(&dom, host, "").is_err());
    }

    #[test]
    fn test_host_events_cross_the_shadow_boundary() {
        let dom = Document::new();
        let host = dom.create_element("x-empty");
        dom.append(dom.body(), host).unwrap();
        let element = ElementHost::attach(&dom, host, "").unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        dom.add_event_listener(dom.body(), "open", ListenerOptions::default(), move |event| {
            log.borrow_mut().push(event.event_type().to_string());
        });

        let event = element.dispatch_host_event("open").unwrap();
        assert!(event.bubbles() && event.composed());
        assert_eq!(*seen.borrow(), vec!["open"]);
    }

    #[test]
    fn test_destroy_without_component() {
        let queue = MicrotaskQueue::new();
        let scheduler = Scheduler::new(queue);
        let dom = Document::new();
        let host = dom.create_element("x-empty");
        let element = ElementHost::attach(&dom, host, "").unwrap();
        assert!(!element.destroy());

        let options = ComponentOptions::new().host(host).target(element.shadow_root());
        let component = Component::init(&scheduler, &dom, Rc::new(Empty), options).unwrap();
        element.bind(component);
        element.set([("label", "set")]);
        assert_eq!(element.component().unwrap().prop("label"), Some("set".into()));
        assert!(element.destroy());
        assert!(!element.destroy());
    }
}
