//! Rendered output of `vis-fab`
//!
//! ```text
//! main
//! └─ div.vis-fab-wrapper [data-state, --custom-properties]
//!    ├─ input[type=checkbox]
//!    ├─ div.vis-fab
//!    └─ div.vis-fab-context
//!       └─ slot
//! ```

use std::rc::{Rc, Weak};

use smallvec::SmallVec;
use visfab_core::{DirtyMask, Fragment, Value, WeakComponent};
use visfab_dom::{
    click_outside, event_types, ClickOutside, Document, Dom, ListenerId, ListenerOptions, NodeId,
};

use super::attributes::{SLOT_OPENED, STYLE_BINDINGS};
use super::definition::{apply, state_of};
use super::state::FabEvent;
use crate::config::FabFeatures;

struct FabNodes {
    main: NodeId,
    wrapper: NodeId,
    input: NodeId,
}

pub struct FabFragment {
    dom: Weak<Document>,
    component: WeakComponent,
    features: FabFeatures,
    initial: Vec<Value>,
    nodes: Option<FabNodes>,
    click_outside: Option<ClickOutside>,
    listeners: SmallVec<[ListenerId; 2]>,
}

impl FabFragment {
    pub fn new(dom: &Dom, component: WeakComponent, features: FabFeatures, ctx: &[Value]) -> Self {
        Self {
            dom: Rc::downgrade(dom),
            component,
            features,
            initial: ctx.to_vec(),
            nodes: None,
            click_outside: None,
            listeners: SmallVec::new(),
        }
    }

    fn write_styles(
        &self,
        dom: &Document,
        wrapper: NodeId,
        ctx: &[Value],
        dirty: Option<&DirtyMask>,
    ) -> visfab_dom::Result<()> {
        for (slot, property, feature) in STYLE_BINDINGS {
            if !feature.is_enabled(&self.features) {
                continue;
            }
            if dirty.is_some_and(|dirty| !dirty.is_dirty(slot)) {
                continue;
            }
            let value = ctx.get(slot).and_then(Value::to_css);
            dom.set_style(wrapper, property, value.as_deref())?;
        }
        Ok(())
    }
}

fn element(dom: &Document, tag: &str, parent: NodeId, class: Option<&str>) -> visfab_dom::Result<NodeId> {
    let node = dom.create_element(tag);
    if let Some(class) = class {
        dom.set_attribute(node, "class", class)?;
    }
    dom.append(parent, node)?;
    Ok(node)
}

fn space(dom: &Document, parent: NodeId) -> visfab_dom::Result<()> {
    let text = dom.create_text(" ");
    dom.append(parent, text)
}

fn write_state(dom: &Document, nodes: &FabNodes, opened: bool) -> visfab_dom::Result<()> {
    dom.set_checked(nodes.input, opened)?;
    let state = if opened { "open" } else { "closed" };
    dom.attr(nodes.wrapper, "data-state", Some(state))
}

impl Fragment for FabFragment {
    fn create(&mut self) -> visfab_dom::Result<()> {
        let Some(dom) = self.dom.upgrade() else {
            return Ok(());
        };
        let main = dom.create_element("main");
        let wrapper = element(&dom, "div", main, Some("vis-fab-wrapper"))?;
        let input = element(&dom, "input", wrapper, None)?;
        dom.set_attribute(input, "type", "checkbox")?;
        space(&dom, wrapper)?;
        element(&dom, "div", wrapper, Some("vis-fab"))?;
        space(&dom, wrapper)?;
        let context = element(&dom, "div", wrapper, Some("vis-fab-context"))?;
        element(&dom, "slot", context, None)?;

        let nodes = FabNodes { main, wrapper, input };
        let initial = std::mem::take(&mut self.initial);
        self.write_styles(&dom, wrapper, &initial, None)?;
        let opened = initial.get(SLOT_OPENED).is_some_and(Value::truthy);
        write_state(&dom, &nodes, opened)?;
        self.nodes = Some(nodes);
        Ok(())
    }

    fn mount(&mut self, target: NodeId, anchor: Option<NodeId>) -> visfab_dom::Result<()> {
        let (Some(dom), Some(nodes)) = (self.dom.upgrade(), &self.nodes) else {
            return Ok(());
        };
        let (main, wrapper, input) = (nodes.main, nodes.wrapper, nodes.input);
        dom.insert(target, main, anchor)?;

        if self.click_outside.is_none() {
            self.click_outside = Some(click_outside(&dom, wrapper));

            let component = self.component.clone();
            let closer = dom.add_event_listener(
                wrapper,
                event_types::CLICK_OUTSIDE,
                ListenerOptions::default(),
                move |_| {
                    let Some(component) = component.upgrade() else {
                        return;
                    };
                    if state_of(&component).is_open() {
                        apply(&component, FabEvent::Close);
                    }
                },
            );

            let component = self.component.clone();
            let toggler = dom.add_event_listener(
                input,
                event_types::CLICK,
                ListenerOptions::default(),
                move |_| {
                    if let Some(component) = component.upgrade() {
                        apply(&component, FabEvent::Toggle);
                    }
                },
            );
            self.listeners.extend([closer, toggler]);
        }
        Ok(())
    }

    fn patch(&mut self, ctx: &[Value], dirty: &DirtyMask) -> visfab_dom::Result<()> {
        let (Some(dom), Some(nodes)) = (self.dom.upgrade(), &self.nodes) else {
            return Ok(());
        };
        self.write_styles(&dom, nodes.wrapper, ctx, Some(dirty))?;
        if dirty.is_dirty(SLOT_OPENED) {
            let opened = ctx.get(SLOT_OPENED).is_some_and(Value::truthy);
            write_state(&dom, nodes, opened)?;
        }
        Ok(())
    }

    fn destroy(&mut self, detaching: bool) {
        let Some(dom) = self.dom.upgrade() else {
            return;
        };
        if detaching {
            if let Some(nodes) = &self.nodes {
                if let Err(error) = dom.detach(nodes.main) {
                    tracing::warn!(%error, "vis-fab root already detached");
                }
            }
        }
        if let Some(watch) = self.click_outside.take() {
            watch.destroy();
        }
        for listener in self.listeners.drain(..) {
            dom.remove_event_listener(listener);
        }
    }
}
