//! `vis-fab` floating action button
//!
//! A custom element that renders a round button into its shadow root and
//! shows a context panel (the element's slotted children) while open.
//!
//! ```rust
//! use visfab_core::{MicrotaskQueue, Scheduler};
//! use visfab_dom::Document;
//! use visfab_widgets::{register, FabConfig, FabElement, TAG};
//!
//! let queue = MicrotaskQueue::new();
//! let scheduler = Scheduler::new(queue.clone());
//! let dom = Document::new();
//! register(&dom, &scheduler, FabConfig::full()).unwrap();
//!
//! let node = dom.create_custom_element(TAG).unwrap();
//! dom.append(dom.body(), node).unwrap();
//! let fab = dom.custom_element::<FabElement>(node).unwrap();
//!
//! fab.toggle().unwrap();
//! queue.run_until_idle();
//! assert!(fab.opened());
//! ```

mod attributes;
mod definition;
mod fragment;
mod position;
mod state;
mod style;

pub use attributes::{Feature, FabAttribute, SLOT_COUNT, STYLE_BINDINGS};
pub use definition::FabDefinition;
pub use fragment::FabFragment;
pub use position::{Horizontal, Position, Vertical};
pub use state::{FabEvent, FabState, Transition, CLOSE, OPEN, TOGGLE, TRANSITIONS};
pub use style::stylesheet;

use std::rc::Rc;

use visfab_core::{Component, ComponentOptions, ElementHost, Scheduler, Subscription, Value};
use visfab_dom::{Dom, ElementReactions, NodeId, Upgraded};

use crate::config::{FabConfig, FabFeatures};
use crate::error::{FabError, Result};

/// Custom element tag
pub const TAG: &str = "vis-fab";

/// The upgraded `vis-fab` element
pub struct FabElement {
    element: ElementHost,
    scheduler: Rc<Scheduler>,
    features: FabFeatures,
    observed: Vec<&'static str>,
}

impl std::fmt::Debug for FabElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FabElement")
            .field("host", &self.element.host())
            .field("features", &self.features)
            .finish()
    }
}

/// Define `vis-fab` on `dom`. Every element created afterwards shares
/// `scheduler` and is built from `config`.
pub fn register(dom: &Dom, scheduler: &Rc<Scheduler>, config: FabConfig) -> Result<()> {
    let scheduler = scheduler.clone();
    let definition = Rc::new(FabDefinition::new(config));
    dom.define(
        TAG,
        Rc::new(move |dom: &Dom, host: NodeId| {
            FabElement::construct(dom, host, &scheduler, definition.clone())
                .map(|element| Upgraded::new(Rc::new(element)))
                .map_err(|error| visfab_dom::DomError::Construction {
                    tag: TAG.to_string(),
                    reason: error.to_string(),
                })
        }),
    )?;
    Ok(())
}

impl FabElement {
    fn construct(
        dom: &Dom,
        host: NodeId,
        scheduler: &Rc<Scheduler>,
        definition: Rc<FabDefinition>,
    ) -> Result<Self> {
        let features = definition.config().features;
        let element = ElementHost::attach(dom, host, &stylesheet(&features))?;

        let mut options = ComponentOptions::new().host(host).target(element.shadow_root());
        for (name, value) in element.attribute_props() {
            options = options.prop(name, value);
        }
        let component = Component::init(scheduler, dom, definition.clone(), options)?;
        element.bind(component);

        Ok(Self {
            element,
            scheduler: scheduler.clone(),
            features,
            observed: definition.config().observed_attributes(),
        })
    }

    fn component(&self) -> Result<Component> {
        self.element
            .component()
            .filter(|component| !component.is_destroyed())
            .ok_or(FabError::Destroyed)
    }

    pub fn host(&self) -> NodeId {
        self.element.host()
    }

    pub fn shadow_root(&self) -> NodeId {
        self.element.shadow_root()
    }

    pub fn features(&self) -> FabFeatures {
        self.features
    }

    // =========================================================================
    // State machine
    // =========================================================================

    pub fn open(&self) -> Result<FabState> {
        Ok(definition::apply(&self.component()?, FabEvent::Open))
    }

    pub fn close(&self) -> Result<FabState> {
        Ok(definition::apply(&self.component()?, FabEvent::Close))
    }

    pub fn toggle(&self) -> Result<FabState> {
        Ok(definition::apply(&self.component()?, FabEvent::Toggle))
    }

    pub fn state(&self) -> FabState {
        self.component()
            .map(|component| definition::state_of(&component))
            .unwrap_or_default()
    }

    pub fn opened(&self) -> bool {
        self.state().is_open()
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Write one property and flush, as an element property setter does
    pub fn set_property(&self, attribute: FabAttribute, value: impl Into<Value>) -> Result<()> {
        if !attribute.is_enabled(&self.features) {
            return Err(FabError::AttributeDisabled(attribute));
        }
        self.component()?.set([(attribute.name(), value.into())]);
        self.scheduler.flush();
        Ok(())
    }

    pub fn set_opened(&self, opened: bool) -> Result<()> {
        self.set_property(FabAttribute::Opened, opened)
    }

    pub fn set_position(&self, position: Position) -> Result<()> {
        self.set_property(FabAttribute::Position, position.to_string())
    }

    pub fn property(&self, attribute: FabAttribute) -> Option<Value> {
        self.component().ok()?.get(attribute.slot())
    }

    /// Batched write; the DOM follows on the next microtask drain
    pub fn set<I, K, V>(&self, props: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.component()?.set(props);
        Ok(())
    }

    /// Subscribe to `open`, `close` or `toggle`
    pub fn on<F: Fn(&Value) + 'static>(&self, event_type: &str, callback: F) -> Option<Subscription> {
        self.element.on(event_type, callback)
    }

    /// Tear down the rendered output. Returns `false` if already destroyed.
    pub fn destroy(&self) -> bool {
        self.element.destroy()
    }
}

impl ElementReactions for FabElement {
    fn observed_attributes(&self) -> &[&'static str] {
        &self.observed
    }

    fn connected(&self) {
        self.element.connected();
    }

    fn disconnected(&self) {
        self.element.disconnected();
    }

    fn attribute_changed(&self, name: &str, _old: Option<&str>, new: Option<&str>) {
        let Ok(attribute) = name.parse::<FabAttribute>() else {
            return;
        };
        let Ok(component) = self.component() else {
            tracing::trace!(attribute = name, "attribute change after destroy ignored");
            return;
        };
        component.set([(attribute.name(), attribute.coerce(new))]);
        self.scheduler.flush();
    }
}
