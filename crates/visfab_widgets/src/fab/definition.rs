//! Component definition for the floating action button

use visfab_core::{Component, ComponentDefinition, Fragment, Props, Value};
use visfab_dom::Event;

use super::attributes::{FabAttribute, SLOT_COUNT, SLOT_OPENED, SLOT_POSITION, SLOT_POSITION_X, SLOT_POSITION_Y};
use super::fragment::FabFragment;
use super::position::Position;
use super::state::{FabEvent, FabState};
use crate::config::FabConfig;

pub struct FabDefinition {
    config: FabConfig,
    props: Vec<(&'static str, usize)>,
}

impl FabDefinition {
    pub fn new(config: FabConfig) -> Self {
        let props = FabAttribute::ALL
            .iter()
            .filter(|attribute| attribute.is_enabled(&config.features))
            .map(|attribute| (attribute.name(), attribute.slot()))
            .collect();
        Self { config, props }
    }

    pub fn config(&self) -> &FabConfig {
        &self.config
    }
}

/// Strings written to `opened` become booleans, whichever way they arrive
fn normalize(attribute: FabAttribute, value: Value) -> Value {
    match (attribute, value) {
        (FabAttribute::Opened, Value::Text(text)) => attribute.coerce(Some(&text)),
        (FabAttribute::Opened, value) => Value::Bool(value.truthy()),
        (_, value) => value,
    }
}

fn anchor(position: Option<&Value>) -> Position {
    Position::from_attribute(position.and_then(Value::as_str).unwrap_or_default())
}

impl ComponentDefinition for FabDefinition {
    fn name(&self) -> &'static str {
        "vis-fab"
    }

    fn props(&self) -> &[(&'static str, usize)] {
        &self.props
    }

    fn instance(&self, _component: &Component, props: &Props) -> Vec<Value> {
        let mut ctx = vec![Value::Null; SLOT_COUNT];
        for attribute in FabAttribute::ALL {
            ctx[attribute.slot()] = match props.get(attribute.name()) {
                Some(value) => normalize(attribute, value.clone()),
                None => self.config.defaults.value(attribute),
            };
        }
        let position = anchor(ctx.get(SLOT_POSITION));
        ctx[SLOT_POSITION_Y] = position.offset_y().into();
        ctx[SLOT_POSITION_X] = position.offset_x().into();
        ctx
    }

    fn update(&self, component: &Component) {
        let position = anchor(component.get(SLOT_POSITION).as_ref());
        component.invalidate(SLOT_POSITION_Y, position.offset_y());
        component.invalidate(SLOT_POSITION_X, position.offset_x());
    }

    fn coerce(&self, index: usize, value: Value) -> Value {
        if index == SLOT_OPENED {
            normalize(FabAttribute::Opened, value)
        } else {
            value
        }
    }

    fn create_fragment(&self, component: &Component, ctx: &[Value]) -> Option<Box<dyn Fragment>> {
        let dom = component.dom()?;
        Some(Box::new(FabFragment::new(
            &dom,
            component.downgrade(),
            self.config.features,
            ctx,
        )))
    }
}

/// Current open/closed state of a component
pub fn state_of(component: &Component) -> FabState {
    FabState::from_opened(component.get(SLOT_OPENED).is_some_and(|value| value.truthy()))
}

/// Run `event` through the state machine, write the new state and send the
/// resulting notifications.
///
/// The state is written synchronously; the DOM follows on the next flush.
/// Notifications go to component subscribers and, for a hosted component, to
/// the host element as bubbling, composed DOM events.
pub fn apply(component: &Component, event: FabEvent) -> FabState {
    let next = state_of(component).on(event);
    component.invalidate(SLOT_OPENED, next.is_open());
    tracing::debug!(component = component.id(), ?event, state = ?next, "fab transition");

    for name in event.notifications(next) {
        if let (Some(dom), Some(host)) = (component.dom(), component.host()) {
            dom.dispatch_event(host, Event::custom(name));
        }
        component.dispatch(name, Value::Null);
    }
    next
}
