//! Lifecycle and context helpers
//!
//! These act on the *current component*: the one whose `instance` is running
//! during [`Component::init`](crate::Component::init), or the one being
//! updated during a flush. Outside of those windows they return
//! [`RuntimeError::OutsideComponentInit`].

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::component::{Cleanup, Component, WeakComponent};
use crate::error::{Result, RuntimeError};
use crate::value::Value;

thread_local! {
    static CURRENT_COMPONENT: RefCell<Option<Component>> = const { RefCell::new(None) };
}

/// Installs a current component; the previous one comes back on drop
#[must_use = "the previous component is restored when the scope is dropped"]
pub struct ComponentScope {
    previous: Option<Component>,
}

impl ComponentScope {
    pub fn enter(component: Option<Component>) -> Self {
        let previous = CURRENT_COMPONENT.with(|current| current.replace(component));
        Self { previous }
    }
}

impl Drop for ComponentScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT_COMPONENT.with(|current| *current.borrow_mut() = previous);
    }
}

pub fn current_component() -> Option<Component> {
    CURRENT_COMPONENT.with(|current| current.borrow().clone())
}

fn require(helper: &'static str) -> Result<Component> {
    current_component().ok_or(RuntimeError::OutsideComponentInit(helper))
}

pub fn get_current_component() -> Result<Component> {
    require("get_current_component")
}

/// Run `callback` once the component is first mounted (or, for custom
/// elements, each time it is connected). A returned cleanup runs on destroy
/// (or disconnect).
pub fn on_mount<F>(callback: F) -> Result<()>
where
    F: Fn() -> Option<Cleanup> + 'static,
{
    require("on_mount")?.push_on_mount(Rc::new(callback));
    Ok(())
}

/// Run `callback` before every patch, and once before the first render
pub fn before_update<F: Fn() + 'static>(callback: F) -> Result<()> {
    require("before_update")?.push_before_update(Rc::new(callback));
    Ok(())
}

/// Run `callback` after every patch, including the first mount
pub fn after_update<F: Fn() + 'static>(callback: F) -> Result<()> {
    require("after_update")?.push_after_update(Rc::new(callback));
    Ok(())
}

/// Run `callback` when the component is destroyed
pub fn on_destroy<F: FnOnce() + 'static>(callback: F) -> Result<()> {
    if let Some(late) = require("on_destroy")?.push_on_destroy(Box::new(callback)) {
        late();
    }
    Ok(())
}

pub fn set_context<T: Any>(key: &str, value: T) -> Result<Rc<T>> {
    Ok(require("set_context")?.with_context(|context| context.insert(key, value)))
}

pub fn get_context<T: Any>(key: &str) -> Result<Option<Rc<T>>> {
    require("get_context")?.with_context(|context| context.get::<T>(key))
}

pub fn has_context(key: &str) -> Result<bool> {
    Ok(require("has_context")?.with_context(|context| context.contains(key)))
}

/// Dispatcher bound to the current component's event subscribers
pub fn create_event_dispatcher() -> Result<EventDispatcher> {
    Ok(EventDispatcher {
        component: require("create_event_dispatcher")?.downgrade(),
    })
}

/// Sends component events; see [`Component::on`]
#[derive(Clone, Debug)]
pub struct EventDispatcher {
    component: WeakComponent,
}

impl EventDispatcher {
    /// Returns `false` once the component is gone
    pub fn dispatch(&self, event_type: &str, detail: impl Into<Value>) -> bool {
        match self.component.upgrade() {
            Some(component) => {
                component.dispatch(event_type, detail);
                true
            }
            None => false,
        }
    }
}
