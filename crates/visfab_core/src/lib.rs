//! visfab core runtime
//!
//! Batched reactive updates for components rendered into a [`visfab_dom`]
//! document:
//!
//! - **Values and dirty masks**: slot storage and per-slot change tracking
//! - **Scheduler**: one microtask per batch, parents before children
//! - **Components**: init, mount, update, destroy, bindings and events
//! - **Lifecycle**: `on_mount`, `before_update`, `after_update`, `on_destroy`
//!   and inherited context
//! - **Element hosting**: shadow root and connect/disconnect forwarding for
//!   custom elements
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use visfab_core::{Component, ComponentDefinition, ComponentOptions, Fragment, MicrotaskQueue, Props, Scheduler, Value};
//! use visfab_dom::Document;
//!
//! struct Label;
//!
//! impl ComponentDefinition for Label {
//!     fn name(&self) -> &'static str { "label" }
//!     fn props(&self) -> &[(&'static str, usize)] { &[("text", 0)] }
//!     fn instance(&self, _: &Component, props: &Props) -> Vec<Value> {
//!         vec![props.get("text").cloned().unwrap_or_default()]
//!     }
//!     fn create_fragment(&self, _: &Component, _: &[Value]) -> Option<Box<dyn Fragment>> {
//!         None
//!     }
//! }
//!
//! let queue = MicrotaskQueue::new();
//! let scheduler = Scheduler::new(queue.clone());
//! let dom = Document::new();
//! let label = Component::init(&scheduler, &dom, Rc::new(Label), ComponentOptions::new()).unwrap();
//!
//! label.set([("text", "hello")]);
//! assert!(scheduler.is_pending());
//! queue.run_until_idle();
//! assert_eq!(label.prop("text"), Some(Value::from("hello")));
//! ```

pub mod component;
pub mod context;
pub mod dirty;
pub mod element;
pub mod error;
pub mod lifecycle;
pub mod microtask;
pub mod scheduler;
pub mod value;

pub use component::{
    Callback, Cleanup, Component, ComponentDefinition, ComponentOptions, Fragment, MountCallback,
    Props, Subscription, ValueCallback, WeakComponent,
};
pub use context::ContextMap;
pub use dirty::DirtyMask;
pub use element::ElementHost;
pub use error::{Result, RuntimeError};
pub use lifecycle::{
    after_update, before_update, create_event_dispatcher, current_component, get_context,
    get_current_component, has_context, on_destroy, on_mount, set_context, ComponentScope,
    EventDispatcher,
};
pub use microtask::{Microtask, MicrotaskQueue};
pub use scheduler::Scheduler;
pub use value::{NotEqual, Value};
