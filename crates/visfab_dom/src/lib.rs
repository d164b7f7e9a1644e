//! visfab document model
//!
//! An in-memory stand-in for the pieces of the browser DOM the component
//! runtime talks to:
//!
//! - **Node tree**: elements, text, shadow roots, attributes, inline styles
//! - **Events**: capture/target/bubble dispatch with composed paths
//! - **Custom elements**: a registry of constructors and element reactions
//! - **Click outside**: the pointer-outside interaction helper
//!
//! # Example
//!
//! ```rust
//! use visfab_dom::{Document, Event, ListenerOptions};
//!
//! let dom = Document::new();
//! let button = dom.create_element("button");
//! dom.append(dom.body(), button).unwrap();
//!
//! dom.add_event_listener(button, "click", ListenerOptions::default(), |event| {
//!     event.prevent_default();
//! });
//!
//! let event = dom.dispatch_event(button, Event::click());
//! assert!(event.default_prevented());
//! ```

pub mod click_outside;
pub mod document;
pub mod error;
pub mod events;
pub mod node;
pub mod registry;

pub use click_outside::{click_outside, ClickOutside};
pub use document::{Document, Dom};
pub use error::{DomError, Result};
pub use events::{event_types, Event, EventPhase, EventTarget, ListenerId, ListenerOptions};
pub use node::{NodeId, NodeKind};
pub use registry::{CustomElementRegistry, ElementConstructor, ElementReactions, Upgraded};
