//! visfab widgets
//!
//! Custom elements built on the visfab runtime. Currently one:
//!
//! - [`fab`]: `vis-fab`, a floating action button with an optional context
//!   panel, configured through [`FabConfig`]

pub mod config;
pub mod error;
pub mod fab;

pub use config::{FabConfig, FabDefaults, FabFeatures};
pub use error::{FabError, Result};
pub use fab::{
    register, stylesheet, FabAttribute, FabElement, FabEvent, FabState, Horizontal, Position,
    Vertical, TAG,
};
