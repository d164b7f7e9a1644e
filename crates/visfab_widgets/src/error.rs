//! Widget error types

use std::path::PathBuf;

use thiserror::Error;
use visfab_core::RuntimeError;
use visfab_dom::DomError;

use crate::fab::FabAttribute;

/// Errors from widget configuration and the element API
#[derive(Error, Debug)]
pub enum FabError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("unknown attribute `{0}`")]
    UnknownAttribute(String),

    /// Attribute belongs to a feature the element was built without
    #[error("attribute `{0}` is not enabled for this element")]
    AttributeDisabled(FabAttribute),

    #[error("invalid position `{0}`: expected `<top|bottom> <left|right>`")]
    InvalidPosition(String),

    /// The element no longer has a live component
    #[error("element has been destroyed")]
    Destroyed,

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Dom(#[from] DomError),
}

pub type Result<T> = std::result::Result<T, FabError>;
