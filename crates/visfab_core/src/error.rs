//! Runtime error types

use thiserror::Error;
use visfab_dom::DomError;

/// Runtime errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A lifecycle or context helper ran with no component being initialised
    #[error("`{0}` called outside component initialization")]
    OutsideComponentInit(&'static str),

    /// Operation on a component that was already destroyed
    #[error("component has already been destroyed")]
    Destroyed,

    /// A context entry exists but holds a different type
    #[error("context value for key `{0}` has a different type")]
    ContextType(String),

    /// Document contract violation while mounting
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
