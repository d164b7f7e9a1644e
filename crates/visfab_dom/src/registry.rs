//! Custom element registry
//!
//! A definition maps a tag name to a constructor. Upgraded elements receive
//! reactions from the document: connected, disconnected and changes to the
//! attributes they observe.

use std::any::Any;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::document::Dom;
use crate::error::{DomError, Result};
use crate::node::NodeId;

/// Callbacks the document invokes on an upgraded element
pub trait ElementReactions {
    /// Attribute names whose changes are reported
    fn observed_attributes(&self) -> &[&'static str];

    /// The element (or an ancestor) became connected to the document
    fn connected(&self) {}

    /// The element (or an ancestor) was removed from the document
    fn disconnected(&self) {}

    /// An observed attribute changed. `new` is `None` on removal.
    fn attribute_changed(&self, name: &str, old: Option<&str>, new: Option<&str>);
}

/// An upgraded element: its reactions plus the concrete instance for downcasting
#[derive(Clone)]
pub struct Upgraded {
    pub(crate) reactions: Rc<dyn ElementReactions>,
    pub(crate) instance: Rc<dyn Any>,
}

impl Upgraded {
    pub fn new<T: ElementReactions + 'static>(element: Rc<T>) -> Self {
        Self {
            reactions: element.clone(),
            instance: element,
        }
    }

    pub fn reactions(&self) -> &Rc<dyn ElementReactions> {
        &self.reactions
    }
}

/// Element constructor: receives the document and the freshly created host
pub type ElementConstructor = Rc<dyn Fn(&Dom, NodeId) -> Result<Upgraded>>;

/// Tag name -> constructor
#[derive(Default)]
pub struct CustomElementRegistry {
    definitions: FxHashMap<String, ElementConstructor>,
}

impl CustomElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for `tag`
    pub fn define(&mut self, tag: &str, constructor: ElementConstructor) -> Result<()> {
        if !is_valid_custom_element_name(tag) {
            return Err(DomError::InvalidTagName(tag.to_string()));
        }
        if self.definitions.contains_key(tag) {
            return Err(DomError::AlreadyDefined(tag.to_string()));
        }
        self.definitions.insert(tag.to_string(), constructor);
        tracing::debug!(tag, "custom element defined");
        Ok(())
    }

    pub fn get(&self, tag: &str) -> Option<ElementConstructor> {
        self.definitions.get(tag).cloned()
    }

    pub fn is_defined(&self, tag: &str) -> bool {
        self.definitions.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Lowercase ASCII start, at least one hyphen, no uppercase
pub fn is_valid_custom_element_name(tag: &str) -> bool {
    let starts_lower = tag.chars().next().is_some_and(|c| c.is_ascii_lowercase());
    starts_lower
        && tag.contains('-')
        && tag
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_name_validation() {
        assert!(is_valid_custom_element_name("vis-fab"));
        assert!(is_valid_custom_element_name("x-1"));
        assert!(!is_valid_custom_element_name("fab"));
        assert!(!is_valid_custom_element_name("Vis-fab"));
        assert!(!is_valid_custom_element_name("-fab"));
        assert!(!is_valid_custom_element_name(""));
    }

    #[test]
    fn test_duplicate_definition_rejected() {
        let mut registry = CustomElementRegistry::new();
        let ctor: ElementConstructor =
            Rc::new(|_: &Dom, node: NodeId| Err(DomError::NotAnElement(node)));
        registry.define("vis-fab", ctor.clone()).unwrap();
        assert_eq!(
            registry.define("vis-fab", ctor.clone()),
            Err(DomError::AlreadyDefined("vis-fab".into()))
        );
        assert_eq!(
            registry.define("fab", ctor),
            Err(DomError::InvalidTagName("fab".into()))
        );
        assert_eq!(registry.len(), 1);
    }
}
