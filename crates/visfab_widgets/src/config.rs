//! Widget configuration (fab.toml)
//!
//! ```toml
//! [features]
//! context_panel = true
//! margins = false
//!
//! [defaults]
//! background = "#4285F4"
//! position = "top left"
//! ```
//!
//! Every key is optional; omitted keys take the built-in defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use visfab_core::Value;

use crate::error::{FabError, Result};
use crate::fab::FabAttribute;

/// Top-level widget configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FabConfig {
    #[serde(default)]
    pub features: FabFeatures,
    #[serde(default)]
    pub defaults: FabDefaults,
}

/// Optional style groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct FabFeatures {
    /// `contextbg`, `contexth`, `contextw`, `ctxradius`
    #[serde(default = "default_true")]
    pub context_panel: bool,
    /// `marginbottom`, `marginright`
    #[serde(default = "default_true")]
    pub margins: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FabFeatures {
    fn default() -> Self {
        Self {
            context_panel: true,
            margins: true,
        }
    }
}

/// Initial value of every property
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FabDefaults {
    pub height: String,
    pub width: String,
    pub fabcolor: String,
    pub background: String,
    pub borderradius: String,
    pub contextbg: String,
    pub contexth: String,
    pub contextw: String,
    pub ctxradius: String,
    pub marginbottom: String,
    pub marginright: String,
    pub position: String,
    pub opened: bool,
}

impl Default for FabDefaults {
    fn default() -> Self {
        Self {
            height: "50px".to_string(),
            width: "50px".to_string(),
            fabcolor: "#000000".to_string(),
            background: "#FFFFFF".to_string(),
            borderradius: "100%".to_string(),
            contextbg: "#FFFFFF".to_string(),
            contexth: "auto".to_string(),
            contextw: "auto".to_string(),
            ctxradius: "32px".to_string(),
            marginbottom: "16px".to_string(),
            marginright: "16px".to_string(),
            position: "bottom right".to_string(),
            opened: false,
        }
    }
}

impl FabDefaults {
    /// Default for one property as a slot value
    pub fn value(&self, attribute: FabAttribute) -> Value {
        let text = match attribute {
            FabAttribute::Height => &self.height,
            FabAttribute::Width => &self.width,
            FabAttribute::FabColor => &self.fabcolor,
            FabAttribute::Background => &self.background,
            FabAttribute::BorderRadius => &self.borderradius,
            FabAttribute::ContextBg => &self.contextbg,
            FabAttribute::ContextHeight => &self.contexth,
            FabAttribute::ContextWidth => &self.contextw,
            FabAttribute::ContextRadius => &self.ctxradius,
            FabAttribute::MarginBottom => &self.marginbottom,
            FabAttribute::MarginRight => &self.marginright,
            FabAttribute::Position => &self.position,
            FabAttribute::Opened => return Value::Bool(self.opened),
        };
        Value::Text(text.clone())
    }
}

impl FabConfig {
    /// Every feature enabled
    pub fn full() -> Self {
        Self::default()
    }

    /// Button only: no context panel, no margins
    pub fn compact() -> Self {
        Self {
            features: FabFeatures {
                context_panel: false,
                margins: false,
            },
            defaults: FabDefaults::default(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| FabError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), ?config.features, "loaded widget config");
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Attributes the element observes under this configuration
    pub fn observed_attributes(&self) -> Vec<&'static str> {
        FabAttribute::ALL
            .iter()
            .filter(|attribute| attribute.is_enabled(&self.features))
            .map(|attribute| attribute.name())
            .collect()
    }
}
