//! Attribute and slot mapping for `vis-fab`
//!
//! Slot layout of the component:
//!
//! | slot | field | css variable |
//! |---|---|---|
//! | 0..=10 | public style properties | `--<name>` |
//! | 11 | positiony (derived) | `--positiony` |
//! | 12 | positionx (derived) | `--positionx` |
//! | 13 | position | - |
//! | 14 | opened | - |

use std::fmt;
use std::str::FromStr;

use visfab_core::Value;

use crate::config::FabFeatures;
use crate::error::FabError;

pub const SLOT_POSITION_Y: usize = 11;
pub const SLOT_POSITION_X: usize = 12;
pub const SLOT_POSITION: usize = 13;
pub const SLOT_OPENED: usize = 14;
pub const SLOT_COUNT: usize = 15;

/// Optional style group an attribute belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Core,
    ContextPanel,
    Margins,
}

impl Feature {
    pub fn is_enabled(self, features: &FabFeatures) -> bool {
        match self {
            Feature::Core => true,
            Feature::ContextPanel => features.context_panel,
            Feature::Margins => features.margins,
        }
    }
}

/// Public, attribute-settable property of the element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FabAttribute {
    Height,
    Width,
    FabColor,
    Background,
    ContextBg,
    ContextHeight,
    ContextWidth,
    Position,
    BorderRadius,
    ContextRadius,
    MarginBottom,
    MarginRight,
    Opened,
}

impl FabAttribute {
    /// Observation order
    pub const ALL: [FabAttribute; 13] = [
        FabAttribute::Height,
        FabAttribute::Width,
        FabAttribute::FabColor,
        FabAttribute::Background,
        FabAttribute::ContextBg,
        FabAttribute::ContextHeight,
        FabAttribute::ContextWidth,
        FabAttribute::Position,
        FabAttribute::BorderRadius,
        FabAttribute::ContextRadius,
        FabAttribute::MarginBottom,
        FabAttribute::MarginRight,
        FabAttribute::Opened,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FabAttribute::Height => "height",
            FabAttribute::Width => "width",
            FabAttribute::FabColor => "fabcolor",
            FabAttribute::Background => "background",
            FabAttribute::ContextBg => "contextbg",
            FabAttribute::ContextHeight => "contexth",
            FabAttribute::ContextWidth => "contextw",
            FabAttribute::Position => "position",
            FabAttribute::BorderRadius => "borderradius",
            FabAttribute::ContextRadius => "ctxradius",
            FabAttribute::MarginBottom => "marginbottom",
            FabAttribute::MarginRight => "marginright",
            FabAttribute::Opened => "opened",
        }
    }

    pub fn slot(self) -> usize {
        match self {
            FabAttribute::Height => 0,
            FabAttribute::Width => 1,
            FabAttribute::FabColor => 2,
            FabAttribute::Background => 3,
            FabAttribute::ContextBg => 4,
            FabAttribute::ContextHeight => 5,
            FabAttribute::ContextWidth => 6,
            FabAttribute::BorderRadius => 7,
            FabAttribute::ContextRadius => 8,
            FabAttribute::MarginBottom => 9,
            FabAttribute::MarginRight => 10,
            FabAttribute::Position => SLOT_POSITION,
            FabAttribute::Opened => SLOT_OPENED,
        }
    }

    pub fn feature(self) -> Feature {
        match self {
            FabAttribute::ContextBg
            | FabAttribute::ContextHeight
            | FabAttribute::ContextWidth
            | FabAttribute::ContextRadius => Feature::ContextPanel,
            FabAttribute::MarginBottom | FabAttribute::MarginRight => Feature::Margins,
            _ => Feature::Core,
        }
    }

    pub fn is_enabled(self, features: &FabFeatures) -> bool {
        self.feature().is_enabled(features)
    }

    /// Slot value for an attribute string; `None` means the attribute was removed
    pub fn coerce(self, raw: Option<&str>) -> Value {
        match (self, raw) {
            (FabAttribute::Opened, raw) => Value::Bool(is_truthy_attribute(raw)),
            (_, Some(text)) => Value::Text(text.to_string()),
            (_, None) => Value::Null,
        }
    }
}

/// `opened` attribute semantics: absent or `"false"` is false
fn is_truthy_attribute(raw: Option<&str>) -> bool {
    raw.is_some_and(|text| text != "false")
}

impl fmt::Display for FabAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FabAttribute {
    type Err = FabError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        FabAttribute::ALL
            .into_iter()
            .find(|attribute| attribute.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| FabError::UnknownAttribute(name.to_string()))
    }
}

/// Inline custom property written from each slot, in render order
pub const STYLE_BINDINGS: [(usize, &str, Feature); 13] = [
    (0, "--height", Feature::Core),
    (1, "--width", Feature::Core),
    (2, "--fabcolor", Feature::Core),
    (3, "--background", Feature::Core),
    (4, "--contextbg", Feature::ContextPanel),
    (5, "--contexth", Feature::ContextPanel),
    (6, "--contextw", Feature::ContextPanel),
    (7, "--borderradius", Feature::Core),
    (SLOT_POSITION_Y, "--positiony", Feature::Core),
    (SLOT_POSITION_X, "--positionx", Feature::Core),
    (8, "--ctxradius", Feature::ContextPanel),
    (9, "--marginbottom", Feature::Margins),
    (10, "--marginright", Feature::Margins),
];
