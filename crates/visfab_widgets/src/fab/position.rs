//! Screen corner the button is anchored to

use std::fmt;
use std::str::FromStr;

use crate::error::FabError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Vertical {
    Top,
    #[default]
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Horizontal {
    Left,
    #[default]
    Right,
}

/// `"<vertical> <horizontal>"`, default `bottom right`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub vertical: Vertical,
    pub horizontal: Horizontal,
}

impl Position {
    pub const fn new(vertical: Vertical, horizontal: Horizontal) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }

    /// Read a position the way the stylesheet does: only an exact `top` first
    /// token and an exact `left` second token move the anchor. Anything else,
    /// including malformed input, stays at the default corner.
    pub fn from_attribute(raw: &str) -> Self {
        let mut tokens = raw.split(' ');
        let vertical = match tokens.next() {
            Some("top") => Vertical::Top,
            _ => Vertical::Bottom,
        };
        let horizontal = match tokens.next() {
            Some("left") => Horizontal::Left,
            _ => Horizontal::Right,
        };
        Self::new(vertical, horizontal)
    }

    /// `--positiony`
    pub fn offset_y(self) -> &'static str {
        match self.vertical {
            Vertical::Top => "initial",
            Vertical::Bottom => "0",
        }
    }

    /// `--positionx`
    pub fn offset_x(self) -> &'static str {
        match self.horizontal {
            Horizontal::Left => "initial",
            Horizontal::Right => "0",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vertical = match self.vertical {
            Vertical::Top => "top",
            Vertical::Bottom => "bottom",
        };
        let horizontal = match self.horizontal {
            Horizontal::Left => "left",
            Horizontal::Right => "right",
        };
        write!(f, "{vertical} {horizontal}")
    }
}

/// Strict parse, for typed callers
impl FromStr for Position {
    type Err = FabError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || FabError::InvalidPosition(raw.to_string());
        let mut tokens = raw.split_whitespace();
        let vertical = match tokens.next() {
            Some("top") => Vertical::Top,
            Some("bottom") => Vertical::Bottom,
            _ => return Err(invalid()),
        };
        let horizontal = match tokens.next() {
            Some("left") => Horizontal::Left,
            Some("right") => Horizontal::Right,
            _ => return Err(invalid()),
        };
        if tokens.next().is_some() {
            return Err(invalid());
        }
        Ok(Self::new(vertical, horizontal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_corner_offsets() {
        let position = Position::default();
        assert_eq!(position.to_string(), "bottom right");
        assert_eq!(position.offset_y(), "0");
        assert_eq!(position.offset_x(), "0");
    }

    #[test]
    fn test_from_attribute() {
        let position = Position::from_attribute("top left");
        assert_eq!(position.offset_y(), "initial");
        assert_eq!(position.offset_x(), "initial");

        assert_eq!(Position::from_attribute("top"), Position::new(Vertical::Top, Horizontal::Right));
        assert_eq!(Position::from_attribute("middle left").vertical, Vertical::Bottom);
        // single-space split: a doubled space leaves the second token empty
        assert_eq!(Position::from_attribute("top  left").horizontal, Horizontal::Right);
        assert_eq!(Position::from_attribute(""), Position::default());
    }

    #[test]
    fn test_strict_parse() {
        assert_eq!(
            "bottom left".parse::<Position>().unwrap(),
            Position::new(Vertical::Bottom, Horizontal::Left)
        );
        assert!("top".parse::<Position>().is_err());
        assert!("left top".parse::<Position>().is_err());
        assert!("top left extra".parse::<Position>().is_err());
    }
}
