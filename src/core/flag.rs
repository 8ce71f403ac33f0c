// core/flag.rs

// Catalogue of flag colors and the filtered light-sensor reading each one produces.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Possible colors of the target flag
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagColor {
    /// No target configured
    #[default]
    None,
    /// Red flag
    Red,
    /// Blue flag
    Blue,
    /// Yellow flag
    Yellow,
    /// White flag
    White,
}

impl FlagColor {
    /// Reading reported when the color sensor has nothing to offer.
    pub const NO_READING: f32 = -1.0;

    /// Expected filtered color reading, or `None` for the sentinel.
    pub fn signature(&self) -> Option<f32> {
        match self {
            FlagColor::None => None,
            FlagColor::Red => Some(0.00),
            FlagColor::Blue => Some(0.07),
            FlagColor::Yellow => Some(0.03),
            FlagColor::White => Some(0.06),
        }
    }

    /// Maps the integer color code handed out by the game server.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(FlagColor::None),
            1 => Ok(FlagColor::Red),
            2 => Ok(FlagColor::Blue),
            3 => Ok(FlagColor::Yellow),
            4 => Ok(FlagColor::White),
            other => Err(SearchError::Config(format!("unknown flag color code {}", other))),
        }
    }

    /// Whether `reading` lies within `tolerance` of this color's signature.
    /// The sentinel never matches.
    pub fn matches(&self, reading: f32, tolerance: f32) -> bool {
        match self.signature() {
            Some(expected) => reading >= expected - tolerance && reading <= expected + tolerance,
            None => false,
        }
    }
}
