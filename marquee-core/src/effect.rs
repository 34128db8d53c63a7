//! Text alignment and entry/exit effects

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Horizontal placement of text that fits inside its zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TextPosition {
    #[default]
    Left,
    Center,
    Right,
}

/// Transition used when text enters or leaves a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TextEffect {
    /// Entry: same as `Print`. Exit: leave the text on the display
    NoEffect,
    /// Appear or disappear in a single frame
    #[default]
    Print,
    /// Move right to left, one column per frame
    ScrollLeft,
    /// Move left to right, one column per frame
    ScrollRight,
    /// Move bottom to top, one row per frame
    ScrollUp,
    /// Move top to bottom, one row per frame
    ScrollDown,
    /// Reveal or blank one column per frame, left to right
    Wipe,
    /// `Wipe` with a lit column at the leading edge
    WipeCursor,
    /// Reveal or blank from the centre outward
    Opening,
    /// Reveal or blank from both edges inward
    Closing,
    /// Ramp the zone intensity
    Fade,
}

impl TextEffect {
    /// Check if the effect changes hardware intensity while running
    pub fn uses_intensity(self) -> bool {
        matches!(self, TextEffect::Fade)
    }
}
