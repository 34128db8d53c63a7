//! Controller error type

use core::fmt;

/// Errors reported by the [`Marquee`](crate::Marquee) controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MarqueeError {
    /// The display failed to initialise or reported a bus error
    Hardware,
    /// Zone index is not below the configured zone count
    InvalidZone,
    /// Module range is reversed or runs past the last module
    InvalidModuleRange,
    /// A fixed-capacity buffer cannot hold the request
    Allocation,
    /// Stored settings are corrupt or from another version
    Settings,
}

impl fmt::Display for MarqueeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            MarqueeError::Hardware => "display hardware error",
            MarqueeError::InvalidZone => "zone index out of range",
            MarqueeError::InvalidModuleRange => "invalid module range",
            MarqueeError::Allocation => "buffer capacity exceeded",
            MarqueeError::Settings => "invalid stored settings",
        };
        f.write_str(msg)
    }
}
