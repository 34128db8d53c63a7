//! Zone animation phases
//!
//! A zone is always in exactly one phase. Phase changes are a pure function
//! of the current phase and an event; timing and rendering live in the zone.

/// Zone animation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// No message in progress
    #[default]
    Idle,
    /// Entry effect running
    Entering,
    /// Text fully shown, waiting out the pause
    Displayed,
    /// Exit effect running
    Exiting,
}

/// Events that move a zone between phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ZoneEvent {
    /// New message assigned or current message restarted
    Start,
    /// Last entry frame drawn
    EntryComplete,
    /// Pause over and an exit effect is configured
    PauseElapsed,
    /// Pause over and the text stays on the display
    Hold,
    /// Last exit frame drawn
    ExitComplete,
    /// Zone blanked by the application
    Clear,
}

impl Phase {
    /// Check if the zone still needs frames
    pub fn is_active(&self) -> bool {
        !matches!(self, Phase::Idle)
    }

    /// Process an event and return the next phase
    pub fn transition(self, event: ZoneEvent) -> Self {
        use Phase::*;
        use ZoneEvent::*;

        match (self, event) {
            // Restart is allowed from anywhere
            (_, Start) => Entering,
            (_, Clear) => Idle,

            (Entering, EntryComplete) => Displayed,

            (Displayed, PauseElapsed) => Exiting,
            (Displayed, Hold) => Idle,

            (Exiting, ExitComplete) => Idle,

            // Default: stay in current phase
            _ => self,
        }
    }
}
