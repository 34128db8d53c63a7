//! Embassy time base

use marquee_hal::Clock;

/// [`Clock`] backed by the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        // Wraps after ~49 days; animation timing uses wrapping differences
        embassy_time::Instant::now().as_millis() as u32
    }
}
