//! Time base abstraction
//!
//! Animation speed and pause are expressed in milliseconds. The engine only
//! ever looks at differences between two readings, so a wrapping 32-bit
//! counter is sufficient.

/// Monotonic millisecond clock
pub trait Clock {
    /// Milliseconds since an arbitrary epoch (wraps at `u32::MAX`)
    fn now_ms(&self) -> u32;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}
