//! Marquee Hardware Abstraction Layer
//!
//! This crate defines the traits the zone animation engine consumes. A
//! chip- or board-specific driver implements them; the engine never talks to
//! a bus directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application / marquee-core controller  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  marquee-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ MAX7219 chain │       │ host/test     │
//! │ (SPI)         │       │ frame buffer  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`display::MatrixDisplay`] - column buffer, control options, batched update
//! - [`time::Clock`] - millisecond time base for animation pacing

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod time;

// Re-export key traits at crate root for convenience
pub use display::{
    ControlOption, MatrixDisplay, UpdateMode, COL_SIZE, MAX_INTENSITY, ROW_SIZE,
};
pub use time::Clock;
