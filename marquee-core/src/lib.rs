//! Board-agnostic zone animation engine
//!
//! This crate contains everything between "show this text this way" and the
//! column bytes handed to a [`marquee_hal::MatrixDisplay`]:
//!
//! - Zone state machine (entry effect, pause, exit effect)
//! - Effect frame rendering, clipped to each zone's module range
//! - The [`Marquee`] controller that steps all zones once per frame inside a
//!   single suspend/resume bracket
//! - Fonts, configuration and persisted settings types

#![no_std]
#![deny(unsafe_code)]

pub mod canvas;
pub mod config;
pub mod controller;
pub mod effect;
pub mod error;
pub mod font;
pub mod zone;

#[cfg(test)]
mod testing;

pub use canvas::{Canvas, FrameGuard, ZoneWindow};
pub use config::{MarqueeConfig, StoredSettings, ZoneSettings, MAX_TEXT_LEN, MAX_ZONES};
pub use controller::Marquee;
pub use effect::{TextEffect, TextPosition};
pub use error::MarqueeError;
pub use font::{Font, SystemFont, SYSTEM_FONT};
pub use zone::{Phase, Zone};
