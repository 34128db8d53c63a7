//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in marquee-hal:
//!
//! - Matrix displays (MAX7219/MAX7221 chains over SPI)
//! - Time base (embassy, with the `embassy` feature)

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "embassy")]
pub mod clock;
pub mod display;

#[cfg(feature = "embassy")]
pub use clock::EmbassyClock;
pub use display::{Max7219, Max7219Config, Max7219Error};
