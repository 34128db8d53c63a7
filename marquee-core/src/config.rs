//! Configuration types
//!
//! [`MarqueeConfig`] is fixed when the controller is created. Per-zone
//! settings can be snapshotted into [`StoredSettings`] and persisted as
//! postcard binary data (with the `serde` feature).

use heapless::Vec;
use marquee_hal::MAX_INTENSITY;

use crate::effect::{TextEffect, TextPosition};

#[cfg(feature = "serde")]
use crate::error::MarqueeError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Zone arena capacity
pub const MAX_ZONES: usize = 8;

/// Maximum message length in bytes
pub const MAX_TEXT_LEN: usize = 128;

/// Default intensity for the whole display
pub const DEFAULT_INTENSITY: u8 = MAX_INTENSITY / 2;

/// Default frame interval in ms
pub const DEFAULT_SPEED: u16 = 10;

/// Default blank columns between characters
pub const DEFAULT_CHAR_SPACING: u8 = 1;

/// Magic number to identify valid stored settings
pub const SETTINGS_MAGIC: u32 = 0x4D52_5155; // "MRQU"

/// Current stored settings version
pub const SETTINGS_VERSION: u8 = 1;

/// Controller-wide configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MarqueeConfig {
    /// Upper bound for the zone count requested at `begin` (at most `MAX_ZONES`)
    pub max_zones: u8,
    /// Zone targeted by `display_text` and the text sink
    pub default_zone: u8,
    /// Intensity applied to every module at `begin`
    pub intensity: u8,
    /// Entry/exit frame interval in ms; the pause defaults to ten frames
    pub speed: u16,
    /// Blank columns between characters
    pub char_spacing: u8,
}

impl Default for MarqueeConfig {
    fn default() -> Self {
        Self {
            max_zones: MAX_ZONES as u8,
            default_zone: 0,
            intensity: DEFAULT_INTENSITY,
            speed: DEFAULT_SPEED,
            char_spacing: DEFAULT_CHAR_SPACING,
        }
    }
}

impl MarqueeConfig {
    /// Zone capacity after applying the arena limit
    pub fn zone_capacity(&self) -> u8 {
        self.max_zones.clamp(1, MAX_ZONES as u8)
    }

    /// Pause derived from the frame interval
    pub fn default_pause(&self) -> u16 {
        self.speed.saturating_mul(10)
    }
}

/// Persistent settings of one zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZoneSettings {
    pub module_start: u8,
    pub module_end: u8,
    pub align: TextPosition,
    pub effect_in: TextEffect,
    pub effect_out: TextEffect,
    pub speed_in: u16,
    pub speed_out: u16,
    pub pause: u16,
    pub char_spacing: u8,
    pub scroll_spacing: u16,
    pub invert: bool,
    pub intensity: u8,
}

impl Default for ZoneSettings {
    fn default() -> Self {
        Self {
            module_start: 0,
            module_end: 0,
            align: TextPosition::Left,
            effect_in: TextEffect::Print,
            effect_out: TextEffect::NoEffect,
            speed_in: DEFAULT_SPEED,
            speed_out: DEFAULT_SPEED,
            pause: DEFAULT_SPEED * 10,
            char_spacing: DEFAULT_CHAR_SPACING,
            scroll_spacing: 0,
            invert: false,
            intensity: DEFAULT_INTENSITY,
        }
    }
}

/// Complete display layout as stored in flash
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StoredSettings {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Controller configuration
    pub config: MarqueeConfig,
    /// One entry per zone, in zone order
    pub zones: Vec<ZoneSettings, MAX_ZONES>,
}

impl StoredSettings {
    /// Create an empty settings record
    pub fn new(config: MarqueeConfig) -> Self {
        Self {
            magic: SETTINGS_MAGIC,
            version: SETTINGS_VERSION,
            config,
            zones: Vec::new(),
        }
    }

    /// Check if the header identifies current-format data
    pub fn is_valid(&self) -> bool {
        self.magic == SETTINGS_MAGIC && self.version == SETTINGS_VERSION
    }
}

#[cfg(feature = "serde")]
impl StoredSettings {
    /// Serialize into `buf`, returning the used part
    pub fn to_slice<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], MarqueeError> {
        postcard::to_slice(self, buf).map_err(|_| MarqueeError::Allocation)
    }

    /// Deserialize and validate the header
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MarqueeError> {
        let settings: Self = postcard::from_bytes(bytes).map_err(|_| MarqueeError::Settings)?;
        if !settings.is_valid() {
            return Err(MarqueeError::Settings);
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MarqueeConfig::default();
        assert_eq!(config.intensity, 7);
        assert_eq!(config.default_pause(), 100);
        assert_eq!(config.zone_capacity(), MAX_ZONES as u8);
    }

    #[test]
    fn test_zone_capacity_clamped() {
        let mut config = MarqueeConfig::default();
        config.max_zones = 0;
        assert_eq!(config.zone_capacity(), 1);
        config.max_zones = 200;
        assert_eq!(config.zone_capacity(), MAX_ZONES as u8);
    }

    #[test]
    fn test_new_settings_are_valid() {
        let mut settings = StoredSettings::new(MarqueeConfig::default());
        assert!(settings.is_valid());
        settings.version = SETTINGS_VERSION + 1;
        assert!(!settings.is_valid());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_stored_settings_survive_postcard() {
        let mut settings = StoredSettings::new(MarqueeConfig::default());
        let mut zone = ZoneSettings::default();
        zone.module_end = 3;
        zone.effect_in = TextEffect::ScrollLeft;
        settings.zones.push(zone).unwrap();

        let mut buf = [0u8; 128];
        let used = settings.to_slice(&mut buf).unwrap().len();
        let loaded = StoredSettings::from_bytes(&buf[..used]).unwrap();
        assert_eq!(loaded, settings);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_corrupt_settings_rejected() {
        let mut settings = StoredSettings::new(MarqueeConfig::default());
        settings.magic = 0;
        let mut buf = [0u8; 64];
        let used = settings.to_slice(&mut buf).unwrap().len();
        assert_eq!(
            StoredSettings::from_bytes(&buf[..used]),
            Err(MarqueeError::Settings)
        );
    }
}
