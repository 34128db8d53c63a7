//! Zone controller
//!
//! [`Marquee`] owns the zones, the display and the clock. Application code
//! configures zones through it and calls [`Marquee::animate`] from its main
//! loop; every call advances each zone by at most one frame and commits the
//! result to the hardware once.

use core::fmt;

use heapless::{String, Vec};
use marquee_hal::{Clock, ControlOption, MatrixDisplay};

use crate::canvas::{FrameGuard, ZoneWindow};
use crate::config::{MarqueeConfig, StoredSettings, MAX_TEXT_LEN, MAX_ZONES};
use crate::effect::{TextEffect, TextPosition};
use crate::error::MarqueeError;
use crate::font::Font;
use crate::zone::{Phase, Zone};

/// Multi-zone text animation controller
pub struct Marquee<D, C> {
    display: D,
    clock: C,
    config: MarqueeConfig,
    /// Zone arena, sized once by `begin`
    zones: Vec<Zone, MAX_ZONES>,
    num_modules: u8,
    /// Target of `display_text` and the text sink
    default_zone: u8,
}

impl<D: MatrixDisplay, C: Clock> Marquee<D, C> {
    /// Create a controller; nothing touches the hardware until `begin`
    pub fn new(display: D, clock: C, config: MarqueeConfig) -> Self {
        Self {
            display,
            clock,
            config,
            zones: Vec::new(),
            num_modules: 0,
            default_zone: 0,
        }
    }

    /// Initialise the display and create `num_zones` zones
    ///
    /// The zone count is clamped to `1..=config.max_zones`. With a single
    /// zone, that zone spans every module; with more, each zone must be
    /// placed with [`set_zone`](Self::set_zone).
    pub fn begin(&mut self, num_zones: u8) -> Result<(), MarqueeError> {
        self.display.begin().map_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("Display init failed: {}", defmt::Debug2Format(&_e));
            MarqueeError::Hardware
        })?;

        self.num_modules = self.display.module_count();
        if self.num_modules == 0 {
            #[cfg(feature = "defmt")]
            defmt::warn!("Display reports no modules");
            return Err(MarqueeError::Hardware);
        }

        let count = num_zones.clamp(1, self.config.zone_capacity());
        self.zones.clear();
        for _ in 0..count {
            self.zones
                .push(Zone::new())
                .map_err(|_| MarqueeError::Allocation)?;
        }
        self.default_zone = if self.config.default_zone < count {
            self.config.default_zone
        } else {
            0
        };

        // One zone covers everything; the application overrides if not intended
        if count == 1 {
            self.set_zone(0, 0, self.num_modules - 1)?;
        }

        // Default intensity for the whole display without knowing zone boundaries
        let last = self.num_modules - 1;
        self.display
            .control(0, last, ControlOption::Intensity, self.config.intensity)
            .map_err(|_| MarqueeError::Hardware)?;

        let speed = self.config.speed;
        let pause = self.config.default_pause();
        let intensity = self.config.intensity;
        let spacing = self.config.char_spacing;
        for zone in self.zones.iter_mut() {
            zone.set_speed_in_out(speed, speed);
            zone.set_pause(pause);
            zone.set_char_spacing(spacing);
            zone.set_scroll_spacing(0);
            zone.set_alignment(TextPosition::Left);
            zone.set_effects(TextEffect::Print, TextEffect::NoEffect);
            zone.set_invert(false);
            zone.set_intensity(intensity);
        }

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Marquee ready: {} zones over {} modules",
            count,
            self.num_modules
        );
        Ok(())
    }

    /// Number of zones created by `begin`
    pub fn num_zones(&self) -> u8 {
        self.zones.len() as u8
    }

    /// Number of modules reported by the display at `begin`
    pub fn num_modules(&self) -> u8 {
        self.num_modules
    }

    /// Zone used by `display_text` and the text sink
    pub fn default_zone(&self) -> u8 {
        self.default_zone
    }

    pub fn config(&self) -> &MarqueeConfig {
        &self.config
    }

    /// Place zone `z` over modules `module_start..=module_end`
    ///
    /// Rejected without changes if the range is reversed, runs past the last
    /// module, or `z` does not exist. Overlap with other zones is allowed.
    pub fn set_zone(&mut self, z: u8, module_start: u8, module_end: u8) -> Result<(), MarqueeError> {
        if module_start > module_end || module_end >= self.num_modules {
            #[cfg(feature = "defmt")]
            defmt::debug!(
                "Rejected module range {}..={} for zone {}",
                module_start,
                module_end,
                z
            );
            return Err(MarqueeError::InvalidModuleRange);
        }
        self.zone_mut(z)?.set_range(module_start, module_end);
        Ok(())
    }

    /// Module range of zone `z`
    pub fn zone(&self, z: u8) -> Option<(u8, u8)> {
        self.zones.get(usize::from(z)).map(Zone::module_range)
    }

    /// Read-only access to zone `z`
    pub fn get_zone(&self, z: u8) -> Option<&Zone> {
        self.zones.get(usize::from(z))
    }

    /// Assign a message and its presentation to zone `z` and restart it
    ///
    /// The animation itself runs from [`animate`](Self::animate). Text
    /// longer than `MAX_TEXT_LEN` bytes is truncated.
    #[allow(clippy::too_many_arguments)]
    pub fn display_zone_text(
        &mut self,
        z: u8,
        text: &str,
        align: TextPosition,
        speed: u16,
        pause: u16,
        effect_in: TextEffect,
        effect_out: TextEffect,
    ) -> Result<(), MarqueeError> {
        let zone = self.zone_mut(z)?;
        if !zone.set_text(text) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Zone {} text truncated to {} bytes", z, MAX_TEXT_LEN);
        }
        zone.set_alignment(align);
        zone.set_speed(speed);
        zone.set_pause(pause);
        zone.set_effects(effect_in, effect_out);
        zone.reset();
        Ok(())
    }

    /// [`display_zone_text`](Self::display_zone_text) on the default zone
    pub fn display_text(
        &mut self,
        text: &str,
        align: TextPosition,
        speed: u16,
        pause: u16,
        effect_in: TextEffect,
        effect_out: TextEffect,
    ) -> Result<(), MarqueeError> {
        self.display_zone_text(
            self.default_zone,
            text,
            align,
            speed,
            pause,
            effect_in,
            effect_out,
        )
    }

    /// Queue a message that zone `z` enters as soon as its current one exits
    pub fn queue_zone_text(&mut self, z: u8, text: &str) -> Result<(), MarqueeError> {
        if !self.zone_mut(z)?.queue_text(text) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Zone {} queued text truncated", z);
        }
        Ok(())
    }

    /// Advance every zone by one frame
    ///
    /// Hardware updates are suspended while the zones draw and resumed once
    /// afterwards, so all zones change on the LEDs together. Returns `true`
    /// while any zone is still animating.
    pub fn animate(&mut self) -> bool {
        let now = self.clock.now_ms();
        let mut frame = FrameGuard::suspend(&mut self.display);

        let mut active = false;
        for zone in self.zones.iter_mut() {
            let (start, end) = zone.module_range();
            let mut window = ZoneWindow::new(frame.display(), start, end);
            active |= zone.animate(now, &mut window);
        }

        if let Err(_e) = frame.commit() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Frame commit failed: {}", defmt::Debug2Format(&_e));
        }
        active
    }

    /// Show `text` on the default zone and block until every zone is idle
    ///
    /// Uses the zone's alignment, `Print` in and no exit effect. Returns the
    /// number of bytes shown, 0 if there is no zone to show them on.
    pub fn write_text(&mut self, text: &str) -> usize {
        let z = self.default_zone;
        let Some(align) = self.get_zone(z).map(Zone::alignment) else {
            return 0;
        };
        if self
            .display_zone_text(z, text, align, 0, 0, TextEffect::Print, TextEffect::NoEffect)
            .is_err()
        {
            return 0;
        }
        while self.animate() {}
        text.len()
    }

    /// Byte-buffer form of [`write_text`](Self::write_text)
    ///
    /// The bytes are copied into a fixed-capacity buffer first. Input that
    /// does not fit, or is not UTF-8, is discarded and 0 is returned.
    pub fn write_bytes(&mut self, buffer: &[u8]) -> usize {
        let mut copy: String<MAX_TEXT_LEN> = String::new();
        let Ok(text) = core::str::from_utf8(buffer) else {
            return 0;
        };
        if copy.push_str(text).is_err() {
            #[cfg(feature = "defmt")]
            defmt::debug!("Dropped {} byte write", buffer.len());
            return 0;
        }
        self.write_text(&copy);
        buffer.len()
    }

    /// Restart the current message of zone `z`
    pub fn display_reset(&mut self, z: u8) -> Result<(), MarqueeError> {
        self.zone_mut(z)?.reset();
        Ok(())
    }

    /// Restart the current message of every zone
    pub fn display_reset_all(&mut self) {
        self.zones.iter_mut().for_each(Zone::reset);
    }

    /// Blank zone `z` and stop its animation
    pub fn display_clear(&mut self, z: u8) -> Result<(), MarqueeError> {
        let zone = self
            .zones
            .get_mut(usize::from(z))
            .ok_or(MarqueeError::InvalidZone)?;
        let mut frame = FrameGuard::suspend(&mut self.display);
        let (start, end) = zone.module_range();
        zone.clear(&mut ZoneWindow::new(frame.display(), start, end));
        frame.commit().map_err(|_| MarqueeError::Hardware)
    }

    /// Blank every zone and stop all animation
    pub fn display_clear_all(&mut self) -> Result<(), MarqueeError> {
        let mut frame = FrameGuard::suspend(&mut self.display);
        for zone in self.zones.iter_mut() {
            let (start, end) = zone.module_range();
            zone.clear(&mut ZoneWindow::new(frame.display(), start, end));
        }
        frame.commit().map_err(|_| MarqueeError::Hardware)
    }

    /// Check if zone `z` has finished its animation
    pub fn zone_status(&self, z: u8) -> bool {
        self.get_zone(z).is_some_and(Zone::is_idle)
    }

    /// Animation phase of zone `z`
    pub fn zone_phase(&self, z: u8) -> Option<Phase> {
        self.get_zone(z).map(Zone::phase)
    }

    /// Restart every zone's frame timer from now so they step together
    pub fn synch_zone_start(&mut self) {
        let now = self.clock.now_ms();
        for zone in self.zones.iter_mut() {
            zone.synch(now);
        }
    }

    /// Blank (`true`) or wake (`false`) the whole chain
    pub fn display_shutdown(&mut self, shutdown: bool) -> Result<(), MarqueeError> {
        let last = self.last_module()?;
        self.display
            .control(0, last, ControlOption::Shutdown, u8::from(shutdown))
            .map_err(|_| MarqueeError::Hardware)
    }

    // === Global setters: apply to every zone ===

    pub fn set_text_alignment(&mut self, align: TextPosition) {
        self.zones.iter_mut().for_each(|zone| zone.set_alignment(align));
    }

    pub fn set_text_effect(&mut self, effect_in: TextEffect, effect_out: TextEffect) {
        self.zones
            .iter_mut()
            .for_each(|zone| zone.set_effects(effect_in, effect_out));
    }

    pub fn set_speed(&mut self, speed: u16) {
        self.zones.iter_mut().for_each(|zone| zone.set_speed(speed));
    }

    pub fn set_speed_in_out(&mut self, speed_in: u16, speed_out: u16) {
        self.zones
            .iter_mut()
            .for_each(|zone| zone.set_speed_in_out(speed_in, speed_out));
    }

    pub fn set_pause(&mut self, pause: u16) {
        self.zones.iter_mut().for_each(|zone| zone.set_pause(pause));
    }

    pub fn set_char_spacing(&mut self, spacing: u8) {
        self.zones
            .iter_mut()
            .for_each(|zone| zone.set_char_spacing(spacing));
    }

    pub fn set_scroll_spacing(&mut self, spacing: u16) {
        self.zones
            .iter_mut()
            .for_each(|zone| zone.set_scroll_spacing(spacing));
    }

    pub fn set_invert(&mut self, invert: bool) {
        self.zones.iter_mut().for_each(|zone| zone.set_invert(invert));
    }

    pub fn set_font(&mut self, font: &'static dyn Font) {
        self.zones.iter_mut().for_each(|zone| zone.set_font(font));
    }

    /// Set the intensity of every zone and of the whole chain
    pub fn set_intensity(&mut self, intensity: u8) -> Result<(), MarqueeError> {
        let last = self.last_module()?;
        self.zones
            .iter_mut()
            .for_each(|zone| zone.set_intensity(intensity));
        let level = intensity.min(marquee_hal::MAX_INTENSITY);
        self.display
            .control(0, last, ControlOption::Intensity, level)
            .map_err(|_| MarqueeError::Hardware)
    }

    // === Zone setters ===

    pub fn set_zone_text_alignment(&mut self, z: u8, align: TextPosition) -> Result<(), MarqueeError> {
        self.zone_mut(z)?.set_alignment(align);
        Ok(())
    }

    pub fn set_zone_text_effect(
        &mut self,
        z: u8,
        effect_in: TextEffect,
        effect_out: TextEffect,
    ) -> Result<(), MarqueeError> {
        self.zone_mut(z)?.set_effects(effect_in, effect_out);
        Ok(())
    }

    pub fn set_zone_speed(&mut self, z: u8, speed: u16) -> Result<(), MarqueeError> {
        self.zone_mut(z)?.set_speed(speed);
        Ok(())
    }

    pub fn set_zone_speed_in_out(
        &mut self,
        z: u8,
        speed_in: u16,
        speed_out: u16,
    ) -> Result<(), MarqueeError> {
        self.zone_mut(z)?.set_speed_in_out(speed_in, speed_out);
        Ok(())
    }

    pub fn set_zone_pause(&mut self, z: u8, pause: u16) -> Result<(), MarqueeError> {
        self.zone_mut(z)?.set_pause(pause);
        Ok(())
    }

    pub fn set_zone_char_spacing(&mut self, z: u8, spacing: u8) -> Result<(), MarqueeError> {
        self.zone_mut(z)?.set_char_spacing(spacing);
        Ok(())
    }

    pub fn set_zone_scroll_spacing(&mut self, z: u8, spacing: u16) -> Result<(), MarqueeError> {
        self.zone_mut(z)?.set_scroll_spacing(spacing);
        Ok(())
    }

    pub fn set_zone_invert(&mut self, z: u8, invert: bool) -> Result<(), MarqueeError> {
        self.zone_mut(z)?.set_invert(invert);
        Ok(())
    }

    pub fn set_zone_font(&mut self, z: u8, font: &'static dyn Font) -> Result<(), MarqueeError> {
        self.zone_mut(z)?.set_font(font);
        Ok(())
    }

    /// Set the intensity of zone `z` and of the modules it covers
    pub fn set_zone_intensity(&mut self, z: u8, intensity: u8) -> Result<(), MarqueeError> {
        let zone = self
            .zones
            .get_mut(usize::from(z))
            .ok_or(MarqueeError::InvalidZone)?;
        zone.set_intensity(intensity);
        let (start, end) = zone.module_range();
        self.display
            .control(start, end, ControlOption::Intensity, zone.intensity())
            .map_err(|_| MarqueeError::Hardware)
    }

    // === Zone getters ===

    pub fn zone_speed(&self, z: u8) -> Option<u16> {
        self.get_zone(z).map(Zone::speed)
    }

    pub fn zone_pause(&self, z: u8) -> Option<u16> {
        self.get_zone(z).map(Zone::pause)
    }

    pub fn zone_text_alignment(&self, z: u8) -> Option<TextPosition> {
        self.get_zone(z).map(Zone::alignment)
    }

    // === Settings ===

    /// Snapshot of the configuration and every zone's settings
    pub fn settings(&self) -> StoredSettings {
        let mut settings = StoredSettings::new(self.config);
        for zone in self.zones.iter() {
            // Same capacity as the arena
            let _ = settings.zones.push(zone.settings());
        }
        settings
    }

    /// Apply stored zone settings
    ///
    /// Every zone range is validated before anything changes. Entries beyond
    /// the current zone count are ignored.
    pub fn apply_settings(&mut self, settings: &StoredSettings) -> Result<(), MarqueeError> {
        if !settings.is_valid() {
            return Err(MarqueeError::Settings);
        }
        let in_range = |s: &crate::config::ZoneSettings| {
            s.module_start <= s.module_end && s.module_end < self.num_modules
        };
        if !settings.zones.iter().all(in_range) {
            return Err(MarqueeError::InvalidModuleRange);
        }
        for (zone, stored) in self.zones.iter_mut().zip(settings.zones.iter()) {
            zone.set_range(stored.module_start, stored.module_end);
            zone.apply_settings(stored);
        }
        Ok(())
    }

    // === Collaborators ===

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Give back the display and clock
    pub fn release(self) -> (D, C) {
        (self.display, self.clock)
    }

    fn zone_mut(&mut self, z: u8) -> Result<&mut Zone, MarqueeError> {
        self.zones
            .get_mut(usize::from(z))
            .ok_or(MarqueeError::InvalidZone)
    }

    fn last_module(&self) -> Result<u8, MarqueeError> {
        self.num_modules
            .checked_sub(1)
            .ok_or(MarqueeError::Hardware)
    }
}

impl<D: MatrixDisplay, C: Clock> fmt::Write for Marquee<D, C> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.write_text(s) == s.len() {
            Ok(())
        } else {
            Err(fmt::Error)
        }
    }
}
