//! Display zones
//!
//! A zone is a contiguous range of modules running its own message through
//! entry effect, pause and exit effect. [`Zone::animate`] advances at most
//! one frame per call and only draws through the [`Canvas`] it is given.

pub mod phase;
mod render;

use core::fmt;

use heapless::String;
use marquee_hal::MAX_INTENSITY;

use crate::canvas::Canvas;
use crate::config::{
    ZoneSettings, DEFAULT_CHAR_SPACING, DEFAULT_INTENSITY, DEFAULT_SPEED, MAX_TEXT_LEN,
};
use crate::effect::{TextEffect, TextPosition};
use crate::font::{Font, SYSTEM_FONT};

pub use phase::{Phase, ZoneEvent};
use render::Scene;

/// Replace `dst` with as much of `text` as fits
///
/// Returns `false` if the text had to be cut short.
fn copy_text(dst: &mut String<MAX_TEXT_LEN>, text: &str) -> bool {
    dst.clear();
    for ch in text.chars() {
        if dst.push(ch).is_err() {
            return false;
        }
    }
    true
}

/// One independently animated region of the display
pub struct Zone {
    module_start: u8,
    module_end: u8,
    text: String<MAX_TEXT_LEN>,
    /// Message to start once the current one has left
    queued: Option<String<MAX_TEXT_LEN>>,
    align: TextPosition,
    effect_in: TextEffect,
    effect_out: TextEffect,
    /// Milliseconds per entry frame
    speed_in: u16,
    /// Milliseconds per exit frame
    speed_out: u16,
    /// Milliseconds the text stays fully shown
    pause: u16,
    char_spacing: u8,
    scroll_spacing: u16,
    invert: bool,
    intensity: u8,
    font: &'static dyn Font,
    phase: Phase,
    /// Frame number within the running effect
    step: u32,
    /// Time of the last frame; `None` runs the next frame immediately
    last_step_ms: Option<u32>,
}

impl Default for Zone {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Zone")
            .field("modules", &(self.module_start..=self.module_end))
            .field("text", &self.text.as_str())
            .field("phase", &self.phase)
            .field("step", &self.step)
            .field("effects", &(self.effect_in, self.effect_out))
            .finish_non_exhaustive()
    }
}

impl Zone {
    /// Create an idle zone on module 0 with default settings
    pub fn new() -> Self {
        Self {
            module_start: 0,
            module_end: 0,
            text: String::new(),
            queued: None,
            align: TextPosition::Left,
            effect_in: TextEffect::Print,
            effect_out: TextEffect::NoEffect,
            speed_in: DEFAULT_SPEED,
            speed_out: DEFAULT_SPEED,
            pause: DEFAULT_SPEED.saturating_mul(10),
            char_spacing: DEFAULT_CHAR_SPACING,
            scroll_spacing: 0,
            invert: false,
            intensity: DEFAULT_INTENSITY,
            font: &SYSTEM_FONT,
            phase: Phase::Idle,
            step: 0,
            last_step_ms: None,
        }
    }

    /// Modules covered by this zone (inclusive)
    pub fn module_range(&self) -> (u8, u8) {
        (self.module_start, self.module_end)
    }

    /// Move the zone; the caller has validated the range
    pub(crate) fn set_range(&mut self, module_start: u8, module_end: u8) {
        self.module_start = module_start;
        self.module_end = module_end;
    }

    /// Current message
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the message without restarting the animation
    ///
    /// Returns `false` if the text was truncated to `MAX_TEXT_LEN` bytes.
    pub fn set_text(&mut self, text: &str) -> bool {
        copy_text(&mut self.text, text)
    }

    /// Queue a message to run as soon as the current one has exited
    ///
    /// Replaces any message already queued. Returns `false` on truncation.
    pub fn queue_text(&mut self, text: &str) -> bool {
        let mut next = String::new();
        let complete = copy_text(&mut next, text);
        self.queued = Some(next);
        complete
    }

    /// Check if a follow-up message is waiting
    pub fn has_queued(&self) -> bool {
        self.queued.is_some()
    }

    pub fn alignment(&self) -> TextPosition {
        self.align
    }

    pub fn set_alignment(&mut self, align: TextPosition) {
        self.align = align;
    }

    /// Entry and exit effects
    pub fn effects(&self) -> (TextEffect, TextEffect) {
        (self.effect_in, self.effect_out)
    }

    pub fn set_effects(&mut self, effect_in: TextEffect, effect_out: TextEffect) {
        self.effect_in = effect_in;
        self.effect_out = effect_out;
    }

    /// Entry frame interval in ms
    pub fn speed(&self) -> u16 {
        self.speed_in
    }

    pub fn speed_in_out(&self) -> (u16, u16) {
        (self.speed_in, self.speed_out)
    }

    /// Use the same frame interval for entry and exit
    pub fn set_speed(&mut self, speed: u16) {
        self.set_speed_in_out(speed, speed);
    }

    pub fn set_speed_in_out(&mut self, speed_in: u16, speed_out: u16) {
        self.speed_in = speed_in;
        self.speed_out = speed_out;
    }

    pub fn pause(&self) -> u16 {
        self.pause
    }

    pub fn set_pause(&mut self, pause: u16) {
        self.pause = pause;
    }

    pub fn char_spacing(&self) -> u8 {
        self.char_spacing
    }

    pub fn set_char_spacing(&mut self, spacing: u8) {
        self.char_spacing = spacing;
    }

    /// Blank columns trailing the text when it scrolls out
    pub fn scroll_spacing(&self) -> u16 {
        self.scroll_spacing
    }

    pub fn set_scroll_spacing(&mut self, spacing: u16) {
        self.scroll_spacing = spacing;
    }

    pub fn invert(&self) -> bool {
        self.invert
    }

    pub fn set_invert(&mut self, invert: bool) {
        self.invert = invert;
    }

    pub fn intensity(&self) -> u8 {
        self.intensity
    }

    /// Record the zone brightness (clamped to `MAX_INTENSITY`)
    ///
    /// The controller is responsible for sending it to the hardware.
    pub fn set_intensity(&mut self, intensity: u8) {
        self.intensity = intensity.min(MAX_INTENSITY);
    }

    pub fn font(&self) -> &'static dyn Font {
        self.font
    }

    pub fn set_font(&mut self, font: &'static dyn Font) {
        self.font = font;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Check if the zone has nothing left to animate
    pub fn is_idle(&self) -> bool {
        !self.phase.is_active() && self.queued.is_none()
    }

    /// Restart the current message from the beginning of its entry effect
    pub fn reset(&mut self) {
        self.phase = self.phase.transition(ZoneEvent::Start);
        self.step = 0;
        self.last_step_ms = None;
    }

    /// Stop animating and blank the zone
    pub fn clear<C: Canvas + ?Sized>(&mut self, canvas: &mut C) {
        let background = if self.invert { 0xFF } else { 0x00 };
        for column in 0..canvas.width() {
            canvas.set_column(column, background);
        }
        // An interrupted fade leaves the modules dimmed
        if self.effect_in.uses_intensity() || self.effect_out.uses_intensity() {
            canvas.set_intensity(self.intensity);
        }
        self.queued = None;
        self.phase = self.phase.transition(ZoneEvent::Clear);
        self.step = 0;
    }

    /// Treat `now_ms` as the time of the last frame
    pub fn synch(&mut self, now_ms: u32) {
        self.last_step_ms = Some(now_ms);
    }

    /// Snapshot of the persistent settings
    pub fn settings(&self) -> ZoneSettings {
        ZoneSettings {
            module_start: self.module_start,
            module_end: self.module_end,
            align: self.align,
            effect_in: self.effect_in,
            effect_out: self.effect_out,
            speed_in: self.speed_in,
            speed_out: self.speed_out,
            pause: self.pause,
            char_spacing: self.char_spacing,
            scroll_spacing: self.scroll_spacing,
            invert: self.invert,
            intensity: self.intensity,
        }
    }

    /// Apply persistent settings, except the module range
    pub(crate) fn apply_settings(&mut self, settings: &ZoneSettings) {
        self.align = settings.align;
        self.set_effects(settings.effect_in, settings.effect_out);
        self.set_speed_in_out(settings.speed_in, settings.speed_out);
        self.pause = settings.pause;
        self.char_spacing = settings.char_spacing;
        self.scroll_spacing = settings.scroll_spacing;
        self.invert = settings.invert;
        self.set_intensity(settings.intensity);
    }

    /// Advance the animation by at most one frame
    ///
    /// Returns `true` while the zone still has frames to run.
    pub fn animate<C: Canvas + ?Sized>(&mut self, now_ms: u32, canvas: &mut C) -> bool {
        if self.phase == Phase::Idle {
            match self.queued.take() {
                Some(next) => {
                    self.text = next;
                    self.reset();
                }
                None => return false,
            }
        }

        if !self.is_due(now_ms) {
            return true;
        }
        self.last_step_ms = Some(now_ms);

        match self.phase {
            Phase::Entering => {
                let scene = self.scene(canvas.width());
                let done = render::entry_frame(&scene, self.effect_in, self.step, canvas);
                self.step = self.step.saturating_add(1);
                if done {
                    self.phase = self.phase.transition(ZoneEvent::EntryComplete);
                    self.step = 0;
                }
            }
            Phase::Displayed => {
                if self.effect_out == TextEffect::NoEffect {
                    self.finish(ZoneEvent::Hold);
                } else {
                    self.phase = self.phase.transition(ZoneEvent::PauseElapsed);
                    self.step = 0;
                    self.exit_step(canvas);
                }
            }
            Phase::Exiting => self.exit_step(canvas),
            Phase::Idle => {}
        }

        self.phase.is_active()
    }

    fn is_due(&self, now_ms: u32) -> bool {
        let interval = match self.phase {
            Phase::Entering => self.speed_in,
            Phase::Displayed => self.pause,
            Phase::Exiting => self.speed_out,
            Phase::Idle => 0,
        };
        match self.last_step_ms {
            Some(last) => now_ms.wrapping_sub(last) >= u32::from(interval),
            None => true,
        }
    }

    fn exit_step<C: Canvas + ?Sized>(&mut self, canvas: &mut C) {
        let scene = self.scene(canvas.width());
        let x0 = scene.rest_offset(self.effect_in);
        let done = render::exit_frame(&scene, self.effect_out, self.step, x0, canvas);
        self.step = self.step.saturating_add(1);
        if done {
            self.finish(ZoneEvent::ExitComplete);
        }
    }

    /// End the current message, chaining into a queued one if present
    fn finish(&mut self, event: ZoneEvent) {
        self.step = 0;
        match self.queued.take() {
            Some(next) => {
                self.text = next;
                self.phase = self.phase.transition(ZoneEvent::Start);
            }
            None => self.phase = self.phase.transition(event),
        }
    }

    fn scene(&self, width: u16) -> Scene<'_> {
        Scene {
            text: &self.text,
            font: self.font,
            char_spacing: self.char_spacing,
            scroll_spacing: self.scroll_spacing,
            align: self.align,
            invert: self.invert,
            intensity: self.intensity,
            width: i32::from(width),
            text_width: i32::try_from(self.font.text_width(&self.text, self.char_spacing))
                .unwrap_or(i32::MAX),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// One lit column per character
    pub struct Bars;

    impl Font for Bars {
        fn glyph(&self, _ch: char) -> &[u8] {
            &[0xFF]
        }
    }

    pub static BARS: Bars = Bars;

    /// Fixed-size canvas for driving a zone without a display
    pub struct Strip {
        data: [u8; 64],
        width: u16,
        pub intensity: Option<u8>,
    }

    impl Strip {
        pub fn new(width: u16) -> Self {
            Self {
                data: [0; 64],
                width: width.min(64),
                intensity: None,
            }
        }

        pub fn columns(&self) -> &[u8] {
            &self.data[..self.width as usize]
        }
    }

    impl Canvas for Strip {
        fn width(&self) -> u16 {
            self.width
        }

        fn set_column(&mut self, column: u16, data: u8) {
            if column < self.width {
                self.data[column as usize] = data;
            }
        }

        fn column(&self, column: u16) -> u8 {
            self.columns().get(column as usize).copied().unwrap_or(0)
        }

        fn set_intensity(&mut self, level: u8) {
            self.intensity = Some(level);
        }
    }

    fn zone(text: &str, effect_in: TextEffect, effect_out: TextEffect) -> Zone {
        let mut zone = Zone::new();
        zone.set_font(&BARS);
        zone.set_text(text);
        zone.set_effects(effect_in, effect_out);
        zone.set_speed(0);
        zone.set_pause(0);
        zone.reset();
        zone
    }

    /// Run until idle, returning the number of frames that reported active
    fn run(zone: &mut Zone, strip: &mut Strip, limit: u32) -> u32 {
        let mut frames = 0;
        while zone.animate(frames, strip) {
            frames += 1;
            assert!(frames < limit, "zone never went idle");
        }
        frames
    }

    #[test]
    fn test_new_zone_is_idle() {
        let mut zone = Zone::new();
        let mut strip = Strip::new(8);
        assert!(zone.is_idle());
        assert!(!zone.animate(0, &mut strip));
        assert_eq!(strip.columns(), &[0; 8]);
    }

    #[test]
    fn test_print_cycle() {
        let mut zone = zone("ab", TextEffect::Print, TextEffect::Print);
        let mut strip = Strip::new(8);

        assert!(zone.animate(0, &mut strip));
        assert_eq!(zone.phase(), Phase::Displayed);
        assert_eq!(strip.columns(), &[0xFF, 0, 0xFF, 0, 0, 0, 0, 0]);

        // Pause over: print exit blanks in the same frame
        assert!(!zone.animate(1, &mut strip));
        assert_eq!(zone.phase(), Phase::Idle);
        assert_eq!(strip.columns(), &[0; 8]);
    }

    #[test]
    fn test_no_effect_exit_keeps_text() {
        let mut zone = zone("ab", TextEffect::Print, TextEffect::NoEffect);
        let mut strip = Strip::new(4);
        assert_eq!(run(&mut zone, &mut strip, 10), 1);
        assert_eq!(strip.columns(), &[0xFF, 0, 0xFF, 0]);
    }

    #[test]
    fn test_speed_paces_frames() {
        let mut zone = zone("a", TextEffect::ScrollLeft, TextEffect::Print);
        zone.set_speed(10);
        let mut strip = Strip::new(4);

        assert!(zone.animate(0, &mut strip));
        assert_eq!(strip.columns(), &[0, 0, 0, 0xFF]);
        // Not due yet
        assert!(zone.animate(5, &mut strip));
        assert_eq!(strip.columns(), &[0, 0, 0, 0xFF]);
        assert!(zone.animate(10, &mut strip));
        assert_eq!(strip.columns(), &[0, 0, 0xFF, 0]);
    }

    #[test]
    fn test_pause_holds_displayed_phase() {
        let mut zone = zone("a", TextEffect::Print, TextEffect::Print);
        zone.set_pause(100);
        let mut strip = Strip::new(4);

        assert!(zone.animate(1000, &mut strip));
        assert!(zone.animate(1050, &mut strip));
        assert_eq!(zone.phase(), Phase::Displayed);
        assert!(!zone.animate(1100, &mut strip));
        assert_eq!(zone.phase(), Phase::Idle);
    }

    #[test]
    fn test_timer_wraps() {
        let mut zone = zone("a", TextEffect::Print, TextEffect::Print);
        zone.set_pause(20);
        let mut strip = Strip::new(4);
        assert!(zone.animate(u32::MAX - 5, &mut strip));
        assert!(zone.animate(u32::MAX, &mut strip));
        assert!(!zone.animate(14, &mut strip));
    }

    #[test]
    fn test_queued_text_chains_without_idle() {
        let mut zone = zone("a", TextEffect::Print, TextEffect::Print);
        zone.queue_text("bb");
        let mut strip = Strip::new(4);

        assert!(zone.animate(0, &mut strip));
        // Exit of the first message hands straight over to the second
        assert!(zone.animate(1, &mut strip));
        assert_eq!(zone.phase(), Phase::Entering);
        assert_eq!(zone.text(), "bb");
        assert!(!zone.has_queued());

        assert!(zone.animate(2, &mut strip));
        assert_eq!(strip.columns(), &[0xFF, 0, 0xFF, 0]);
    }

    #[test]
    fn test_idle_zone_picks_up_queued_text() {
        let mut zone = zone("a", TextEffect::Print, TextEffect::Print);
        let mut strip = Strip::new(4);
        run(&mut zone, &mut strip, 10);
        assert!(zone.is_idle());

        zone.queue_text("a");
        assert!(!zone.is_idle());
        assert!(zone.animate(100, &mut strip));
        assert_eq!(strip.columns(), &[0xFF, 0, 0, 0]);
    }

    #[test]
    fn test_every_effect_terminates() {
        let effects = [
            TextEffect::NoEffect,
            TextEffect::Print,
            TextEffect::ScrollLeft,
            TextEffect::ScrollRight,
            TextEffect::ScrollUp,
            TextEffect::ScrollDown,
            TextEffect::Wipe,
            TextEffect::WipeCursor,
            TextEffect::Opening,
            TextEffect::Closing,
            TextEffect::Fade,
        ];
        for effect_in in effects {
            for effect_out in effects {
                for text in ["", "abc", "abcdefghijklmnopqrstuvwxyz"] {
                    let mut zone = zone(text, effect_in, effect_out);
                    let mut strip = Strip::new(16);
                    run(&mut zone, &mut strip, 500);
                    assert!(zone.is_idle());
                }
            }
        }
    }

    #[test]
    fn test_scroll_exit_blanks_zone() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        let mut zone = zone(text, TextEffect::ScrollLeft, TextEffect::ScrollLeft);
        let mut strip = Strip::new(16);
        run(&mut zone, &mut strip, 500);
        assert_eq!(strip.columns(), &[0; 16]);
    }

    #[test]
    fn test_reset_restarts_entry() {
        let mut zone = zone("a", TextEffect::Wipe, TextEffect::Print);
        let mut strip = Strip::new(8);
        zone.animate(0, &mut strip);
        zone.animate(1, &mut strip);
        zone.reset();
        assert_eq!(zone.phase(), Phase::Entering);
        assert!(zone.animate(2, &mut strip));
        assert_eq!(strip.columns(), &[0xFF, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_clear_uses_background_and_drops_queue() {
        let mut zone = zone("a", TextEffect::Print, TextEffect::Print);
        zone.set_invert(true);
        zone.queue_text("b");
        let mut strip = Strip::new(3);
        zone.animate(0, &mut strip);
        zone.clear(&mut strip);
        assert!(zone.is_idle());
        assert_eq!(strip.columns(), &[0xFF; 3]);
        assert_eq!(strip.intensity, None);
    }

    #[test]
    fn test_clear_restores_faded_intensity() {
        let mut zone = zone("a", TextEffect::Fade, TextEffect::Fade);
        zone.set_intensity(9);
        let mut strip = Strip::new(4);
        zone.animate(0, &mut strip);
        assert_eq!(strip.intensity, Some(0));
        zone.clear(&mut strip);
        assert_eq!(strip.intensity, Some(9));
    }

    #[test]
    fn test_text_truncated_to_capacity() {
        let mut zone = Zone::new();
        let long = [b'x'; MAX_TEXT_LEN + 10];
        let long = core::str::from_utf8(&long).unwrap();
        assert!(!zone.set_text(long));
        assert_eq!(zone.text().len(), MAX_TEXT_LEN);
        assert!(zone.set_text("short"));
        assert_eq!(zone.text(), "short");
    }

    #[test]
    fn test_intensity_clamped() {
        let mut zone = Zone::new();
        zone.set_intensity(200);
        assert_eq!(zone.intensity(), MAX_INTENSITY);
    }
}
