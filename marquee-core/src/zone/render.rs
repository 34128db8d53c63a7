//! Effect frame rendering
//!
//! Every frame redraws the whole zone: the text is laid out at some column
//! offset and each column is then passed through the effect's pixel rule.
//! A frame function returns `true` when it drew the last frame of its effect.

use crate::canvas::Canvas;
use crate::effect::{TextEffect, TextPosition};
use crate::font::{Font, TextColumns};

/// Rows in one column byte
const ROWS: i32 = 8;

/// Everything about a zone that affects what a frame looks like
pub(super) struct Scene<'a> {
    pub text: &'a str,
    pub font: &'a dyn Font,
    pub char_spacing: u8,
    pub scroll_spacing: u16,
    pub align: TextPosition,
    pub invert: bool,
    pub intensity: u8,
    /// Zone width in columns
    pub width: i32,
    /// Rendered text width in columns
    pub text_width: i32,
}

impl Scene<'_> {
    /// Offset of static text
    ///
    /// Text wider than the zone is anchored at the left edge.
    pub fn home(&self) -> i32 {
        if self.text_width >= self.width {
            return 0;
        }
        match self.align {
            TextPosition::Left => 0,
            TextPosition::Center => (self.width - self.text_width) / 2,
            TextPosition::Right => self.width - self.text_width,
        }
    }

    /// Offset the text is left at once `entry` has finished
    pub fn rest_offset(&self, entry: TextEffect) -> i32 {
        if entry == TextEffect::ScrollLeft && self.text_width > self.width {
            // Long text keeps scrolling until its tail is in view
            self.width - self.text_width
        } else {
            self.home()
        }
    }

    /// Draw the text at offset `x`, passing every column through `pixel`
    fn paint<C, F>(&self, canvas: &mut C, x: i32, mut pixel: F)
    where
        C: Canvas + ?Sized,
        F: FnMut(i32, u8) -> u8,
    {
        let mut source = TextColumns::new(self.text, self.font, self.char_spacing);
        if x < 0 {
            let _ = source.by_ref().take(x.unsigned_abs() as usize).count();
        }

        for column in 0..canvas.width() {
            let c = i32::from(column);
            let data = if c < x { 0 } else { source.next().unwrap_or(0) };
            let data = pixel(c, data);
            canvas.set_column(column, if self.invert { !data } else { data });
        }
    }

    /// Distance of column `c` from the zone centre
    fn centre_distance(&self, c: i32) -> i32 {
        let half = self.width / 2;
        if c < half {
            half - 1 - c
        } else {
            c - half
        }
    }

    fn max_centre_distance(&self) -> i32 {
        self.width - self.width / 2 - 1
    }

    /// Distance of column `c` from the nearest zone edge
    fn edge_distance(&self, c: i32) -> i32 {
        c.min(self.width - 1 - c)
    }

    fn max_edge_distance(&self) -> i32 {
        (self.width - 1) / 2
    }
}

/// Move a column's pixels `rows` rows towards the bottom
fn lower(data: u8, rows: i32) -> u8 {
    if rows >= ROWS {
        0
    } else {
        data << rows
    }
}

/// Move a column's pixels `rows` rows towards the top
fn raise(data: u8, rows: i32) -> u8 {
    if rows >= ROWS {
        0
    } else {
        data >> rows
    }
}

fn keep(_: i32, data: u8) -> u8 {
    data
}

fn blank(_: i32, _: u8) -> u8 {
    0
}

/// Draw entry frame `step` of `effect`
pub(super) fn entry_frame<C: Canvas + ?Sized>(
    scene: &Scene<'_>,
    effect: TextEffect,
    step: u32,
    canvas: &mut C,
) -> bool {
    let k = i32::try_from(step).unwrap_or(i32::MAX);
    let home = scene.home();

    match effect {
        TextEffect::NoEffect | TextEffect::Print => {
            scene.paint(canvas, home, keep);
            true
        }
        TextEffect::ScrollLeft => {
            let target = scene.rest_offset(effect);
            let x = (scene.width - 1).saturating_sub(k).max(target);
            scene.paint(canvas, x, keep);
            x <= target
        }
        TextEffect::ScrollRight => {
            let x = k.saturating_add(1).saturating_sub(scene.text_width).min(home);
            scene.paint(canvas, x, keep);
            x >= home
        }
        TextEffect::ScrollUp => {
            let rows = (ROWS - 1 - k).max(0);
            scene.paint(canvas, home, |_, d| lower(d, rows));
            rows == 0
        }
        TextEffect::ScrollDown => {
            let rows = (ROWS - 1 - k).max(0);
            scene.paint(canvas, home, |_, d| raise(d, rows));
            rows == 0
        }
        TextEffect::Wipe => {
            scene.paint(canvas, home, |c, d| if c <= k { d } else { 0 });
            k >= scene.width - 1
        }
        TextEffect::WipeCursor => {
            scene.paint(canvas, home, |c, d| match c.cmp(&k) {
                core::cmp::Ordering::Less => d,
                core::cmp::Ordering::Equal => 0xFF,
                core::cmp::Ordering::Greater => 0,
            });
            k >= scene.width
        }
        TextEffect::Opening => {
            scene.paint(canvas, home, |c, d| {
                if scene.centre_distance(c) <= k {
                    d
                } else {
                    0
                }
            });
            k >= scene.max_centre_distance()
        }
        TextEffect::Closing => {
            scene.paint(canvas, home, |c, d| {
                if scene.edge_distance(c) <= k {
                    d
                } else {
                    0
                }
            });
            k >= scene.max_edge_distance()
        }
        TextEffect::Fade => {
            let level = step.min(u32::from(scene.intensity)) as u8;
            canvas.set_intensity(level);
            scene.paint(canvas, home, keep);
            level >= scene.intensity
        }
    }
}

/// Draw exit frame `step` of `effect` for text resting at offset `x0`
pub(super) fn exit_frame<C: Canvas + ?Sized>(
    scene: &Scene<'_>,
    effect: TextEffect,
    step: u32,
    x0: i32,
    canvas: &mut C,
) -> bool {
    let k = i32::try_from(step).unwrap_or(i32::MAX);

    match effect {
        // NoEffect exits are held by the zone and never drawn
        TextEffect::NoEffect | TextEffect::Print => {
            scene.paint(canvas, x0, blank);
            true
        }
        TextEffect::ScrollLeft => {
            let end = -(scene.text_width + i32::from(scene.scroll_spacing));
            let x = (x0 - 1).saturating_sub(k).max(end);
            scene.paint(canvas, x, keep);
            x <= end
        }
        TextEffect::ScrollRight => {
            let end = scene.width + i32::from(scene.scroll_spacing);
            let x = (x0 + 1).saturating_add(k).min(end);
            scene.paint(canvas, x, keep);
            x >= end
        }
        TextEffect::ScrollUp => {
            let rows = k.saturating_add(1);
            scene.paint(canvas, x0, |_, d| raise(d, rows));
            rows >= ROWS
        }
        TextEffect::ScrollDown => {
            let rows = k.saturating_add(1);
            scene.paint(canvas, x0, |_, d| lower(d, rows));
            rows >= ROWS
        }
        TextEffect::Wipe => {
            scene.paint(canvas, x0, |c, d| if c <= k { 0 } else { d });
            k >= scene.width - 1
        }
        TextEffect::WipeCursor => {
            scene.paint(canvas, x0, |c, d| match c.cmp(&k) {
                core::cmp::Ordering::Less => 0,
                core::cmp::Ordering::Equal => 0xFF,
                core::cmp::Ordering::Greater => d,
            });
            k >= scene.width
        }
        TextEffect::Opening => {
            scene.paint(canvas, x0, |c, d| {
                if scene.centre_distance(c) <= k {
                    0
                } else {
                    d
                }
            });
            k >= scene.max_centre_distance()
        }
        TextEffect::Closing => {
            scene.paint(canvas, x0, |c, d| {
                if scene.edge_distance(c) <= k {
                    0
                } else {
                    d
                }
            });
            k >= scene.max_edge_distance()
        }
        TextEffect::Fade => {
            let level = u32::from(scene.intensity).saturating_sub(step) as u8;
            canvas.set_intensity(level);
            if level == 0 {
                scene.paint(canvas, x0, blank);
                canvas.set_intensity(scene.intensity);
                true
            } else {
                scene.paint(canvas, x0, keep);
                false
            }
        }
    }
}
