//! Drawing surfaces handed to zones
//!
//! A zone never sees the whole display. It draws into a [`Canvas`] whose
//! column 0 is the zone's first column, and the canvas drops anything that
//! falls outside the zone. The controller wraps each frame in a
//! [`FrameGuard`] so every zone's writes reach the LEDs in one commit.

use marquee_hal::{ControlOption, MatrixDisplay, UpdateMode, COL_SIZE, MAX_INTENSITY};

/// Zone-local drawing surface
pub trait Canvas {
    /// Width in columns
    fn width(&self) -> u16;

    /// Write a column; columns at or past `width()` are ignored
    fn set_column(&mut self, column: u16, data: u8);

    /// Read a column back (0 past `width()`)
    fn column(&self, column: u16) -> u8;

    /// Set the brightness of the modules under this canvas
    fn set_intensity(&mut self, level: u8);
}

/// View of a module range of a [`MatrixDisplay`]
pub struct ZoneWindow<'a, D: MatrixDisplay> {
    display: &'a mut D,
    module_start: u8,
    module_end: u8,
}

impl<'a, D: MatrixDisplay> ZoneWindow<'a, D> {
    /// Create a view over modules `module_start..=module_end`
    pub fn new(display: &'a mut D, module_start: u8, module_end: u8) -> Self {
        Self {
            display,
            module_start,
            module_end,
        }
    }

    fn first_column(&self) -> u16 {
        u16::from(self.module_start) * COL_SIZE
    }
}

impl<D: MatrixDisplay> Canvas for ZoneWindow<'_, D> {
    fn width(&self) -> u16 {
        (u16::from(self.module_end) - u16::from(self.module_start) + 1) * COL_SIZE
    }

    fn set_column(&mut self, column: u16, data: u8) {
        if column < self.width() {
            let target = self.first_column() + column;
            self.display.set_column(target, data);
        }
    }

    fn column(&self, column: u16) -> u8 {
        if column < self.width() {
            self.display.column(self.first_column() + column)
        } else {
            0
        }
    }

    fn set_intensity(&mut self, level: u8) {
        let level = level.min(MAX_INTENSITY);
        // Logged and otherwise ignored
        if let Err(_e) = self.display.control(
            self.module_start,
            self.module_end,
            ControlOption::Intensity,
            level,
        ) {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "Intensity change failed on modules {}..={}: {}",
                self.module_start,
                self.module_end,
                defmt::Debug2Format(&_e)
            );
        }
    }
}

/// Suspends hardware updates for the lifetime of one frame
///
/// Created with updates switched off; [`FrameGuard::commit`] switches them
/// back on and reports the result. If the guard is dropped without a commit
/// (early return, error path) updates are still switched back on.
pub struct FrameGuard<'a, D: MatrixDisplay> {
    display: &'a mut D,
    committed: bool,
}

impl<'a, D: MatrixDisplay> FrameGuard<'a, D> {
    /// Switch hardware updates off
    pub fn suspend(display: &'a mut D) -> Self {
        if let Err(_e) = display.update(UpdateMode::Off) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Update suspend failed: {}", defmt::Debug2Format(&_e));
        }
        Self {
            display,
            committed: false,
        }
    }

    /// Display being drawn
    pub fn display(&mut self) -> &mut D {
        self.display
    }

    /// Switch updates back on, pushing the frame to the hardware
    pub fn commit(mut self) -> Result<(), D::Error> {
        self.committed = true;
        self.display.update(UpdateMode::On)
    }
}

impl<D: MatrixDisplay> Drop for FrameGuard<'_, D> {
    fn drop(&mut self) {
        if !self.committed {
            let _ = self.display.update(UpdateMode::On);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{DisplayEvent, MockDisplay};

    #[test]
    fn test_window_offsets_and_clips() {
        let mut display = MockDisplay::new(4);
        {
            let mut window = ZoneWindow::new(&mut display, 1, 2);
            assert_eq!(window.width(), 16);
            window.set_column(0, 0xAA);
            window.set_column(15, 0x55);
            window.set_column(16, 0xFF);
            assert_eq!(window.column(0), 0xAA);
            assert_eq!(window.column(16), 0);
        }
        assert_eq!(display.column(7), 0);
        assert_eq!(display.column(8), 0xAA);
        assert_eq!(display.column(23), 0x55);
        assert_eq!(display.column(24), 0);
    }

    #[test]
    fn test_window_intensity_targets_its_modules() {
        let mut display = MockDisplay::new(4);
        ZoneWindow::new(&mut display, 2, 3).set_intensity(40);
        assert_eq!(display.intensity(1), None);
        assert_eq!(display.intensity(2), Some(MAX_INTENSITY));
        assert_eq!(display.intensity(3), Some(MAX_INTENSITY));
    }

    #[test]
    fn test_commit_resumes_once() {
        let mut display = MockDisplay::new(2);
        let mut frame = FrameGuard::suspend(&mut display);
        frame.display().set_column(3, 1);
        frame.commit().unwrap();
        assert_eq!(
            display.events(),
            &[
                DisplayEvent::Suspend,
                DisplayEvent::Write(3),
                DisplayEvent::Resume
            ]
        );
    }

    #[test]
    fn test_drop_without_commit_resumes() {
        let mut display = MockDisplay::new(2);
        {
            let _frame = FrameGuard::suspend(&mut display);
        }
        assert_eq!(
            display.events(),
            &[DisplayEvent::Suspend, DisplayEvent::Resume]
        );
        assert!(!display.is_suspended());
    }
}
