//! Dot-matrix display abstraction
//!
//! The display is modelled as a row of chained 8x8 modules. Module `m` owns
//! logical columns `m * COL_SIZE ..= m * COL_SIZE + 7`, with column 0 at the
//! left edge of module 0. Each column is one byte, bit 0 being the top row.
//!
//! While updates are on, writes reach the LEDs as they are made. Between
//! `update(Off)` and `update(On)` column writes and intensity changes only
//! touch the driver's buffer; switching updates back on commits the columns
//! and then the intensity, which is how several independent writers get a
//! single, tear-free commit.

/// Number of pixel columns in one module
pub const COL_SIZE: u16 = 8;

/// Number of pixel rows in one module
pub const ROW_SIZE: u8 = 8;

/// Highest intensity level accepted by [`ControlOption::Intensity`]
pub const MAX_INTENSITY: u8 = 15;

/// Module-level control options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlOption {
    /// Brightness, `0..=MAX_INTENSITY`
    Intensity,
    /// Non-zero blanks the modules without losing their contents
    Shutdown,
    /// Non-zero lights every LED (hardware self test)
    Test,
    /// Number of scanned rows minus one
    ScanLimit,
    /// BCD decode mask (matrix use wants 0)
    Decode,
}

/// Buffer commit mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UpdateMode {
    /// Hold buffered writes back from the hardware
    Off,
    /// Push pending writes and resume committing them
    On,
}

/// Chained LED matrix display
///
/// Implementations buffer column data and transfer it when asked to. The
/// controller brackets every animation frame with `update(Off)` /
/// `update(On)`.
pub trait MatrixDisplay {
    /// Error type for bus operations
    type Error: core::fmt::Debug;

    /// Initialise the hardware and clear the buffer
    fn begin(&mut self) -> Result<(), Self::Error>;

    /// Number of modules in the chain
    fn module_count(&self) -> u8;

    /// Apply a control option to modules `start..=end`
    ///
    /// Intensity changes made while updates are off take effect after the
    /// column data at `update(On)`.
    fn control(
        &mut self,
        start: u8,
        end: u8,
        option: ControlOption,
        value: u8,
    ) -> Result<(), Self::Error>;

    /// Suspend (`Off`) or resume and flush (`On`) hardware updates
    fn update(&mut self, mode: UpdateMode) -> Result<(), Self::Error>;

    /// Write one column
    ///
    /// Buffered while updates are off. Columns outside the display are
    /// ignored.
    fn set_column(&mut self, column: u16, data: u8);

    /// Read one column back from the buffer (0 outside the display)
    fn column(&self, column: u16) -> u8;

    /// Total number of pixel columns
    fn column_count(&self) -> u16 {
        u16::from(self.module_count()) * COL_SIZE
    }

    /// Blank columns `start..=end` in the buffer
    fn clear_columns(&mut self, start: u16, end: u16) {
        for column in start..=end {
            self.set_column(column, 0);
        }
    }
}

impl<T: MatrixDisplay + ?Sized> MatrixDisplay for &mut T {
    type Error = T::Error;

    fn begin(&mut self) -> Result<(), Self::Error> {
        (**self).begin()
    }

    fn module_count(&self) -> u8 {
        (**self).module_count()
    }

    fn control(
        &mut self,
        start: u8,
        end: u8,
        option: ControlOption,
        value: u8,
    ) -> Result<(), Self::Error> {
        (**self).control(start, end, option, value)
    }

    fn update(&mut self, mode: UpdateMode) -> Result<(), Self::Error> {
        (**self).update(mode)
    }

    fn set_column(&mut self, column: u16, data: u8) {
        (**self).set_column(column, data)
    }

    fn column(&self, column: u16) -> u8 {
        (**self).column(column)
    }

    fn column_count(&self) -> u16 {
        (**self).column_count()
    }

    fn clear_columns(&mut self, start: u16, end: u16) {
        (**self).clear_columns(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Strip {
        columns: [u8; 16],
        updates: u8,
    }

    impl MatrixDisplay for Strip {
        type Error = ();

        fn begin(&mut self) -> Result<(), ()> {
            Ok(())
        }

        fn module_count(&self) -> u8 {
            2
        }

        fn control(&mut self, _: u8, _: u8, _: ControlOption, _: u8) -> Result<(), ()> {
            Ok(())
        }

        fn update(&mut self, _mode: UpdateMode) -> Result<(), ()> {
            self.updates += 1;
            Ok(())
        }

        fn set_column(&mut self, column: u16, data: u8) {
            if let Some(c) = self.columns.get_mut(column as usize) {
                *c = data;
            }
        }

        fn column(&self, column: u16) -> u8 {
            self.columns.get(column as usize).copied().unwrap_or(0)
        }
    }

    #[test]
    fn test_column_count_from_modules() {
        let strip = Strip {
            columns: [0; 16],
            updates: 0,
        };
        assert_eq!(strip.column_count(), 16);
    }

    #[test]
    fn test_clear_columns_is_inclusive() {
        let mut strip = Strip {
            columns: [0xFF; 16],
            updates: 0,
        };
        strip.clear_columns(4, 7);
        assert_eq!(strip.column(3), 0xFF);
        assert_eq!(strip.column(4), 0);
        assert_eq!(strip.column(7), 0);
        assert_eq!(strip.column(8), 0xFF);
    }

    fn paint<D: MatrixDisplay>(mut display: D) {
        display.set_column(2, 0x81);
        display.update(UpdateMode::On).unwrap();
    }

    #[test]
    fn test_borrowed_display_forwards() {
        let mut strip = Strip {
            columns: [0; 16],
            updates: 0,
        };
        paint(&mut strip);
        assert_eq!(strip.column(2), 0x81);
        assert_eq!(strip.updates, 1);
    }
}
