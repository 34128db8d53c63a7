//! MAX7219 / MAX7221 LED matrix chain (SPI)
//!
//! Every module in the chain is a MAX7219 driving one 8x8 matrix. The chips
//! are wired as a shift register: a transfer carries one 16-bit frame per
//! module and the first frame clocked out ends up in the module farthest
//! from the MCU. That module is logical module 0, the left end of the text.
//!
//! # Register frame
//!
//! - Byte 0: register address
//! - Byte 1: data
//!
//! Modules that should not be affected by a transfer get a no-op frame.
//!
//! # Updates
//!
//! While updates are on, every column write is sent straight away. Between
//! `update(Off)` and `update(On)` writes only touch the buffer, and intensity
//! changes are held back too; `update(On)` sends the rows first and the
//! intensity after them, so a frame never shows new brightness on old pixels.
//!
//! # Pixel mapping
//!
//! Digit register `DIGIT0 + r` holds row `r` of a module. Bit 7 of the row
//! byte is the leftmost column.

use embedded_hal::spi::SpiDevice;
use heapless::Vec;
use marquee_hal::{ControlOption, MatrixDisplay, UpdateMode, COL_SIZE, MAX_INTENSITY, ROW_SIZE};

/// MAX7219 register addresses
pub mod reg {
    /// No-op, used to pass a frame through a module
    pub const NOOP: u8 = 0x00;
    /// Row 0; rows 1-7 follow consecutively
    pub const DIGIT0: u8 = 0x01;
    /// BCD decode mode per digit
    pub const DECODE_MODE: u8 = 0x09;
    /// Brightness (0-15)
    pub const INTENSITY: u8 = 0x0A;
    /// Number of scanned digits minus one
    pub const SCAN_LIMIT: u8 = 0x0B;
    /// 0 = shutdown, 1 = normal operation
    pub const SHUTDOWN: u8 = 0x0C;
    /// 1 = all LEDs on
    pub const DISPLAY_TEST: u8 = 0x0F;
}

/// Longest supported chain
pub const MAX_MODULES: usize = 32;

const MAX_COLUMNS: usize = MAX_MODULES * COL_SIZE as usize;

/// Bytes in one chain-wide transfer
const MAX_FRAME: usize = MAX_MODULES * 2;

/// MAX7219 driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Max7219Error<E> {
    /// SPI transfer failed
    Spi(E),
    /// Control range is reversed or past the end of the chain
    InvalidModuleRange,
    /// Chain length is 0 or above `MAX_MODULES`
    InvalidModuleCount,
}

impl<E> From<E> for Max7219Error<E> {
    fn from(e: E) -> Self {
        Max7219Error::Spi(e)
    }
}

/// MAX7219 driver configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Max7219Config {
    /// Number of chained modules
    pub modules: u8,
    /// Intensity programmed at `begin` (0-15)
    pub intensity: u8,
}

impl Default for Max7219Config {
    fn default() -> Self {
        Self {
            modules: 4,
            intensity: MAX_INTENSITY / 2,
        }
    }
}

/// Chain of MAX7219 modules behind one chip select
pub struct Max7219<SPI> {
    spi: SPI,
    config: Max7219Config,
    /// Logical column buffer, bit 0 = top row
    columns: [u8; MAX_COLUMNS],
    /// Buffer differs from what the chips show
    dirty: bool,
    /// Between `update(Off)` and `update(On)`
    suspended: bool,
    /// Intensity written while suspended, per module
    pending_intensity: [Option<u8>; MAX_MODULES],
}

impl<SPI: SpiDevice> Max7219<SPI> {
    /// Create a driver; the chips are not touched until `begin`
    pub fn new(spi: SPI, config: Max7219Config) -> Result<Self, Max7219Error<SPI::Error>> {
        if config.modules == 0 || usize::from(config.modules) > MAX_MODULES {
            return Err(Max7219Error::InvalidModuleCount);
        }
        Ok(Self {
            spi,
            config,
            columns: [0; MAX_COLUMNS],
            dirty: false,
            suspended: false,
            pending_intensity: [None; MAX_MODULES],
        })
    }

    pub fn config(&self) -> &Max7219Config {
        &self.config
    }

    /// Give back the SPI device
    pub fn release(self) -> SPI {
        self.spi
    }

    /// Check if buffered columns are waiting to be sent
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Send the column buffer to the chips
    ///
    /// Sends nothing if the buffer has not changed since the last flush.
    pub fn flush(&mut self) -> Result<(), Max7219Error<SPI::Error>> {
        if !self.dirty {
            return Ok(());
        }
        for row in 0..ROW_SIZE {
            let mut frame: Vec<u8, MAX_FRAME> = Vec::new();
            for module in 0..self.config.modules {
                let data = self.row_byte(module, row);
                let _ = frame.extend_from_slice(&[reg::DIGIT0 + row, data]);
            }
            self.spi.write(&frame)?;
        }
        self.dirty = false;
        Ok(())
    }

    /// Send intensity changes held back during a suspended frame
    fn flush_intensity(&mut self) -> Result<(), Max7219Error<SPI::Error>> {
        let modules = usize::from(self.config.modules);
        if self.pending_intensity[..modules].iter().all(Option::is_none) {
            return Ok(());
        }
        let mut frame: Vec<u8, MAX_FRAME> = Vec::new();
        for pending in &self.pending_intensity[..modules] {
            let bytes = match pending {
                Some(level) => [reg::INTENSITY, *level],
                None => [reg::NOOP, 0],
            };
            let _ = frame.extend_from_slice(&bytes);
        }
        self.spi.write(&frame)?;
        self.pending_intensity = [None; MAX_MODULES];
        Ok(())
    }

    /// Push the buffer unless a frame is being drawn
    fn auto_flush(&mut self) {
        if self.suspended {
            return;
        }
        // Stays dirty on failure, so the next flush retries
        if let Err(_e) = self.flush() {
            #[cfg(feature = "defmt")]
            defmt::warn!("MAX7219 row transfer failed: {}", defmt::Debug2Format(&_e));
        }
    }

    /// Row `row` of `module` in MAX7219 bit order
    fn row_byte(&self, module: u8, row: u8) -> u8 {
        let first = usize::from(module) * COL_SIZE as usize;
        self.columns[first..first + COL_SIZE as usize]
            .iter()
            .enumerate()
            .filter(|&(_, &column)| column & (1 << row) != 0)
            .fold(0, |acc, (i, _)| acc | (0x80 >> i))
    }

    /// Write `register = value` to modules `start..=end`, no-op elsewhere
    fn write_register(
        &mut self,
        start: u8,
        end: u8,
        register: u8,
        value: u8,
    ) -> Result<(), Max7219Error<SPI::Error>> {
        let mut frame: Vec<u8, MAX_FRAME> = Vec::new();
        for module in 0..self.config.modules {
            let bytes = if (start..=end).contains(&module) {
                [register, value]
            } else {
                [reg::NOOP, 0]
            };
            let _ = frame.extend_from_slice(&bytes);
        }
        self.spi.write(&frame)?;
        Ok(())
    }

    fn write_all(&mut self, register: u8, value: u8) -> Result<(), Max7219Error<SPI::Error>> {
        self.write_register(0, self.config.modules - 1, register, value)
    }
}

impl<SPI: SpiDevice> MatrixDisplay for Max7219<SPI> {
    type Error = Max7219Error<SPI::Error>;

    fn begin(&mut self) -> Result<(), Self::Error> {
        self.write_all(reg::DISPLAY_TEST, 0)?;
        self.write_all(reg::SCAN_LIMIT, ROW_SIZE - 1)?;
        self.write_all(reg::DECODE_MODE, 0)?;
        self.write_all(reg::INTENSITY, self.config.intensity.min(MAX_INTENSITY))?;

        self.columns = [0; MAX_COLUMNS];
        self.dirty = true;
        self.suspended = false;
        self.pending_intensity = [None; MAX_MODULES];
        self.flush()?;

        self.write_all(reg::SHUTDOWN, 1)?;

        #[cfg(feature = "defmt")]
        defmt::info!("MAX7219 chain ready: {} modules", self.config.modules);
        Ok(())
    }

    fn module_count(&self) -> u8 {
        self.config.modules
    }

    fn control(
        &mut self,
        start: u8,
        end: u8,
        option: ControlOption,
        value: u8,
    ) -> Result<(), Self::Error> {
        if start > end || end >= self.config.modules {
            #[cfg(feature = "defmt")]
            defmt::warn!("MAX7219 control range {}..={} rejected", start, end);
            return Err(Max7219Error::InvalidModuleRange);
        }

        if option == ControlOption::Intensity && self.suspended {
            let level = value.min(MAX_INTENSITY);
            for pending in &mut self.pending_intensity[usize::from(start)..=usize::from(end)] {
                *pending = Some(level);
            }
            return Ok(());
        }

        let (register, data) = match option {
            ControlOption::Intensity => (reg::INTENSITY, value.min(MAX_INTENSITY)),
            // Register is active-low: 0 shuts the module down
            ControlOption::Shutdown => (reg::SHUTDOWN, u8::from(value == 0)),
            ControlOption::Test => (reg::DISPLAY_TEST, u8::from(value != 0)),
            ControlOption::ScanLimit => (reg::SCAN_LIMIT, value.min(ROW_SIZE - 1)),
            ControlOption::Decode => (reg::DECODE_MODE, value),
        };
        self.write_register(start, end, register, data)
    }

    fn update(&mut self, mode: UpdateMode) -> Result<(), Self::Error> {
        match mode {
            UpdateMode::Off => {
                self.suspended = true;
                Ok(())
            }
            UpdateMode::On => {
                self.suspended = false;
                self.flush()?;
                self.flush_intensity()
            }
        }
    }

    fn set_column(&mut self, column: u16, data: u8) {
        let count = usize::from(self.column_count());
        if let Some(slot) = self.columns[..count].get_mut(usize::from(column)) {
            if *slot != data {
                *slot = data;
                self.dirty = true;
                self.auto_flush();
            }
        }
    }

    fn clear_columns(&mut self, start: u16, end: u16) {
        let count = self.column_count();
        if start > end || start >= count {
            return;
        }
        let range = usize::from(start)..=usize::from(end.min(count - 1));
        if self.columns[range.clone()].iter().any(|&column| column != 0) {
            self.columns[range].fill(0);
            self.dirty = true;
            self.auto_flush();
        }
    }

    fn column(&self, column: u16) -> u8 {
        if column < self.column_count() {
            self.columns[usize::from(column)]
        } else {
            0
        }
    }
}
