//! Minimal display and clock for integration tests

use std::cell::Cell;

use marquee_hal::{Clock, ControlOption, MatrixDisplay, UpdateMode, COL_SIZE};

/// Column buffer that counts writes made outside a suspended frame
pub struct Panel {
    pub columns: Vec<u8>,
    pub modules: u8,
    pub suspended: bool,
    pub live_writes: usize,
}

impl Panel {
    pub fn new(modules: u8) -> Self {
        Self {
            columns: vec![0; usize::from(modules) * COL_SIZE as usize],
            modules,
            suspended: false,
            live_writes: 0,
        }
    }
}

impl MatrixDisplay for Panel {
    type Error = ();

    fn begin(&mut self) -> Result<(), ()> {
        self.columns.fill(0);
        Ok(())
    }

    fn module_count(&self) -> u8 {
        self.modules
    }

    fn control(&mut self, start: u8, end: u8, _: ControlOption, _: u8) -> Result<(), ()> {
        if start <= end && end < self.modules {
            Ok(())
        } else {
            Err(())
        }
    }

    fn update(&mut self, mode: UpdateMode) -> Result<(), ()> {
        self.suspended = mode == UpdateMode::Off;
        Ok(())
    }

    fn set_column(&mut self, column: u16, data: u8) {
        if !self.suspended {
            self.live_writes += 1;
        }
        if let Some(slot) = self.columns.get_mut(usize::from(column)) {
            *slot = data;
        }
    }

    fn column(&self, column: u16) -> u8 {
        self.columns.get(usize::from(column)).copied().unwrap_or(0)
    }
}

/// Clock advancing one millisecond per read
#[derive(Default)]
pub struct Ticker(Cell<u32>);

impl Clock for Ticker {
    fn now_ms(&self) -> u32 {
        let now = self.0.get();
        self.0.set(now.wrapping_add(1));
        now
    }
}
