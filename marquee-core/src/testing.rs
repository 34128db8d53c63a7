//! Host-side doubles for the display and clock

use core::cell::Cell;

use heapless::Vec;
use marquee_hal::{Clock, ControlOption, MatrixDisplay, UpdateMode, COL_SIZE};

pub const MAX_MOCK_MODULES: usize = 8;

const MAX_MOCK_COLUMNS: usize = MAX_MOCK_MODULES * COL_SIZE as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    Begin,
    Suspend,
    Resume,
    Write(u16),
    Control(u8, u8, ControlOption, u8),
}

/// In-memory display that records what the engine does to it
pub struct MockDisplay {
    modules: u8,
    columns: [u8; MAX_MOCK_COLUMNS],
    intensity: [Option<u8>; MAX_MOCK_MODULES],
    shutdown: bool,
    suspended: bool,
    pub fail_begin: bool,
    pub suspend_count: u32,
    pub resume_count: u32,
    pub live_writes: u32,
    events: Vec<DisplayEvent, 256>,
}

impl MockDisplay {
    pub fn new(modules: u8) -> Self {
        Self {
            modules: modules.min(MAX_MOCK_MODULES as u8),
            columns: [0; MAX_MOCK_COLUMNS],
            intensity: [None; MAX_MOCK_MODULES],
            shutdown: false,
            suspended: false,
            fail_begin: false,
            suspend_count: 0,
            resume_count: 0,
            live_writes: 0,
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[DisplayEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn intensity(&self, module: u8) -> Option<u8> {
        self.intensity.get(module as usize).copied().flatten()
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn columns(&self) -> &[u8] {
        &self.columns[..usize::from(self.modules) * COL_SIZE as usize]
    }

    fn record(&mut self, event: DisplayEvent) {
        // Long animations overflow the log; the counters stay exact
        let _ = self.events.push(event);
    }
}

impl MatrixDisplay for MockDisplay {
    type Error = ();

    fn begin(&mut self) -> Result<(), ()> {
        self.record(DisplayEvent::Begin);
        if self.fail_begin {
            return Err(());
        }
        self.columns = [0; MAX_MOCK_COLUMNS];
        Ok(())
    }

    fn module_count(&self) -> u8 {
        self.modules
    }

    fn control(&mut self, start: u8, end: u8, option: ControlOption, value: u8) -> Result<(), ()> {
        if start > end || end >= self.modules {
            return Err(());
        }
        self.record(DisplayEvent::Control(start, end, option, value));
        for module in start..=end {
            match option {
                ControlOption::Intensity => self.intensity[module as usize] = Some(value),
                ControlOption::Shutdown => self.shutdown = value != 0,
                _ => {}
            }
        }
        Ok(())
    }

    fn update(&mut self, mode: UpdateMode) -> Result<(), ()> {
        match mode {
            UpdateMode::Off => {
                self.suspended = true;
                self.suspend_count += 1;
                self.record(DisplayEvent::Suspend);
            }
            UpdateMode::On => {
                self.suspended = false;
                self.resume_count += 1;
                self.record(DisplayEvent::Resume);
            }
        }
        Ok(())
    }

    fn set_column(&mut self, column: u16, data: u8) {
        if column >= self.column_count() {
            return;
        }
        if !self.suspended {
            self.live_writes += 1;
        }
        self.columns[column as usize] = data;
        self.record(DisplayEvent::Write(column));
    }

    fn column(&self, column: u16) -> u8 {
        if column < self.column_count() {
            self.columns[column as usize]
        } else {
            0
        }
    }
}

/// Clock that moves forward by `step` ms every time it is read
pub struct TestClock {
    now: Cell<u32>,
    step: u32,
}

impl TestClock {
    pub fn new(step: u32) -> Self {
        Self {
            now: Cell::new(0),
            step,
        }
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for TestClock {
    fn now_ms(&self) -> u32 {
        let now = self.now.get();
        self.now.set(now.wrapping_add(self.step));
        now
    }
}
