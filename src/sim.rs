//! In-memory GPIO chip.
//!
//! Stands in for real hardware on development machines and in tests. A
//! `SimChip` is a cheap handle: clones share the same lines, so a test can
//! hand one clone to the controller and keep another to inspect levels,
//! inject faults and read back the calls that were made.

use crate::error::LineError;
use crate::line::{Direction, GpioLine, LineProvider};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One primitive call made against the chip, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimCall {
    Resolve(u32),
    ConfigureOutput(u32, bool),
    ConfigureInput(u32),
    SetValue(u32, bool),
    GetValue(u32),
}

#[derive(Debug, Default)]
struct SimLineState {
    direction: Option<Direction>,
    level: bool,
    reject_direction: bool,
    fail_io: bool,
}

#[derive(Debug, Default)]
struct SimState {
    lines: BTreeMap<u32, SimLineState>,
    calls: Vec<SimCall>,
}

impl SimState {
    fn line(&mut self, pin: u32) -> Result<&mut SimLineState, LineError> {
        self.lines.get_mut(&pin).ok_or(LineError::NotFound(pin))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimChip {
    state: Arc<Mutex<SimState>>,
}

impl SimChip {
    /// Chip with lines `0..num_lines`, all unconfigured and low.
    pub fn new(num_lines: u32) -> Self {
        let chip = SimChip::default();
        {
            let mut state = chip.state.lock();
            for pin in 0..num_lines {
                state.lines.insert(pin, SimLineState::default());
            }
        }
        chip
    }

    /// Remove a line so it no longer resolves.
    pub fn unplug(&self, pin: u32) {
        self.state.lock().lines.remove(&pin);
    }

    /// Physical level seen by the chip, e.g. a pressed button.
    pub fn set_level(&self, pin: u32, level: bool) {
        if let Some(line) = self.state.lock().lines.get_mut(&pin) {
            line.level = level;
        }
    }

    /// Make every direction request on this line fail.
    pub fn reject_direction(&self, pin: u32) {
        if let Some(line) = self.state.lock().lines.get_mut(&pin) {
            line.reject_direction = true;
        }
    }

    /// Make every value read or write on this line fail.
    pub fn fail_io(&self, pin: u32) {
        if let Some(line) = self.state.lock().lines.get_mut(&pin) {
            line.fail_io = true;
        }
    }

    pub fn level(&self, pin: u32) -> Option<bool> {
        self.state.lock().lines.get(&pin).map(|line| line.level)
    }

    pub fn direction(&self, pin: u32) -> Option<Direction> {
        self.state.lock().lines.get(&pin).and_then(|line| line.direction)
    }

    pub fn calls(&self) -> Vec<SimCall> {
        self.state.lock().calls.clone()
    }
}

impl LineProvider for SimChip {
    type Line = SimLine;

    fn resolve(&mut self, pin: u32) -> Result<SimLine, LineError> {
        let mut state = self.state.lock();
        state.calls.push(SimCall::Resolve(pin));
        state.line(pin)?;

        Ok(SimLine {
            pin,
            state: Arc::clone(&self.state),
        })
    }
}

pub struct SimLine {
    pin: u32,
    state: Arc<Mutex<SimState>>,
}

impl SimLine {
    fn configure(&mut self, direction: Direction, initial: bool) -> Result<(), LineError> {
        let mut state = self.state.lock();
        let line = state.line(self.pin)?;
        if line.reject_direction {
            return Err(LineError::Rejected);
        }
        line.direction = Some(direction);
        if direction == Direction::Output {
            line.level = initial;
        }
        Ok(())
    }
}

impl GpioLine for SimLine {
    fn pin(&self) -> u32 {
        self.pin
    }

    fn configure_output(&mut self, initial: bool) -> Result<(), LineError> {
        self.state
            .lock()
            .calls
            .push(SimCall::ConfigureOutput(self.pin, initial));
        self.configure(Direction::Output, initial)
    }

    fn configure_input(&mut self) -> Result<(), LineError> {
        self.state.lock().calls.push(SimCall::ConfigureInput(self.pin));
        self.configure(Direction::Input, false)
    }

    fn set_value(&mut self, value: bool) -> Result<(), LineError> {
        let mut state = self.state.lock();
        state.calls.push(SimCall::SetValue(self.pin, value));
        let line = state.line(self.pin)?;
        if line.direction != Some(Direction::Output) {
            return Err(LineError::NotConfigured);
        }
        if line.fail_io {
            return Err(LineError::Fault);
        }
        line.level = value;
        Ok(())
    }

    fn get_value(&self) -> Result<bool, LineError> {
        let mut state = self.state.lock();
        state.calls.push(SimCall::GetValue(self.pin));
        let line = state.line(self.pin)?;
        if line.direction.is_none() {
            return Err(LineError::NotConfigured);
        }
        if line.fail_io {
            return Err(LineError::Fault);
        }
        Ok(line.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_out_of_range() {
        let mut chip = SimChip::new(4);
        assert!(chip.resolve(3).is_ok());
        assert!(matches!(chip.resolve(4), Err(LineError::NotFound(4))));
    }

    #[test]
    fn test_unplugged_line_does_not_resolve() {
        let mut chip = SimChip::new(32);
        chip.unplug(20);
        assert!(chip.resolve(20).is_err());
        assert!(chip.resolve(21).is_ok());
    }

    #[test]
    fn test_output_drives_level() {
        let chip = SimChip::new(32);
        let mut line = chip.clone().resolve(5).unwrap();

        assert!(matches!(line.set_value(true), Err(LineError::NotConfigured)));
        line.configure_output(true).unwrap();
        assert_eq!(chip.level(5), Some(true));
        line.set_value(false).unwrap();
        assert_eq!(chip.level(5), Some(false));
        assert_eq!(chip.direction(5), Some(Direction::Output));
    }

    #[test]
    fn test_input_reads_level_and_refuses_writes() {
        let chip = SimChip::new(32);
        let mut line = chip.clone().resolve(7).unwrap();
        line.configure_input().unwrap();

        chip.set_level(7, true);
        assert!(line.get_value().unwrap());
        assert!(matches!(line.set_value(false), Err(LineError::NotConfigured)));
    }

    #[test]
    fn test_injected_faults() {
        let chip = SimChip::new(32);
        chip.reject_direction(1);
        chip.fail_io(2);

        let mut rejected = chip.clone().resolve(1).unwrap();
        assert!(matches!(rejected.configure_input(), Err(LineError::Rejected)));
        assert_eq!(chip.direction(1), None);

        let mut faulty = chip.clone().resolve(2).unwrap();
        faulty.configure_output(false).unwrap();
        assert!(matches!(faulty.set_value(true), Err(LineError::Fault)));
        assert_eq!(chip.level(2), Some(false));
    }

    #[test]
    fn test_calls_are_recorded_in_order() {
        let chip = SimChip::new(32);
        let mut line = chip.clone().resolve(3).unwrap();
        line.configure_output(false).unwrap();
        line.set_value(true).unwrap();

        assert_eq!(
            chip.calls(),
            vec![
                SimCall::Resolve(3),
                SimCall::ConfigureOutput(3, false),
                SimCall::SetValue(3, true),
            ]
        );
    }
}
