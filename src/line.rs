//! Line-control primitives a platform has to offer for the controller to run on it.

use crate::error::LineError;
use std::fmt;

/// What a line is used for, as named in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    Led,
    Button,
}

impl fmt::Display for LineRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineRole::Led => write!(f, "LED"),
            LineRole::Button => write!(f, "Button"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Output,
    Input,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Output => write!(f, "output"),
            Direction::Input => write!(f, "input"),
        }
    }
}

/// A resolved hardware line. Starts unconfigured; values can only be
/// written after `configure_output` and read after either configure call.
pub trait GpioLine {
    /// Platform line number this handle refers to
    fn pin(&self) -> u32;

    fn configure_output(&mut self, initial: bool) -> Result<(), LineError>;

    fn configure_input(&mut self) -> Result<(), LineError>;

    fn set_value(&mut self, value: bool) -> Result<(), LineError>;

    fn get_value(&self) -> Result<bool, LineError>;
}

/// Resolves pin numbers to line handles.
pub trait LineProvider {
    type Line: GpioLine;

    /// Fails when the platform has no line with this number.
    fn resolve(&mut self, pin: u32) -> Result<Self::Line, LineError>;
}
