use crate::controller::ControllerState;
use crate::line::{Direction, LineRole};
use linux_embedded_hal::gpio_cdev;
use std::error::Error as StdError;
use std::io;
use thiserror::Error;

/// Failure reported by a line backend.
#[derive(Debug, Error)]
pub enum LineError {
    #[error("GPIO character device: {0}")]
    Cdev(#[from] gpio_cdev::errors::Error),

    #[error("Raspberry Pi GPIO: {0}")]
    Rppal(#[from] rppal::gpio::Error),

    #[error("no line {0} on this platform")]
    NotFound(u32),

    #[error("line is not configured for this operation")]
    NotConfigured,

    #[error("request rejected by the platform")]
    Rejected,

    #[error("line value access failed")]
    Fault,
}

impl LineError {
    /// OS error number behind this failure, when the platform gave one.
    pub fn errno(&self) -> Option<i32> {
        match self {
            LineError::Cdev(e) => cause_errno(e),
            LineError::Rppal(rppal::gpio::Error::Io(io)) => io.raw_os_error(),
            LineError::Rppal(rppal::gpio::Error::PermissionDenied(_)) => Some(libc::EACCES),
            LineError::NotFound(_) => Some(libc::ENODEV),
            _ => None,
        }
    }
}

/// gpio-cdev keeps its error kind private; the OS error is only reachable
/// through the source chain (an `io::Error`, or a nix `Errno` for ioctls).
fn cause_errno(err: &gpio_cdev::errors::Error) -> Option<i32> {
    let mut cause = err.source();
    while let Some(e) = cause {
        if let Some(n) = e.downcast_ref::<io::Error>().and_then(io::Error::raw_os_error) {
            return Some(n);
        }
        if let Some(errno) = e.downcast_ref::<nix::errno::Errno>() {
            return Some(*errno as i32);
        }
        cause = e.source();
    }
    None
}

/// Why activation stopped.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("error getting pin {pin} for {role}: {source}")]
    PinResolution {
        pin: u32,
        role: LineRole,
        #[source]
        source: LineError,
    },

    #[error("error setting pin {pin} as {direction}: {source}")]
    Configuration {
        pin: u32,
        direction: Direction,
        #[source]
        source: LineError,
    },

    #[error("I/O on pin {pin} failed: {source}")]
    Io {
        pin: u32,
        #[source]
        source: LineError,
    },

    #[error("cannot activate from state {state:?}")]
    InvalidState { state: ControllerState },
}

impl ControllerError {
    /// Negative errno handed back to the host lifecycle manager.
    pub fn status(&self) -> i32 {
        match self {
            ControllerError::PinResolution { .. } => -libc::ENODEV,
            ControllerError::Configuration { source, .. } => {
                -source.errno().unwrap_or(libc::EINVAL)
            }
            ControllerError::Io { .. } => -libc::EIO,
            ControllerError::InvalidState { .. } => -libc::EBUSY,
        }
    }
}
