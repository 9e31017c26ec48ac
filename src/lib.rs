//! gpioctrl - drive an LED line and sample a button line on Linux GPIO.
//!
//! The library holds the pin controller, the line backends it can run on
//! (GPIO character device, Raspberry Pi, in-memory simulator) and the small
//! host lifecycle used by the `gpioctrl` binary.

pub mod cdev;
pub mod config;
pub mod controller;
pub mod daemon;
pub mod error;
pub mod line;
pub mod rpi;
pub mod sim;

// Re-export main types for convenience
pub use config::{BackendConfig, Config, PinAssignment};
pub use controller::{ControllerState, Lifecycle, PinController};
pub use error::{ControllerError, LineError};
pub use line::{Direction, GpioLine, LineProvider, LineRole};
