/// Raspberry Pi backend. Pin numbers are BCM GPIO numbers.

use crate::error::LineError;
use crate::line::{GpioLine, LineProvider};
use log::debug;
use rppal::gpio::{Gpio, InputPin, OutputPin, Pin};
use std::mem;

pub struct RpiGpio {
    gpio: Gpio,
}

impl RpiGpio {
    pub fn new() -> Result<Self, LineError> {
        Ok(RpiGpio { gpio: Gpio::new()? })
    }
}

impl LineProvider for RpiGpio {
    type Line = RpiLine;

    fn resolve(&mut self, pin: u32) -> Result<RpiLine, LineError> {
        let bcm = u8::try_from(pin).map_err(|_| LineError::NotFound(pin))?;
        let pin = self.gpio.get(bcm)?;
        debug!("Resolved BCM GPIO {}", bcm);

        Ok(RpiLine {
            bcm,
            mode: Mode::Unconfigured(pin),
        })
    }
}

enum Mode {
    Unconfigured(Pin),
    Output(OutputPin),
    Input(InputPin),
    Released,
}

/// rppal hands out a different pin type per direction, so the direction
/// can only be chosen once per resolved line.
pub struct RpiLine {
    bcm: u8,
    mode: Mode,
}

impl RpiLine {
    fn take_unconfigured(&mut self) -> Result<Pin, LineError> {
        match mem::replace(&mut self.mode, Mode::Released) {
            Mode::Unconfigured(pin) => Ok(pin),
            other => {
                self.mode = other;
                Err(LineError::Rejected)
            }
        }
    }
}

impl GpioLine for RpiLine {
    fn pin(&self) -> u32 {
        self.bcm as u32
    }

    fn configure_output(&mut self, initial: bool) -> Result<(), LineError> {
        let pin = self.take_unconfigured()?;
        let output = if initial {
            pin.into_output_high()
        } else {
            pin.into_output_low()
        };
        self.mode = Mode::Output(output);
        Ok(())
    }

    fn configure_input(&mut self) -> Result<(), LineError> {
        let pin = self.take_unconfigured()?;
        self.mode = Mode::Input(pin.into_input());
        Ok(())
    }

    fn set_value(&mut self, value: bool) -> Result<(), LineError> {
        match &mut self.mode {
            Mode::Output(output) if value => output.set_high(),
            Mode::Output(output) => output.set_low(),
            _ => return Err(LineError::NotConfigured),
        }
        Ok(())
    }

    fn get_value(&self) -> Result<bool, LineError> {
        match &self.mode {
            Mode::Input(input) => Ok(input.is_high()),
            Mode::Output(output) => Ok(output.is_set_high()),
            _ => Err(LineError::NotConfigured),
        }
    }
}
