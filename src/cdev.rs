/// Linux GPIO character device backend (/dev/gpiochipN)

use crate::error::LineError;
use crate::line::{GpioLine, LineProvider};
use linux_embedded_hal::gpio_cdev::{Chip, Line, LineHandle, LineRequestFlags};
use log::{debug, info};

pub struct CdevChip {
    chip: Chip,
    consumer: String,
}

impl CdevChip {
    pub fn open(path: &str, consumer: &str) -> Result<Self, LineError> {
        let chip = Chip::new(path)?;
        info!(
            "GPIO chip opened: {} ({}, {} lines)",
            path,
            chip.label(),
            chip.num_lines()
        );

        Ok(CdevChip {
            chip,
            consumer: consumer.to_string(),
        })
    }
}

impl LineProvider for CdevChip {
    type Line = CdevLine;

    fn resolve(&mut self, pin: u32) -> Result<CdevLine, LineError> {
        if pin >= self.chip.num_lines() {
            return Err(LineError::NotFound(pin));
        }
        let line = self.chip.get_line(pin)?;
        debug!("Resolved line {} on {}", pin, self.chip.name());

        Ok(CdevLine {
            line,
            handle: None,
            consumer: self.consumer.clone(),
        })
    }
}

/// A chip line plus the kernel request holding its direction, once made.
pub struct CdevLine {
    line: Line,
    handle: Option<LineHandle>,
    consumer: String,
}

impl CdevLine {
    fn request(&mut self, flags: LineRequestFlags, default: u8) -> Result<(), LineError> {
        // The kernel refuses a second request while the first is held
        self.handle = None;
        self.handle = Some(self.line.request(flags, default, &self.consumer)?);
        Ok(())
    }

    fn handle(&self) -> Result<&LineHandle, LineError> {
        self.handle.as_ref().ok_or(LineError::NotConfigured)
    }
}

impl GpioLine for CdevLine {
    fn pin(&self) -> u32 {
        self.line.offset()
    }

    fn configure_output(&mut self, initial: bool) -> Result<(), LineError> {
        self.request(LineRequestFlags::OUTPUT, initial as u8)
    }

    fn configure_input(&mut self) -> Result<(), LineError> {
        self.request(LineRequestFlags::INPUT, 0)
    }

    fn set_value(&mut self, value: bool) -> Result<(), LineError> {
        self.handle()?.set_value(value as u8)?;
        Ok(())
    }

    fn get_value(&self) -> Result<bool, LineError> {
        Ok(self.handle()?.get_value()? != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_chip() {
        let result = CdevChip::open("/dev/gpiochip-does-not-exist", "gpioctrl");
        assert!(matches!(result, Err(LineError::Cdev(_))));
    }
}
