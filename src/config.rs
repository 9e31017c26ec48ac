use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

/// Name prefixed to every diagnostic line.
pub const COMPONENT: &str = "gpioctrl";

pub const IO_LED: u32 = 21;
pub const IO_BUTTON: u32 = 20;
/// Shift applied to both pins, for platforms that number their lines from a base.
pub const IO_OFFSET: u32 = 0;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/gpioctrl/config.yaml";
pub const DEFAULT_CHIP: &str = "/dev/gpiochip0";

/// The two pins the controller owns. Fixed at build time; the offset is kept
/// once so both lines always move together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinAssignment {
    pub output_pin: u32,
    pub input_pin: u32,
    pub offset: u32,
}

impl PinAssignment {
    pub const fn new(output_pin: u32, input_pin: u32, offset: u32) -> Self {
        Self {
            output_pin,
            input_pin,
            offset,
        }
    }

    /// Line number actually requested for the LED. `None` if the offset
    /// pushes it past the largest line number.
    pub fn output_line(&self) -> Option<u32> {
        self.output_pin.checked_add(self.offset)
    }

    /// Line number actually requested for the button.
    pub fn input_line(&self) -> Option<u32> {
        self.input_pin.checked_add(self.offset)
    }
}

impl Default for PinAssignment {
    fn default() -> Self {
        Self::new(IO_LED, IO_BUTTON, IO_OFFSET)
    }
}

/// Runtime configuration. Only selects the platform the pins live on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Label the kernel reports as the owner of requested lines
    #[serde(default = "default_consumer")]
    pub consumer: String,
    #[serde(default)]
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Linux GPIO character device
    Cdev {
        #[serde(default = "default_chip")]
        chip: String,
    },
    /// Raspberry Pi GPIO, BCM numbering
    Rppal,
    /// In-memory lines, for machines without GPIO
    Sim {
        #[serde(default = "default_sim_lines")]
        lines: u32,
        #[serde(default)]
        button_pressed: bool,
    },
}

fn default_consumer() -> String {
    COMPONENT.to_string()
}

fn default_chip() -> String {
    DEFAULT_CHIP.to_string()
}

fn default_sim_lines() -> u32 {
    32
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Cdev {
            chip: default_chip(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            consumer: default_consumer(),
            backend: BackendConfig::default(),
        }
    }
}

impl Config {
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse configuration file")
    }

    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path))?;
        Self::from_yaml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_time_pins() {
        let pins = PinAssignment::default();
        assert_eq!(pins.output_line(), Some(21));
        assert_eq!(pins.input_line(), Some(20));
    }

    #[test]
    fn test_offset_shifts_both_lines() {
        let pins = PinAssignment::new(IO_LED, IO_BUTTON, 512);
        assert_eq!(pins.output_line(), Some(533));
        assert_eq!(pins.input_line(), Some(532));
    }

    #[test]
    fn test_offset_overflow_names_no_line() {
        let pins = PinAssignment::new(IO_LED, IO_BUTTON, u32::MAX - 20);
        assert_eq!(pins.output_line(), None);
        assert_eq!(pins.input_line(), Some(u32::MAX));
    }

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.consumer, "gpioctrl");
    }

    #[test]
    fn test_parse_cdev_backend() {
        let yaml = "consumer: bench\nbackend:\n  kind: cdev\n  chip: /dev/gpiochip4\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.consumer, "bench");
        assert_eq!(
            config.backend,
            BackendConfig::Cdev {
                chip: "/dev/gpiochip4".to_string()
            }
        );
    }

    #[test]
    fn test_parse_sim_backend_defaults() {
        let config = Config::from_yaml("backend:\n  kind: sim\n").unwrap();
        assert_eq!(
            config.backend,
            BackendConfig::Sim {
                lines: 32,
                button_pressed: false
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown_backend() {
        assert!(Config::from_yaml("backend:\n  kind: sysfs\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend:\n  kind: rppal").unwrap();
        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.backend, BackendConfig::Rppal);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(Config::load("/nonexistent/gpioctrl.yaml").is_err());
    }
}
