use anyhow::{Context, Result};
use gpio_control::cdev::CdevChip;
use gpio_control::config::{self, BackendConfig, Config, PinAssignment};
use gpio_control::daemon::{Daemon, ShutdownSignal};
use gpio_control::rpi::RpiGpio;
use gpio_control::sim::SimChip;
use gpio_control::{LineProvider, PinController};
use log::info;
use std::path::Path;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    init_logger();

    let config = load_config()?;
    let pins = PinAssignment::default();
    info!(
        "gpioctrl starting: LED pin {}, button pin {}, offset {}, backend {:?}",
        pins.output_pin,
        pins.input_pin,
        pins.offset,
        config.backend
    );

    let shutdown = ShutdownSignal::register()?;

    let status = match &config.backend {
        BackendConfig::Cdev { chip } => {
            let provider = CdevChip::open(chip, &config.consumer)
                .context(format!("Failed to open GPIO chip: {}", chip))?;
            run(provider, pins, shutdown).await
        }
        BackendConfig::Rppal => {
            let provider = RpiGpio::new().context("Failed to access Raspberry Pi GPIO")?;
            run(provider, pins, shutdown).await
        }
        BackendConfig::Sim {
            lines,
            button_pressed,
        } => {
            let provider = SimChip::new(*lines);
            if let Some(line) = pins.input_line() {
                provider.set_level(line, *button_pressed);
            }
            run(provider, pins, shutdown).await
        }
    };

    if status != 0 {
        std::process::exit(status.abs());
    }

    info!("gpioctrl shutdown complete");
    Ok(())
}

/// Returns the module status: 0, or the negative errno activation failed with.
async fn run<P: LineProvider>(provider: P, pins: PinAssignment, shutdown: ShutdownSignal) -> i32 {
    let mut daemon = Daemon::new(PinController::new(provider, pins));
    match daemon.run_until(shutdown.recv()).await {
        Ok(()) => 0,
        Err(e) => e.status(),
    }
}

fn load_config() -> Result<Config> {
    match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            Config::load(&path)
        }
        None if Path::new(config::DEFAULT_CONFIG_PATH).exists() => {
            info!("Loading configuration from: {}", config::DEFAULT_CONFIG_PATH);
            Config::load(config::DEFAULT_CONFIG_PATH)
        }
        None => {
            info!("No configuration file, using built-in defaults");
            Ok(Config::default())
        }
    }
}

fn init_logger() {
    // Use `env_logger` for logging. Systemd/journald will capture stdout/stderr.
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
}
