use crate::config::{PinAssignment, COMPONENT};
use crate::error::{ControllerError, LineError};
use crate::line::{Direction, GpioLine, LineProvider, LineRole};
use log::{debug, error, info, warn};

/// Where the controller is in its one-shot lifecycle. `Failed` is terminal;
/// there is no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Resolving,
    Configuring,
    Active,
    Deactivated,
    Failed,
}

/// Load/unload hooks called by the host, each exactly once.
pub trait Lifecycle {
    fn on_activate(&mut self) -> Result<(), ControllerError>;

    /// Best-effort; must always complete.
    fn on_deactivate(&mut self);
}

/// Owns the LED (output) and button (input) lines for one load/unload cycle.
pub struct PinController<P: LineProvider> {
    provider: P,
    pins: PinAssignment,
    led: Option<P::Line>,
    button: Option<P::Line>,
    state: ControllerState,
    sampled: Option<bool>,
}

impl<P: LineProvider> PinController<P> {
    pub fn new(provider: P, pins: PinAssignment) -> Self {
        PinController {
            provider,
            pins,
            led: None,
            button: None,
            state: ControllerState::Uninitialized,
            sampled: None,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn assignment(&self) -> PinAssignment {
        self.pins
    }

    /// Button level read during activation, if it got that far.
    pub fn sampled_input(&self) -> Option<bool> {
        self.sampled
    }

    pub fn output_line(&self) -> Option<&P::Line> {
        self.led.as_ref()
    }

    /// Resolve both lines, configure them, switch the LED on and sample the
    /// button once. Stops at the first failure without undoing earlier steps.
    pub fn activate(&mut self) -> Result<(), ControllerError> {
        if self.state != ControllerState::Uninitialized {
            return Err(ControllerError::InvalidState { state: self.state });
        }

        match self.run_activation() {
            Ok(()) => {
                self.state = ControllerState::Active;
                Ok(())
            }
            Err(e) => {
                debug!("{} - Activation stopped in state {:?}", COMPONENT, self.state);
                self.state = ControllerState::Failed;
                Err(e)
            }
        }
    }

    fn run_activation(&mut self) -> Result<(), ControllerError> {
        let pins = self.pins;

        self.state = ControllerState::Resolving;
        // Both line numbers are checked before the platform is touched
        let led_pin = line_number(pins.output_pin, pins.output_line(), LineRole::Led)?;
        let button_pin = line_number(pins.input_pin, pins.input_line(), LineRole::Button)?;

        let led = self
            .provider
            .resolve(led_pin)
            .map_err(|source| resolution_failed(pins.output_pin, led_pin, LineRole::Led, source))?;
        let led = self.led.insert(led);

        let button = self.provider.resolve(button_pin).map_err(|source| {
            resolution_failed(pins.input_pin, button_pin, LineRole::Button, source)
        })?;
        let button = self.button.insert(button);

        self.state = ControllerState::Configuring;
        led.configure_output(false).map_err(|source| {
            configuration_failed(pins.output_pin, led.pin(), Direction::Output, source)
        })?;
        button.configure_input().map_err(|source| {
            configuration_failed(pins.input_pin, button.pin(), Direction::Input, source)
        })?;

        led.set_value(true).map_err(|source| {
            error!("{} - Error turning on LED on pin {}", COMPONENT, pins.output_pin);
            ControllerError::Io {
                pin: led.pin(),
                source,
            }
        })?;

        let pressed = button.get_value().map_err(|source| {
            error!("{} - Error reading Button on pin {}", COMPONENT, pins.input_pin);
            ControllerError::Io {
                pin: button.pin(),
                source,
            }
        })?;
        self.sampled = Some(pressed);
        info!("{} - Button is {}pressed", COMPONENT, pressed_prefix(pressed));

        Ok(())
    }

    /// Switch the LED off. Never fails; a write error is only logged.
    pub fn deactivate(&mut self) {
        match self.led.as_mut() {
            Some(led) => {
                if let Err(e) = led.set_value(false) {
                    warn!(
                        "{} - Could not turn off LED on pin {}: {}",
                        COMPONENT, self.pins.output_pin, e
                    );
                }
                // Reported even after a failed write; unload always completes
                info!("{} - Module exit: {} turned off", COMPONENT, LineRole::Led);
            }
            None => {
                debug!("{} - Module exit: {} was never acquired", COMPONENT, LineRole::Led);
            }
        }
        self.state = ControllerState::Deactivated;
    }
}

impl<P: LineProvider> Lifecycle for PinController<P> {
    fn on_activate(&mut self) -> Result<(), ControllerError> {
        self.activate()
    }

    fn on_deactivate(&mut self) {
        self.deactivate()
    }
}

/// A base pin plus offset past `u32::MAX` names no line at all.
fn line_number(base: u32, line: Option<u32>, role: LineRole) -> Result<u32, ControllerError> {
    line.ok_or_else(|| resolution_failed(base, base, role, LineError::NotFound(base)))
}

fn resolution_failed(base: u32, pin: u32, role: LineRole, source: LineError) -> ControllerError {
    error!("{} - Error getting pin {} for {}", COMPONENT, base, role);
    ControllerError::PinResolution { pin, role, source }
}

fn configuration_failed(
    base: u32,
    pin: u32,
    direction: Direction,
    source: LineError,
) -> ControllerError {
    error!("{} - Error setting pin {} as {}", COMPONENT, base, direction);
    ControllerError::Configuration {
        pin,
        direction,
        source,
    }
}

/// "" for a pressed button, "not " otherwise.
pub(crate) fn pressed_prefix(pressed: bool) -> &'static str {
    if pressed {
        ""
    } else {
        "not "
    }
}
