use crate::controller::Lifecycle;
use crate::error::ControllerError;
use anyhow::{Context, Result};
use log::{error, info};
use std::future::Future;
use tokio::signal::unix::{signal, Signal, SignalKind};

/// Host side of the lifecycle: load the module, keep it loaded until told to
/// stop, then unload it.
pub struct Daemon<M: Lifecycle> {
    module: M,
}

impl<M: Lifecycle> Daemon<M> {
    pub fn new(module: M) -> Self {
        Daemon { module }
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    /// Run the load hook, wait for `shutdown`, run the unload hook.
    ///
    /// A failed load is returned straight away and the unload hook is not
    /// called, the same as a host that refuses to load the module.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<(), ControllerError>
    where
        F: Future<Output = ()>,
    {
        if let Err(e) = self.module.on_activate() {
            error!("Module load failed: {} (status {})", e, e.status());
            return Err(e);
        }
        info!("Module loaded, waiting for shutdown signal");

        shutdown.await;

        self.module.on_deactivate();
        info!("Module unloaded");
        Ok(())
    }
}

/// SIGTERM/SIGINT listener. Registered before the module is loaded so a stop
/// request arriving during activation is not lost.
pub struct ShutdownSignal {
    sigterm: Signal,
    sigint: Signal,
}

impl ShutdownSignal {
    pub fn register() -> Result<Self> {
        let sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
        let sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;
        Ok(ShutdownSignal { sigterm, sigint })
    }

    pub async fn recv(mut self) {
        tokio::select! {
            _ = self.sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully");
            }
            _ = self.sigint.recv() => {
                info!("Received SIGINT, shutting down gracefully");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PinAssignment;
    use crate::controller::{ControllerState, PinController};
    use crate::sim::SimChip;

    #[tokio::test]
    async fn test_run_until_shutdown() {
        let chip = SimChip::new(32);
        let mut daemon = Daemon::new(PinController::new(chip.clone(), PinAssignment::default()));

        let led = PinAssignment::default().output_line().unwrap();
        let observer = chip.clone();
        let shutdown = async move {
            assert_eq!(observer.level(led), Some(true));
        };

        daemon.run_until(shutdown).await.unwrap();

        assert_eq!(daemon.module().state(), ControllerState::Deactivated);
        assert_eq!(chip.level(led), Some(false));
    }

    #[tokio::test]
    async fn test_failed_load_skips_unload() {
        let chip = SimChip::new(8);
        let mut daemon = Daemon::new(PinController::new(chip.clone(), PinAssignment::default()));

        let err = daemon.run_until(std::future::ready(())).await.unwrap_err();

        assert_eq!(err.status(), -libc::ENODEV);
        assert_eq!(daemon.module().state(), ControllerState::Failed);
    }
}
