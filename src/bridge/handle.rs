//! Bridge Handle - lifecycle management for one controller connection.
//!
//! Owns the cancellation token and the worker thread join handle. The
//! serial port and the virtual gamepad are created here, on the caller's
//! thread, so open-time failures surface synchronously and no worker is
//! started for a connection that never came up.

use std::thread::JoinHandle;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::gamepad::{GamepadError, VirtualWheelPad};
use crate::mapping::InputMapper;
use crate::protocol::FrameDecoder;
use crate::serial::{self, SerialOpenError};

use super::{worker, BridgeEvent};

/// Configuration for one connection attempt.
#[derive(Clone, Debug)]
pub struct BridgeSettings {
    /// Serial port name as reported by the enumerator (`/dev/ttyUSB0`,
    /// `COM3`, ...)
    pub port: String,

    /// Device name under which the virtual gamepad registers with the host
    pub device_name: String,
}

impl BridgeSettings {
    pub fn for_port(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            device_name: "Wheelbridge Virtual Gamepad".to_string(),
        }
    }
}

/// Errors that can occur while establishing a connection.
///
/// Anything past a successful spawn is reported asynchronously as a
/// [`BridgeEvent::Error`] instead.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Serial port unavailable or busy at open time
    #[error("Connection error: {0}")]
    Connection(#[from] SerialOpenError),

    /// Virtual gamepad could not be registered with the host
    #[error("Gamepad error: {0}")]
    Gamepad(#[from] GamepadError),

    /// Worker thread could not be started
    #[error("Initialization error: {0}")]
    Initialization(String),
}

/// Handle for one running bridge connection.
///
/// Dropping the handle without calling [`shutdown`](Self::shutdown) leaves
/// the worker running until its next fatal error; the UI always shuts
/// down explicitly.
pub struct BridgeHandle {
    port: String,
    token: CancellationToken,
    worker: Option<JoinHandle<()>>,
}

impl BridgeHandle {
    /// Opens the serial port, registers the virtual gamepad, and starts
    /// the worker thread.
    ///
    /// Emits [`BridgeEvent::Connected`] once the worker is running. Both
    /// the port and the gamepad move into the worker and are released
    /// when it exits.
    ///
    /// # Errors
    ///
    /// * [`BridgeError::Connection`] - port unavailable or busy; no
    ///   thread is started
    /// * [`BridgeError::Gamepad`] - uinput device creation failed
    pub fn spawn(
        settings: BridgeSettings,
        events: mpsc::Sender<BridgeEvent>,
    ) -> Result<Self, BridgeError> {
        info!("Connecting bridge on {}", settings.port);

        let port = serial::open_port(&settings.port)?;
        let pad = VirtualWheelPad::new(&settings.device_name)?;

        let token = CancellationToken::new();
        let worker_token = token.clone();
        let worker_events = events.clone();

        let decoder = FrameDecoder::new(port);
        let mapper = InputMapper::new(pad);

        let worker = std::thread::Builder::new()
            .name(format!("bridge-{}", settings.port))
            .spawn(move || worker::run(decoder, mapper, worker_token, worker_events))
            .map_err(|e| BridgeError::Initialization(e.to_string()))?;

        if let Err(e) = events.try_send(BridgeEvent::Connected {
            port: settings.port.clone(),
        }) {
            warn!("Dropping bridge status event: {}", e);
        }

        info!("Bridge connected on {}", settings.port);
        Ok(Self {
            port: settings.port,
            token,
            worker: Some(worker),
        })
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    /// Whether the worker has already exited (fatal error mid-stream).
    pub fn is_finished(&self) -> bool {
        self.worker
            .as_ref()
            .map(JoinHandle::is_finished)
            .unwrap_or(true)
    }

    /// Requests a cooperative stop and waits for the worker to exit.
    ///
    /// The worker observes the token within one read-timeout window, so
    /// this blocks for at most about a second.
    pub fn shutdown(mut self) {
        debug!("Shutting down bridge on {}", self.port);
        self.token.cancel();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Bridge worker for {} panicked before shutdown", self.port);
            }
        }
        info!("Bridge on {} shut down", self.port);
    }
}
