//! Connection lifecycle for the serial-to-gamepad bridge.
//!
//! One worker thread per open connection:
//!
//! ```text
//! Serial port ──► FrameDecoder ──► InputMapper ──► VirtualWheelPad
//!                      │
//!                      └──[BridgeEvent]──► UI thread (mpsc)
//! ```
//!
//! The UI never touches the serial port or the gamepad; both are moved
//! into the worker at spawn time and dropped when it exits. Status flows
//! back exclusively through the [`BridgeEvent`] channel.

pub mod handle;
mod worker;

pub use handle::{BridgeError, BridgeHandle, BridgeSettings};

use chrono::{DateTime, Local};

/// Status message from the connection worker to the UI thread.
///
/// The UI drains these on its own schedule; the worker never blocks on a
/// full channel (a status event that cannot be delivered is logged and
/// dropped).
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    /// Serial port opened and the worker loop is running
    Connected { port: String },

    /// Worker terminated on a fatal error; no automatic reconnect
    Error {
        message: String,
        at: DateTime<Local>,
    },

    /// Worker observed the cancellation token and exited cleanly
    Disconnected { frames_discarded: u64 },
}
