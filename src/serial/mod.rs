//! Serial port collaborators: opening the controller link and enumerating
//! candidate ports for the UI.

use std::time::Duration;

use serialport::SerialPort;
use thiserror::Error;
use tracing::{info, warn};

/// Line rate the controller firmware transmits at.
pub const BAUD_RATE: u32 = 115_200;

/// Read timeout bounding every blocking read in the decode loop. A timeout
/// is not an error, it is the cadence at which the worker re-checks its
/// cancellation token.
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

// Open-time failures; the connection attempt aborts and no worker starts
#[derive(Debug, Error)]
pub enum SerialOpenError {
    #[error("Failed to open serial port: {0}")]
    Open(#[from] serialport::Error),
}

/// Opens the controller port with the bridge's fixed line settings.
pub fn open_port(name: &str) -> Result<Box<dyn SerialPort>, SerialOpenError> {
    info!("Opening serial port {} at {} baud", name, BAUD_RATE);
    let port = serialport::new(name, BAUD_RATE)
        .timeout(READ_TIMEOUT)
        .open()?;
    Ok(port)
}

/// Names of the serial ports currently present on the host, sorted for a
/// stable dropdown. Enumeration failure is logged and reported as an
/// empty list.
pub fn list_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => {
            let mut names: Vec<String> = ports.into_iter().map(|p| p.port_name).collect();
            names.sort();
            names
        }
        Err(e) => {
            warn!("Failed to enumerate serial ports: {}", e);
            Vec::new()
        }
    }
}
