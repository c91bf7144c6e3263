//! The decode-and-map loop that runs on the connection worker thread.

use std::io::Read;

use chrono::Local;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::gamepad::GamepadSink;
use crate::mapping::InputMapper;
use crate::protocol::FrameDecoder;

use super::BridgeEvent;

/// Runs until a fatal source/sink error or until the token is cancelled.
///
/// The token is checked before every read; since each decoder step blocks
/// for at most one read-timeout window, a requested disconnect takes
/// effect within that bound. Samples are applied strictly in arrival
/// order, one at a time.
pub(crate) fn run<R, S>(
    mut decoder: FrameDecoder<R>,
    mut mapper: InputMapper<S>,
    token: CancellationToken,
    events: mpsc::Sender<BridgeEvent>,
) where
    R: Read,
    S: GamepadSink,
{
    info!("Bridge worker started");

    while !token.is_cancelled() {
        match decoder.poll_sample() {
            Ok(Some(sample)) => {
                if let Err(e) = mapper.apply(sample) {
                    error!("Gamepad update failed: {}", e);
                    send_event(
                        &events,
                        BridgeEvent::Error {
                            message: format!("Gamepad update failed: {}", e),
                            at: Local::now(),
                        },
                    );
                    return;
                }
            }
            // Timeout, noise byte, or discarded malformed frame
            Ok(None) => {}
            Err(e) => {
                error!("Serial stream failed: {}", e);
                send_event(
                    &events,
                    BridgeEvent::Error {
                        message: format!("Serial stream failed: {}", e),
                        at: Local::now(),
                    },
                );
                return;
            }
        }
    }

    info!(
        "Bridge worker stopping (discarded {} malformed frames)",
        decoder.malformed_frames()
    );
    send_event(
        &events,
        BridgeEvent::Disconnected {
            frames_discarded: decoder.malformed_frames(),
        },
    );
}

fn send_event(events: &mpsc::Sender<BridgeEvent>, event: BridgeEvent) {
    if let Err(e) = events.try_send(event) {
        warn!("Dropping bridge status event: {}", e);
    }
}
