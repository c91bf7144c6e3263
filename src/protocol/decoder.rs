//! Streaming frame decoder for the serial byte stream.
//!
//! The controller emits fixed 4-byte frames with no checksum or length
//! prefix, so the only way back into lockstep after noise or a dropped
//! byte is to scan for the sync marker:
//!
//! ```text
//! byte stream ──► scan for 0xFF ──► read 3-byte payload ──► RawSample
//!                     ▲                    │
//!                     └── short read / bad control id ─────┘
//! ```
//!
//! Timeouts are part of normal operation (the pedals only transmit on
//! change), so an empty read simply yields control back to the caller.

use std::io::{self, Read};

use tracing::{trace, warn};

use super::frame::{decode_payload, RawSample, PAYLOAD_LEN, SYNC_BYTE};

/// Pull-based decoder over a byte-oriented source with a read timeout.
///
/// Stateless between frames apart from the discarded-frame counter; the
/// sync-scan cursor lives in the source stream itself.
#[derive(Debug)]
pub struct FrameDecoder<R> {
    source: R,
    malformed_frames: u64,
}

impl<R: Read> FrameDecoder<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            malformed_frames: 0,
        }
    }

    /// Frames discarded so far (truncated payloads and unknown control ids).
    pub fn malformed_frames(&self) -> u64 {
        self.malformed_frames
    }

    /// Advances the scan by one bounded step.
    ///
    /// Returns `Ok(Some(sample))` when a well-formed frame was decoded,
    /// `Ok(None)` when the step consumed noise, timed out, or discarded a
    /// malformed frame. Each step blocks for at most one read-timeout
    /// window, which is what makes a cancellation check between calls
    /// effective.
    ///
    /// # Errors
    ///
    /// Propagates connection-level I/O failures (anything other than a
    /// timeout). These are fatal to the stream; the caller is expected to
    /// tear the connection down.
    pub fn poll_sample(&mut self) -> Result<Option<RawSample>, io::Error> {
        let mut sync = [0u8; 1];
        match self.source.read(&mut sync) {
            // Empty read: timeout with nothing buffered, keep scanning
            Ok(0) => return Ok(None),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(None),
            Err(e) if is_timeout(&e) => return Ok(None),
            Err(e) => return Err(e),
        }

        if sync[0] != SYNC_BYTE {
            trace!("Skipping noise byte 0x{:02X}", sync[0]);
            return Ok(None);
        }

        let mut payload = [0u8; PAYLOAD_LEN];
        if !self.read_payload(&mut payload)? {
            self.malformed_frames += 1;
            warn!(
                "Discarding truncated frame (total discarded: {})",
                self.malformed_frames
            );
            return Ok(None);
        }

        match decode_payload(&payload) {
            Ok(sample) => {
                trace!("Decoded frame: {:?}", sample);
                Ok(Some(sample))
            }
            Err(e) => {
                self.malformed_frames += 1;
                warn!(
                    "Discarding invalid frame: {} (total discarded: {})",
                    e, self.malformed_frames
                );
                Ok(None)
            }
        }
    }

    /// Fills `buf` from the source. Returns `Ok(false)` if the stream went
    /// quiet before the payload completed, in which case the partial frame
    /// is dropped and the sync scan resumes.
    fn read_payload(&mut self, buf: &mut [u8; PAYLOAD_LEN]) -> Result<bool, io::Error> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.source.read(&mut buf[filled..]) {
                Ok(0) => return Ok(false),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if is_timeout(&e) => return Ok(false),
                Err(e) => return Err(e),
            }
        }
        Ok(true)
    }
}

// serialport surfaces expired read timeouts as TimedOut; non-blocking
// sources report WouldBlock for the same condition
fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::frame::ControlId;
    use std::io::Cursor;

    // Drives the decoder until a sample appears or the step budget runs out.
    fn collect_samples<R: Read>(decoder: &mut FrameDecoder<R>, max_steps: usize) -> Vec<RawSample> {
        let mut samples = Vec::new();
        for _ in 0..max_steps {
            if let Some(sample) = decoder.poll_sample().unwrap() {
                samples.push(sample);
            }
        }
        samples
    }

    /// Byte source that delivers data in bursts with a quiet (empty) read
    /// between them, the way a serial port behaves between transmissions.
    struct BurstSource {
        bursts: std::collections::VecDeque<Vec<u8>>,
        pos: usize,
    }

    impl BurstSource {
        fn new(bursts: Vec<Vec<u8>>) -> Self {
            Self {
                bursts: bursts.into(),
                pos: 0,
            }
        }
    }

    impl Read for BurstSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let burst_len = match self.bursts.front() {
                None => return Ok(0),
                Some(burst) => burst.len(),
            };
            if self.pos >= burst_len {
                self.bursts.pop_front();
                self.pos = 0;
                return Ok(0);
            }
            let burst = &self.bursts[0];
            let n = buf.len().min(burst.len() - self.pos);
            buf[..n].copy_from_slice(&burst[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_decodes_clean_frame() {
        let stream = Cursor::new(vec![0xFF, 0x01, 0x40, 0x01]);
        let mut decoder = FrameDecoder::new(stream);

        let samples = collect_samples(&mut decoder, 4);
        assert_eq!(
            samples,
            vec![RawSample {
                control: ControlId::Throttle,
                value: 0x0140,
            }]
        );
        assert_eq!(decoder.malformed_frames(), 0);
    }

    #[test]
    fn test_skips_noise_before_sync() {
        let stream = Cursor::new(vec![0x12, 0x34, 0x00, 0xFF, 0x00, 0x58, 0x02]);
        let mut decoder = FrameDecoder::new(stream);

        let samples = collect_samples(&mut decoder, 10);
        assert_eq!(
            samples,
            vec![RawSample {
                control: ControlId::Steering,
                value: 600,
            }]
        );
    }

    #[test]
    fn test_truncated_frame_discarded_without_corrupting_next() {
        // Sync followed by only one payload byte, then the line goes quiet
        // before the frame completes; the next burst carries a full frame.
        let source = BurstSource::new(vec![
            vec![0xFF, 0x01],
            vec![0xFF, 0x03, 0x00, 0x00],
        ]);
        let mut decoder = FrameDecoder::new(source);

        let samples = collect_samples(&mut decoder, 10);
        assert_eq!(
            samples,
            vec![RawSample {
                control: ControlId::Upshift,
                value: 1,
            }]
        );
        assert_eq!(decoder.malformed_frames(), 1);
    }

    #[test]
    fn test_unknown_control_discarded() {
        let stream = Cursor::new(vec![0xFF, 0x09, 0x01, 0x00, 0xFF, 0x04, 0x00, 0x00]);
        let mut decoder = FrameDecoder::new(stream);

        let samples = collect_samples(&mut decoder, 10);
        assert_eq!(
            samples,
            vec![RawSample {
                control: ControlId::Downshift,
                value: 1,
            }]
        );
        assert_eq!(decoder.malformed_frames(), 1);
    }

    #[test]
    fn test_timeout_is_not_fatal() {
        struct TimeoutSource;
        impl Read for TimeoutSource {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out"))
            }
        }

        let mut decoder = FrameDecoder::new(TimeoutSource);
        for _ in 0..3 {
            assert!(decoder.poll_sample().unwrap().is_none());
        }
    }

    #[test]
    fn test_fatal_io_error_propagates() {
        struct BrokenSource;
        impl Read for BrokenSource {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"))
            }
        }

        let mut decoder = FrameDecoder::new(BrokenSource);
        let err = decoder.poll_sample().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_back_to_back_frames() {
        let stream = Cursor::new(vec![
            0xFF, 0x01, 0xFF, 0x0F, // throttle 4095
            0xFF, 0x02, 0x07, 0x00, // brake 7
            0xFF, 0x00, 0x00, 0x00, // steering 0
        ]);
        let mut decoder = FrameDecoder::new(stream);

        let samples = collect_samples(&mut decoder, 16);
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].control, ControlId::Throttle);
        assert_eq!(samples[0].value, 4095);
        assert_eq!(samples[1].control, ControlId::Brake);
        assert_eq!(samples[1].value, 7);
        assert_eq!(samples[2].control, ControlId::Steering);
        assert_eq!(samples[2].value, 0);
    }
}
