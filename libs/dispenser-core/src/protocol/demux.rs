//! Message demultiplexer over the byte accumulator.
//!
//! Inspects the head of the buffer to decide between binary-frame and
//! text-line mode, extracts at most one complete message per call, and
//! resynchronizes on malformed input. Liveness invariant: every loop
//! iteration either consumes at least one byte, yields one message, or
//! returns to wait for more input.
use log::{debug, warn};

use crate::protocol::accumulator::RxAccumulator;
use crate::protocol::ack::Protocol;
use crate::protocol::frame::{self, FRAME_LEN, FRAME_START};
use crate::protocol::line::{self, ChannelNames, LineOutcome};
use crate::ChannelCounts;

/// One complete inbound message that requires handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    Dispense {
        counts: ChannelCounts,
        protocol: Protocol,
    },
    /// A complete line arrived but did not parse; owes a `bad_json` ack.
    BadJson,
}

fn plausible_line_start(byte: u8) -> bool {
    matches!(byte, b'{' | b' ' | b'\t' | b'\r')
}

/// Extracts the next complete message, or `None` to wait for more bytes.
///
/// Structural frame errors (start sentinel present but version, checksum
/// or end sentinel wrong) drop exactly one byte and rescan, so a
/// corrupted stream always regains alignment. Bytes that can neither
/// start a frame nor a JSON line are dropped one at a time to keep noise
/// from pinning the buffer.
pub fn next_message<const N: usize>(
    rx: &mut RxAccumulator<N>,
    names: &ChannelNames,
) -> Option<Message> {
    loop {
        let buf = rx.as_slice();
        if buf.is_empty() {
            return None;
        }

        // Binary mode: the head byte is a frame start sentinel.
        if buf[0] == FRAME_START {
            if buf.len() < FRAME_LEN {
                return None;
            }
            match frame::decode(&buf[..FRAME_LEN]) {
                Ok(counts) => {
                    rx.consume(FRAME_LEN);
                    return Some(Message::Dispense {
                        counts,
                        protocol: Protocol::FrameV1,
                    });
                }
                Err(e) => {
                    warn!("bad frame ({e:?}), dropping one byte to resync");
                    rx.consume(1);
                    continue;
                }
            }
        }

        // Text mode: wait for a complete line.
        match buf.iter().position(|&b| b == b'\n') {
            Some(end) => {
                // Copy the candidate out and consume it (plus the
                // newline) before decoding, so decoding can never
                // re-enter with stale buffer state.
                let mut candidate: heapless::Vec<u8, N> = heapless::Vec::new();
                let _ = candidate.extend_from_slice(&buf[..end]);
                rx.consume(end + 1);

                match line::decode(&candidate, names) {
                    LineOutcome::Blank => continue,
                    LineOutcome::Counts(counts) => {
                        return Some(Message::Dispense {
                            counts,
                            protocol: Protocol::JsonLine,
                        });
                    }
                    LineOutcome::BadJson => return Some(Message::BadJson),
                }
            }
            None => {
                if !plausible_line_start(buf[0]) {
                    debug!("dropping noise byte {:#04x}", buf[0]);
                    rx.consume(1);
                    continue;
                }
                return None;
            }
        }
    }
}
