//! `SAURON_UART_V1` binary frame codec.
//!
//! One frame is 8 bytes:
//! `0xAA | version | count1 | count2 | count3 | count4 | checksum | 0x55`
//! where the checksum is the sum of the four count bytes modulo 256.
//! Counts are taken as raw unsigned bytes; this path applies no clamp,
//! unlike the legacy text protocol.
use crate::{ChannelCounts, CHANNEL_COUNT};

pub const FRAME_LEN: usize = 8;
pub const FRAME_START: u8 = 0xAA;
pub const FRAME_END: u8 = 0x55;
pub const FRAME_VERSION: u8 = 0x01;

/// Why a candidate frame was rejected.
///
/// Everything except [`FrameError::NotAFrame`] is a structural error: the
/// start sentinel was present, so the demultiplexer resynchronizes by
/// dropping a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    Truncated,
    NotAFrame,
    BadEnd(u8),
    BadVersion(u8),
    BadChecksum { expected: u8, got: u8 },
}

fn checksum(counts: &ChannelCounts) -> u8 {
    counts
        .iter()
        .fold(0u8, |sum, &count| sum.wrapping_add(count))
}

/// Validates and decodes one frame into per-channel counts.
pub fn decode(frame: &[u8]) -> Result<ChannelCounts, FrameError> {
    if frame.len() < FRAME_LEN {
        return Err(FrameError::Truncated);
    }
    if frame[0] != FRAME_START {
        return Err(FrameError::NotAFrame);
    }
    if frame[7] != FRAME_END {
        return Err(FrameError::BadEnd(frame[7]));
    }
    if frame[1] != FRAME_VERSION {
        return Err(FrameError::BadVersion(frame[1]));
    }

    let mut counts: ChannelCounts = [0; CHANNEL_COUNT];
    counts.copy_from_slice(&frame[2..6]);

    let expected = checksum(&counts);
    if frame[6] != expected {
        return Err(FrameError::BadChecksum {
            expected,
            got: frame[6],
        });
    }
    Ok(counts)
}

/// Builds the frame the controller sends for `counts`.
///
/// This is the same layout the host-side sender produces; the firmware
/// itself only decodes, but tests and host tooling use it to stay in
/// sync with [`decode`].
pub fn encode(counts: &ChannelCounts) -> [u8; FRAME_LEN] {
    [
        FRAME_START,
        FRAME_VERSION,
        counts[0],
        counts[1],
        counts[2],
        counts[3],
        checksum(counts),
        FRAME_END,
    ]
}
