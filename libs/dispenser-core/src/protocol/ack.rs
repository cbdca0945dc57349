//! Acknowledgment line sent back to the controller.
//!
//! One JSON object per parsed command, success or not, so the host never
//! waits indefinitely:
//! `{"status":"done","protocol":"SAURON_UART_V1","counts":[2,0,1,0]}\n`
use heapless::String;
use serde::Serialize;

use crate::ChannelCounts;

/// Longest encoded ack fits comfortably; `bad_json` with four
/// three-digit counts is under 70 bytes.
pub const ACK_MAX_LEN: usize = 96;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Done,
    BadJson,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Done => "done",
            Status::BadJson => "bad_json",
        }
    }
}

/// Which inbound wire format carried the command being acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    FrameV1,
    JsonLine,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::FrameV1 => "SAURON_UART_V1",
            Protocol::JsonLine => "json_line",
        }
    }
}

#[derive(Serialize)]
struct AckBody<'a> {
    status: &'a str,
    protocol: &'a str,
    counts: ChannelCounts,
}

/// Renders one newline-terminated acknowledgment.
pub fn encode(
    status: Status,
    protocol: Protocol,
    counts: &ChannelCounts,
) -> Result<String<ACK_MAX_LEN>, serde_json_core::ser::Error> {
    let body = AckBody {
        status: status.as_str(),
        protocol: protocol.as_str(),
        counts: *counts,
    };
    let mut out: String<ACK_MAX_LEN> = serde_json_core::to_string(&body)?;
    out.push('\n')
        .map_err(|_| serde_json_core::ser::Error::BufferFull)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn done_ack_for_binary_frame() {
        let ack = encode(Status::Done, Protocol::FrameV1, &[2, 0, 1, 0]).unwrap();
        assert_eq!(
            ack.as_str(),
            "{\"status\":\"done\",\"protocol\":\"SAURON_UART_V1\",\"counts\":[2,0,1,0]}\n"
        );
    }

    #[test]
    fn bad_json_ack_carries_zero_counts() {
        let ack = encode(Status::BadJson, Protocol::JsonLine, &[0, 0, 0, 0]).unwrap();
        assert_eq!(
            ack.as_str(),
            "{\"status\":\"bad_json\",\"protocol\":\"json_line\",\"counts\":[0,0,0,0]}\n"
        );
    }

    #[test]
    fn widest_counts_still_fit() {
        let ack = encode(Status::Done, Protocol::FrameV1, &[255, 255, 255, 255]).unwrap();
        assert!(ack.ends_with('\n'));
    }
}
