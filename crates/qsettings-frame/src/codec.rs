use bytes::{BufMut, Bytes, BytesMut};
use qsettings_transport::command::VIAL_PREFIX;
use qsettings_transport::Command;

use crate::error::{FrameError, Result};

/// Size of every request and response report.
pub const REPORT_SIZE: usize = 32;

/// Prefix (1) + sub-command (1).
const REQUEST_HEADER: usize = 2;

/// Largest payload a single request can carry.
pub const MAX_REQUEST_PAYLOAD: usize = REPORT_SIZE - REQUEST_HEADER;

/// A request as seen by the device side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub command: Command,
    /// Payload bytes including trailing padding.
    pub payload: Bytes,
}

/// Encode a request report.
///
/// Wire format:
/// ```text
/// ┌────────────┬─────────────┬──────────────────────┬───────────┐
/// │ Prefix     │ Sub-command │ Payload              │ Padding   │
/// │ 0xFE       │ (1B)        │ (≤ 30B)              │ 0x00 …    │
/// └────────────┴─────────────┴──────────────────────┴───────────┘
/// ```
pub fn encode_request(command: Command, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_REQUEST_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_REQUEST_PAYLOAD,
        });
    }
    dst.reserve(REPORT_SIZE);
    dst.put_u8(VIAL_PREFIX);
    dst.put_u8(command.id());
    dst.put_slice(payload);
    dst.put_bytes(0, MAX_REQUEST_PAYLOAD - payload.len());
    Ok(())
}

/// Decode a request report received by a device.
pub fn decode_request(report: &[u8]) -> Result<Request> {
    if report.len() != REPORT_SIZE {
        return Err(FrameError::BadLength {
            len: report.len(),
            expected: REPORT_SIZE,
        });
    }
    if report[0] != VIAL_PREFIX {
        return Err(FrameError::InvalidPrefix(report[0]));
    }
    let command = Command::from_id(report[1]).ok_or(FrameError::UnknownCommand(report[1]))?;

    Ok(Request {
        command,
        payload: Bytes::copy_from_slice(&report[REQUEST_HEADER..]),
    })
}

/// Encode a response report, zero padding `data` to the report size.
pub fn encode_response(data: &[u8], dst: &mut BytesMut) -> Result<()> {
    if data.len() > REPORT_SIZE {
        return Err(FrameError::PayloadTooLarge {
            size: data.len(),
            max: REPORT_SIZE,
        });
    }
    dst.reserve(REPORT_SIZE);
    dst.put_slice(data);
    dst.put_bytes(0, REPORT_SIZE - data.len());
    Ok(())
}
