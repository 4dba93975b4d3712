//! Payload encoding and response decoding for the settings commands.
//!
//! All multi-byte quantities are little-endian. These functions never touch
//! a transport; [`crate::discovery`] and [`crate::settings`] drive the round
//! trips.

use qsettings_schema::{FieldWidth, Qsid};
use qsettings_transport::Command;

use crate::error::{Result, SyncError};

/// Leading byte of every GET response that carries no value.
pub const DISCARD_BYTES: usize = 1;

/// QUERY payload: the page offset.
pub fn encode_query(offset: u16) -> [u8; 2] {
    offset.to_le_bytes()
}

/// Split a QUERY response into its u16 values, in wire order.
pub fn decode_query_page(response: &[u8]) -> Result<Vec<u16>> {
    if response.len() % 2 != 0 {
        return Err(SyncError::protocol(
            Command::Query,
            format!("odd response length {}", response.len()),
        ));
    }
    Ok(response
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// GET payload: the QSID.
pub fn encode_get(qsid: Qsid) -> [u8; 2] {
    qsid.to_le_bytes()
}

/// Decode a GET response for a setting of `width`.
///
/// The first byte is skipped; the value follows. Bytes past the value are
/// report padding and ignored.
pub fn decode_value(width: FieldWidth, response: &[u8]) -> Result<u32> {
    let needed = DISCARD_BYTES + width.bytes();
    let Some(value) = response.get(DISCARD_BYTES..needed) else {
        return Err(SyncError::protocol(
            Command::Get,
            format!(
                "{} bytes, need {needed} for a {width} value",
                response.len()
            ),
        ));
    };

    Ok(match width {
        FieldWidth::Byte => u32::from(value[0]),
        FieldWidth::Short => u32::from(u16::from_le_bytes([value[0], value[1]])),
        FieldWidth::Long => u32::from_le_bytes([value[0], value[1], value[2], value[3]]),
    })
}

/// SET payload: QSID then the value as four bytes, whatever the width.
pub fn encode_set(qsid: Qsid, value: u32) -> [u8; 6] {
    let [q0, q1] = qsid.to_le_bytes();
    let [v0, v1, v2, v3] = value.to_le_bytes();
    [q0, q1, v0, v1, v2, v3]
}
