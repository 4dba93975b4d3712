//! Fixed-size Vial report framing.
//!
//! Every request and response is one 32-byte report:
//! - byte 0: the Vial prefix `0xFE` (requests only)
//! - byte 1: the settings sub-command
//! - bytes 2..: the payload, zero padded
//!
//! No partial reads leak to callers: [`ReportTransport`] always exchanges
//! whole reports.

pub mod codec;
pub mod error;
pub mod report;

pub use codec::{
    decode_request, encode_request, encode_response, Request, MAX_REQUEST_PAYLOAD, REPORT_SIZE,
};
pub use error::{FrameError, Result};
pub use report::{poll_report, read_report, write_report, ReportConfig, ReportTransport};
