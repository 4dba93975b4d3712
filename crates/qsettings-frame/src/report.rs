use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use qsettings_transport::{Command, DeviceStream, Transport, TransportError};
use tracing::trace;

use crate::codec::{encode_request, REPORT_SIZE};
use crate::error::{FrameError, Result};

/// Timeouts applied to a device stream.
#[derive(Debug, Clone, Default)]
pub struct ReportConfig {
    /// Read timeout for one response report.
    pub read_timeout: Option<Duration>,
    /// Write timeout for one request report.
    pub write_timeout: Option<Duration>,
}

/// Exchanges whole reports with a device over any `Read + Write` stream.
pub struct ReportTransport<S> {
    stream: S,
    buf: BytesMut,
}

impl<S: Read + Write> ReportTransport<S> {
    /// Wrap a connected stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buf: BytesMut::with_capacity(REPORT_SIZE),
        }
    }

    /// Send one request report and read back one response report.
    pub fn exchange(&mut self, command: Command, payload: &[u8]) -> Result<Bytes> {
        self.buf.clear();
        encode_request(command, payload, &mut self.buf)?;
        write_report(&mut self.stream, &self.buf)?;

        let response = read_report(&mut self.stream)?;
        trace!(%command, "report exchanged");
        Ok(Bytes::copy_from_slice(&response))
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }
}

impl ReportTransport<DeviceStream> {
    /// Wrap a device stream and apply the configured timeouts.
    pub fn with_config(
        stream: DeviceStream,
        config: &ReportConfig,
    ) -> qsettings_transport::Result<Self> {
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;
        Ok(Self::new(stream))
    }
}

impl<S: Read + Write> Transport for ReportTransport<S> {
    fn request(&mut self, command: Command, payload: &[u8]) -> qsettings_transport::Result<Bytes> {
        self.exchange(command, payload).map_err(TransportError::from)
    }
}

/// Read exactly one report.
///
/// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached first.
pub fn read_report<R: Read>(reader: &mut R) -> Result<[u8; REPORT_SIZE]> {
    let mut report = [0u8; REPORT_SIZE];
    let mut filled = 0usize;
    while filled < REPORT_SIZE {
        match reader.read(&mut report[filled..]) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(report)
}

/// Read one report, or `None` when the stream's read timeout expires
/// before its first byte.
///
/// A timeout after part of a report has arrived is an error.
pub fn poll_report<R: Read>(reader: &mut R) -> Result<Option<[u8; REPORT_SIZE]>> {
    let mut report = [0u8; REPORT_SIZE];
    let mut filled = 0usize;
    while filled < REPORT_SIZE {
        match reader.read(&mut report[filled..]) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if filled == 0 && is_idle(&err) => return Ok(None),
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(Some(report))
}

fn is_idle(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

/// Write one complete report and flush.
pub fn write_report<W: Write>(writer: &mut W, report: &[u8]) -> Result<()> {
    if report.len() != REPORT_SIZE {
        return Err(FrameError::BadLength {
            len: report.len(),
            expected: REPORT_SIZE,
        });
    }

    let mut offset = 0usize;
    while offset < report.len() {
        match writer.write(&report[offset..]) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => offset += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }

    loop {
        match writer.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}
