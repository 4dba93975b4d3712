use qsettings_transport::TransportError;

/// Errors that can occur while framing reports.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The request does not start with the Vial prefix.
    #[error("invalid report prefix 0x{0:02X} (expected 0xFE)")]
    InvalidPrefix(u8),

    /// The sub-command byte is not a settings command.
    #[error("unknown settings sub-command 0x{0:02X}")]
    UnknownCommand(u8),

    /// The payload does not fit in one report.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The report has the wrong length.
    #[error("report length {len} (expected {expected})")]
    BadLength { len: usize, expected: usize },

    /// An I/O error occurred while exchanging reports.
    #[error("report I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream closed before a complete report was received.
    #[error("connection closed (incomplete report)")]
    ConnectionClosed,
}

impl From<FrameError> for TransportError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Io(io) => TransportError::Io(io),
            FrameError::ConnectionClosed => TransportError::Shutdown,
            other => TransportError::Framing(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
