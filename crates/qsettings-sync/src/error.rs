use qsettings_schema::{Qsid, SchemaError};
use qsettings_transport::{Command, TransportError};

/// Errors that can occur while synchronizing settings.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The round trip itself failed (I/O, timeout, closed stream).
    #[error("{command} round trip failed: {source}")]
    Transport {
        command: Command,
        source: TransportError,
    },

    /// The device answered with something the protocol does not allow.
    #[error("malformed {command} response: {message}")]
    Protocol { command: Command, message: String },

    /// The QSID is not in the settings definition, or not yet known to the
    /// session.
    #[error("unknown qsid {0}")]
    UnknownQsid(u16),

    /// The QSID is known but the device does not implement it.
    #[error("qsid {0} is not supported by the device")]
    Unsupported(Qsid),

    /// The value does not fit the setting's width.
    #[error("value {value} out of range for qsid {qsid} (max {max})")]
    ValueOutOfRange { qsid: Qsid, value: u32, max: u32 },

    /// Discovery aborted; nothing gathered so far is kept.
    #[error("discovery failed at offset {offset}: {source}")]
    Discovery {
        offset: u16,
        source: Box<SyncError>,
    },

    /// Reading one setting failed.
    #[error("reading qsid {qsid} failed: {source}")]
    Read { qsid: Qsid, source: Box<SyncError> },

    /// Writing one setting failed.
    #[error("writing qsid {qsid} failed: {source}")]
    Write { qsid: Qsid, source: Box<SyncError> },

    /// The configuration cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The settings definition could not be projected.
    #[error("settings definition error: {0}")]
    Schema(#[from] SchemaError),
}

impl SyncError {
    pub(crate) fn transport(command: Command, source: TransportError) -> Self {
        Self::Transport { command, source }
    }

    pub(crate) fn protocol(command: Command, message: impl Into<String>) -> Self {
        Self::Protocol {
            command,
            message: message.into(),
        }
    }

    /// The innermost error, skipping discovery/read/write context wrappers.
    pub fn root(&self) -> &SyncError {
        match self {
            Self::Discovery { source, .. }
            | Self::Read { source, .. }
            | Self::Write { source, .. } => source.root(),
            other => other,
        }
    }

    /// True when the root cause is a stream timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), Self::Transport { source, .. } if source.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
