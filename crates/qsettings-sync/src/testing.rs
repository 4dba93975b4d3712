//! Test transports.

use std::collections::VecDeque;

use bytes::Bytes;
use qsettings_transport::{Command, Result, Transport, TransportError};

/// Replies from a queue and records every request.
///
/// An exhausted queue answers with a closed-stream error.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: VecDeque<Result<Vec<u8>>>,
    pub requests: Vec<(Command, Vec<u8>)>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, response: Vec<u8>) -> Self {
        self.replies.push_back(Ok(response));
        self
    }

    pub fn fail(mut self, err: TransportError) -> Self {
        self.replies.push_back(Err(err));
        self
    }

    pub fn commands(&self) -> Vec<Command> {
        self.requests.iter().map(|(command, _)| *command).collect()
    }
}

impl Transport for ScriptedTransport {
    fn request(&mut self, command: Command, payload: &[u8]) -> Result<Bytes> {
        self.requests.push((command, payload.to_vec()));
        match self.replies.pop_front() {
            Some(Ok(response)) => Ok(Bytes::from(response)),
            Some(Err(err)) => Err(err),
            None => Err(TransportError::Shutdown),
        }
    }
}

/// Encode u16 values as a QUERY response.
pub(crate) fn page(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub(crate) fn timeout() -> TransportError {
    TransportError::Io(std::io::Error::new(
        std::io::ErrorKind::TimedOut,
        "device did not answer",
    ))
}
