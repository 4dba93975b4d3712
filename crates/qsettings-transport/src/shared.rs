use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tracing::trace;

use crate::command::Command;
use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// A device transport that can be shared across threads.
///
/// Each request holds the lock for its whole round trip, so at most one
/// request is ever in flight to the device.
pub struct SharedTransport<T> {
    inner: Arc<Mutex<T>>,
}

impl<T: Transport> SharedTransport<T> {
    /// Take ownership of a transport.
    pub fn new(transport: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(transport)),
        }
    }

    /// Run `f` with exclusive access to the device.
    ///
    /// Use this to issue several requests back to back without another
    /// holder interleaving.
    pub fn with_exclusive<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| TransportError::LockPoisoned)?;
        Ok(f(&mut guard))
    }
}

impl<T> Clone for SharedTransport<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> Transport for SharedTransport<T> {
    fn request(&mut self, command: Command, payload: &[u8]) -> Result<Bytes> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| TransportError::LockPoisoned)?;
        trace!(%command, len = payload.len(), "device lock acquired");
        guard.request(command, payload)
    }
}

impl<T> std::fmt::Debug for SharedTransport<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedTransport")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}
