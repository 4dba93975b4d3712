use std::io::{Read, Write};

use bytes::Bytes;

use crate::command::Command;
use crate::error::Result;

/// One request/response round trip to a device.
///
/// The protocol has no request ids: a response always belongs to the most
/// recent request. Implementations must therefore complete one exchange
/// before accepting the next, and callers sharing a device across threads
/// go through [`crate::SharedTransport`].
pub trait Transport {
    /// Send `command` with `payload` and return the raw response bytes.
    ///
    /// Blocks until the response arrives or the underlying stream times out.
    fn request(&mut self, command: Command, payload: &[u8]) -> Result<Bytes>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn request(&mut self, command: Command, payload: &[u8]) -> Result<Bytes> {
        (**self).request(command, payload)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn request(&mut self, command: Command, payload: &[u8]) -> Result<Bytes> {
        (**self).request(command, payload)
    }
}

/// A connected device stream. Implements `Read` and `Write`.
///
/// On Unix, this wraps a Unix domain socket stream to a device bridge.
pub struct DeviceStream {
    inner: DeviceStreamInner,
}

enum DeviceStreamInner {
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

impl Read for DeviceStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            DeviceStreamInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for DeviceStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            DeviceStreamInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            #[cfg(unix)]
            DeviceStreamInner::Unix(stream) => stream.flush(),
        }
    }
}

impl DeviceStream {
    /// Create a DeviceStream from a Unix domain socket stream.
    #[cfg(unix)]
    pub fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: DeviceStreamInner::Unix(stream),
        }
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        match &self.inner {
            #[cfg(unix)]
            DeviceStreamInner::Unix(stream) => {
                stream.set_read_timeout(timeout).map_err(Into::into)
            }
        }
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        match &self.inner {
            #[cfg(unix)]
            DeviceStreamInner::Unix(stream) => {
                stream.set_write_timeout(timeout).map_err(Into::into)
            }
        }
    }
}

impl std::fmt::Debug for DeviceStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            #[cfg(unix)]
            DeviceStreamInner::Unix(_) => f
                .debug_struct("DeviceStream")
                .field("type", &"unix")
                .finish(),
        }
    }
}
