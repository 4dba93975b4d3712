//! Request/response transport abstraction for talking to a keyboard.
//!
//! Provides the single primitive every higher layer builds on:
//! send one command with a payload, get one raw response back.
//!
//! - [`Transport`] is the request/response contract.
//! - [`SharedTransport`] serializes requests to one device behind a lock.
//! - [`DeviceStream`] and [`UnixDomainSocket`] reach a device (or a device
//!   bridge) over a local stream.
//!
//! This is the lowest layer of qsettings.

pub mod command;
pub mod error;
pub mod shared;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use command::Command;
pub use error::{Result, TransportError};
pub use shared::SharedTransport;
pub use traits::{DeviceStream, Transport};

#[cfg(unix)]
pub use uds::UnixDomainSocket;
