//! QMK settings synchronization over the Vial protocol.
//!
//! The host side of the settings exchange:
//! - [`discover`] pages through the device's supported QSIDs until the
//!   `0xFFFF` terminator,
//! - [`read_all`] fetches and decodes the value of every supported QSID the
//!   settings definition knows,
//! - [`write`] pushes one value back.
//!
//! [`Session`] ties the three together for one connected device.

pub mod codec;
pub mod config;
pub mod device;
pub mod discovery;
pub mod error;
pub mod session;
pub mod settings;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{DiscoveryConfig, ReadPolicy, SessionConfig, DEFAULT_PAGE_SIZE};
pub use device::VirtualDevice;
pub use discovery::{discover, SupportedSet};
pub use error::{Result, SyncError};
pub use qsettings_schema::{FieldWidth, Qsid, SchemaProjection};
pub use session::{RefreshSummary, Session};
pub use settings::{read_all, read_one, write, ReadFailure, ReadOutcome, SettingsMap};
