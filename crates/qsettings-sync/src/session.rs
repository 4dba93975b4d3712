use qsettings_schema::{Qsid, SchemaProjection};
use qsettings_transport::{SharedTransport, Transport};
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::discovery::{discover, SupportedSet};
use crate::error::{Result, SyncError};
use crate::settings::{read_all, read_one, write, ReadFailure, SettingsMap};

/// What a [`Session::refresh`] found.
#[derive(Debug)]
pub struct RefreshSummary {
    pub supported: usize,
    pub read: usize,
    /// Only populated under [`crate::ReadPolicy::BestEffort`].
    pub failures: Vec<ReadFailure>,
}

/// Settings state for one connected device.
///
/// Requests go through a [`SharedTransport`], so other holders of the same
/// device handle never interleave with a round trip made here. The settings
/// map is owned by the session and only changes between round trips.
pub struct Session<T> {
    transport: SharedTransport<T>,
    projection: SchemaProjection,
    config: SessionConfig,
    supported: SupportedSet,
    settings: SettingsMap,
}

impl<T: Transport> Session<T> {
    /// Start a session that owns `transport`.
    pub fn new(transport: T, projection: SchemaProjection, config: SessionConfig) -> Self {
        Self::with_shared(SharedTransport::new(transport), projection, config)
    }

    /// Start a session on an already shared device handle.
    pub fn with_shared(
        transport: SharedTransport<T>,
        projection: SchemaProjection,
        config: SessionConfig,
    ) -> Self {
        Self {
            transport,
            projection,
            config,
            supported: SupportedSet::default(),
            settings: SettingsMap::default(),
        }
    }

    /// Discover supported settings, then read all of them.
    ///
    /// Supported set and settings are replaced only when the pass succeeds;
    /// on error the previous state is left untouched.
    pub fn refresh(&mut self) -> Result<RefreshSummary> {
        let supported = discover(&mut self.transport, &self.config.discovery)?;
        let outcome = read_all(
            &mut self.transport,
            &self.projection,
            &supported,
            self.config.read_policy,
        )?;

        let summary = RefreshSummary {
            supported: supported.len(),
            read: outcome.settings.len(),
            failures: outcome.failures,
        };
        self.supported = supported;
        self.settings = outcome.settings;

        info!(
            supported = summary.supported,
            read = summary.read,
            failed = summary.failures.len(),
            "session refreshed"
        );
        Ok(summary)
    }

    /// Re-read one supported setting.
    pub fn reload(&mut self, qsid: Qsid) -> Result<u32> {
        let width = self
            .projection
            .width(qsid)
            .ok_or(SyncError::UnknownQsid(qsid.get()))?;
        if !self.supported.contains(qsid) {
            return Err(SyncError::Unsupported(qsid));
        }

        let value = read_one(&mut self.transport, qsid, width).map_err(|source| {
            SyncError::Read {
                qsid,
                source: Box::new(source),
            }
        })?;
        self.settings.insert(qsid, value);
        Ok(value)
    }

    /// Change one setting and push it to the device.
    ///
    /// The local value is updated before the device is asked; if the write
    /// fails the map keeps the new value and [`Session::reload`] restores
    /// the device's view.
    pub fn set(&mut self, qsid: Qsid, value: u32) -> Result<()> {
        let width = self
            .projection
            .width(qsid)
            .ok_or(SyncError::UnknownQsid(qsid.get()))?;
        if !self.settings.contains(qsid) {
            return Err(SyncError::UnknownQsid(qsid.get()));
        }
        if value > width.max_value() {
            return Err(SyncError::ValueOutOfRange {
                qsid,
                value,
                max: width.max_value(),
            });
        }

        let previous = self.settings.insert(qsid, value);
        debug!(%qsid, ?previous, value, "setting updated locally");
        write(&mut self.transport, qsid, value)
    }

    /// Re-send the value currently held for `qsid`.
    pub fn push(&mut self, qsid: Qsid) -> Result<()> {
        let value = self
            .settings
            .get(qsid)
            .ok_or(SyncError::UnknownQsid(qsid.get()))?;
        write(&mut self.transport, qsid, value)
    }

    /// Current value of one setting.
    pub fn get(&self, qsid: Qsid) -> Option<u32> {
        self.settings.get(qsid)
    }

    pub fn settings(&self) -> &SettingsMap {
        &self.settings
    }

    pub fn supported(&self) -> &SupportedSet {
        &self.supported
    }

    pub fn projection(&self) -> &SchemaProjection {
        &self.projection
    }

    /// Another handle to the device this session talks to.
    pub fn transport(&self) -> SharedTransport<T> {
        self.transport.clone()
    }
}
