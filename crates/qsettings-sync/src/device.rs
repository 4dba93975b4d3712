//! In-process model of the firmware side of the settings protocol.

use std::collections::BTreeMap;

use bytes::{Bytes, BytesMut};
use qsettings_frame::{decode_request, encode_request, Request, REPORT_SIZE};
use qsettings_schema::{FieldWidth, Qsid, SchemaProjection};
use qsettings_transport::{Command, Transport, TransportError};
use tracing::{debug, trace};

use crate::config::DEFAULT_PAGE_SIZE;

/// Answer sent for anything the device does not understand.
const REJECTED: [u8; REPORT_SIZE] = [0xFF; REPORT_SIZE];

/// A keyboard that implements a fixed set of settings.
///
/// QUERY offsets index into the ascending list of supported QSIDs; each
/// answer holds up to 16 ids followed by `0xFFFF` padding.
///
/// Answered requests are only kept after [`VirtualDevice::recording`].
#[derive(Debug, Clone, Default)]
pub struct VirtualDevice {
    settings: BTreeMap<Qsid, (FieldWidth, u32)>,
    requests: Option<Vec<Request>>,
}

impl VirtualDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a supported setting with its initial value.
    pub fn with_setting(mut self, qsid: Qsid, width: FieldWidth, value: u32) -> Self {
        self.settings.insert(qsid, (width, width.truncate(value)));
        self
    }

    /// Support every QSID in `projection` accepted by `filter`, all zero.
    pub fn from_projection(
        projection: &SchemaProjection,
        mut filter: impl FnMut(Qsid) -> bool,
    ) -> Self {
        let settings = projection
            .iter()
            .filter(|(qsid, _)| filter(*qsid))
            .map(|(qsid, width)| (qsid, (width, 0)))
            .collect();
        Self {
            settings,
            requests: None,
        }
    }

    /// Keep every answered request for [`VirtualDevice::requests`].
    pub fn recording(mut self) -> Self {
        self.requests.get_or_insert_with(Vec::new);
        self
    }

    /// Overwrite a stored value, narrowed to the setting's width.
    ///
    /// Returns false if the QSID is not supported.
    pub fn set_value(&mut self, qsid: Qsid, value: u32) -> bool {
        match self.settings.get_mut(&qsid) {
            Some((width, stored)) => {
                *stored = width.truncate(value);
                true
            }
            None => false,
        }
    }

    /// Current stored value.
    pub fn value(&self, qsid: Qsid) -> Option<u32> {
        self.settings.get(&qsid).map(|(_, value)| *value)
    }

    /// Requests answered since recording started, oldest first.
    pub fn requests(&self) -> &[Request] {
        self.requests.as_deref().unwrap_or_default()
    }

    /// Answer one raw request report.
    pub fn handle_report(&mut self, report: &[u8]) -> [u8; REPORT_SIZE] {
        let request = match decode_request(report) {
            Ok(request) => request,
            Err(err) => {
                debug!(error = %err, "rejecting malformed report");
                return REJECTED;
            }
        };

        let response = match request.command {
            Command::Query => self.answer_query(&request.payload),
            Command::Get => self.answer_get(&request.payload),
            Command::Set => self.answer_set(&request.payload),
        };
        trace!(command = %request.command, "answered request");
        if let Some(requests) = &mut self.requests {
            requests.push(request);
        }
        response
    }

    fn answer_query(&self, payload: &[u8]) -> [u8; REPORT_SIZE] {
        let offset = usize::from(u16::from_le_bytes([payload[0], payload[1]]));
        let mut response = REJECTED;
        for (slot, qsid) in self
            .settings
            .keys()
            .skip(offset)
            .take(usize::from(DEFAULT_PAGE_SIZE))
            .enumerate()
        {
            response[slot * 2..slot * 2 + 2].copy_from_slice(&qsid.to_le_bytes());
        }
        response
    }

    fn answer_get(&self, payload: &[u8]) -> [u8; REPORT_SIZE] {
        let Some((width, value)) = self.lookup(payload) else {
            return REJECTED;
        };
        let mut response = [0u8; REPORT_SIZE];
        let bytes = width.bytes();
        response[1..1 + bytes].copy_from_slice(&value.to_le_bytes()[..bytes]);
        response
    }

    fn answer_set(&mut self, payload: &[u8]) -> [u8; REPORT_SIZE] {
        let Some(qsid) = Qsid::new(u16::from_le_bytes([payload[0], payload[1]])) else {
            return REJECTED;
        };
        let value = u32::from_le_bytes([payload[2], payload[3], payload[4], payload[5]]);
        if !self.set_value(qsid, value) {
            return REJECTED;
        }
        debug!(%qsid, value, "setting stored");
        [0u8; REPORT_SIZE]
    }

    fn lookup(&self, payload: &[u8]) -> Option<(FieldWidth, u32)> {
        let qsid = Qsid::new(u16::from_le_bytes([payload[0], payload[1]]))?;
        self.settings.get(&qsid).copied()
    }
}

impl Transport for VirtualDevice {
    fn request(
        &mut self,
        command: Command,
        payload: &[u8],
    ) -> qsettings_transport::Result<Bytes> {
        let mut report = BytesMut::with_capacity(REPORT_SIZE);
        encode_request(command, payload, &mut report).map_err(TransportError::from)?;
        Ok(Bytes::copy_from_slice(&self.handle_report(&report)))
    }
}
