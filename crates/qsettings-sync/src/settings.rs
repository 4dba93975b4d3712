use std::collections::BTreeMap;

use qsettings_schema::{FieldWidth, Qsid, SchemaProjection};
use qsettings_transport::{Command, Transport};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::codec::{decode_value, encode_get, encode_set};
use crate::config::ReadPolicy;
use crate::discovery::SupportedSet;
use crate::error::{Result, SyncError};

/// Current value of each setting, keyed by QSID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SettingsMap(BTreeMap<Qsid, u32>);

impl SettingsMap {
    pub fn get(&self, qsid: Qsid) -> Option<u32> {
        self.0.get(&qsid).copied()
    }

    pub fn contains(&self, qsid: Qsid) -> bool {
        self.0.contains_key(&qsid)
    }

    /// Store a value, returning the previous one.
    pub fn insert(&mut self, qsid: Qsid, value: u32) -> Option<u32> {
        self.0.insert(qsid, value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in ascending QSID order.
    pub fn iter(&self) -> impl Iterator<Item = (Qsid, u32)> + '_ {
        self.0.iter().map(|(qsid, value)| (*qsid, *value))
    }
}

/// A setting that could not be read during a best-effort pass.
#[derive(Debug)]
pub struct ReadFailure {
    pub qsid: Qsid,
    pub error: SyncError,
}

/// Result of a read pass.
#[derive(Debug, Default)]
pub struct ReadOutcome {
    pub settings: SettingsMap,
    /// Always empty under [`ReadPolicy::FailFast`].
    pub failures: Vec<ReadFailure>,
}

impl ReadOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fetch one setting.
pub fn read_one<T: Transport + ?Sized>(
    transport: &mut T,
    qsid: Qsid,
    width: FieldWidth,
) -> Result<u32> {
    let response = transport
        .request(Command::Get, &encode_get(qsid))
        .map_err(|source| SyncError::transport(Command::Get, source))?;
    let value = decode_value(width, &response)?;
    debug!(%qsid, %width, value, "read setting");
    Ok(value)
}

/// Fetch every setting that is both in `projection` and in `supported`.
///
/// QSIDs are visited in ascending order. Definition entries the device does
/// not support generate no request. Supported QSIDs missing from the
/// definition are skipped because their width is unknown.
pub fn read_all<T: Transport + ?Sized>(
    transport: &mut T,
    projection: &SchemaProjection,
    supported: &SupportedSet,
    policy: ReadPolicy,
) -> Result<ReadOutcome> {
    let mut outcome = ReadOutcome::default();

    for (qsid, width) in projection.iter() {
        if !supported.contains(qsid) {
            continue;
        }

        match read_one(transport, qsid, width) {
            Ok(value) => {
                outcome.settings.insert(qsid, value);
            }
            Err(source) => match policy {
                ReadPolicy::FailFast => {
                    return Err(SyncError::Read {
                        qsid,
                        source: Box::new(source),
                    });
                }
                ReadPolicy::BestEffort => {
                    warn!(%qsid, error = %source, "setting read failed; continuing");
                    outcome.failures.push(ReadFailure {
                        qsid,
                        error: source,
                    });
                }
            },
        }
    }

    for qsid in supported.iter().filter(|qsid| !projection.contains(*qsid)) {
        debug!(%qsid, "supported qsid missing from definition; skipped");
    }

    info!(
        read = outcome.settings.len(),
        failed = outcome.failures.len(),
        "settings read complete"
    );
    Ok(outcome)
}

/// Push one value to the device.
///
/// The value always travels as four bytes; the firmware narrows it to the
/// setting's own width. The response is not inspected.
pub fn write<T: Transport + ?Sized>(transport: &mut T, qsid: Qsid, value: u32) -> Result<()> {
    let payload = encode_set(qsid, value);
    debug!(%qsid, value, ?payload, "writing setting");
    transport
        .request(Command::Set, &payload)
        .map(|_| ())
        .map_err(|source| SyncError::Write {
            qsid,
            source: Box::new(SyncError::transport(Command::Set, source)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{timeout, ScriptedTransport};

    fn qsid(raw: u16) -> Qsid {
        Qsid::new(raw).unwrap()
    }

    fn projection(entries: &[(u16, FieldWidth)]) -> SchemaProjection {
        entries.iter().map(|(raw, w)| (qsid(*raw), *w)).collect()
    }

    fn supported(raw: &[u16]) -> SupportedSet {
        raw.iter().map(|r| qsid(*r)).collect()
    }

    #[test]
    fn only_supported_qsids_are_fetched() {
        let schema = projection(&[
            (1, FieldWidth::Byte),
            (2, FieldWidth::Byte),
            (3, FieldWidth::Short),
        ]);
        let mut transport = ScriptedTransport::new()
            .reply(vec![0x00, 0x05])
            .reply(vec![0x00, 0x34, 0x12]);

        let outcome = read_all(
            &mut transport,
            &schema,
            &supported(&[1, 3]),
            ReadPolicy::FailFast,
        )
        .unwrap();

        assert_eq!(transport.commands(), vec![Command::Get, Command::Get]);
        assert_eq!(transport.requests[0].1, vec![0x01, 0x00]);
        assert_eq!(transport.requests[1].1, vec![0x03, 0x00]);
        assert_eq!(outcome.settings.get(qsid(1)), Some(5));
        assert_eq!(outcome.settings.get(qsid(3)), Some(0x1234));
        assert!(!outcome.settings.contains(qsid(2)));
        assert!(outcome.is_complete());
    }

    #[test]
    fn supported_but_undefined_qsid_is_skipped() {
        let schema = projection(&[(1, FieldWidth::Long)]);
        let mut transport = ScriptedTransport::new().reply(vec![0xAA, 0x78, 0x56, 0x34, 0x12]);

        let outcome = read_all(
            &mut transport,
            &schema,
            &supported(&[1, 40]),
            ReadPolicy::FailFast,
        )
        .unwrap();

        assert_eq!(transport.requests.len(), 1);
        assert_eq!(outcome.settings.len(), 1);
        assert_eq!(outcome.settings.get(qsid(1)), Some(0x1234_5678));
    }

    #[test]
    fn fail_fast_stops_at_first_failure() {
        let schema = projection(&[
            (1, FieldWidth::Byte),
            (2, FieldWidth::Short),
            (3, FieldWidth::Byte),
        ]);
        let mut transport = ScriptedTransport::new()
            .reply(vec![0x00, 0x01])
            .reply(vec![0x00, 0x01])
            .reply(vec![0x00, 0x03]);

        let err = read_all(
            &mut transport,
            &schema,
            &supported(&[1, 2, 3]),
            ReadPolicy::FailFast,
        )
        .unwrap_err();

        let SyncError::Read { qsid: failed, .. } = &err else {
            panic!("expected read error, got {err:?}");
        };
        assert_eq!(failed.get(), 2);
        assert!(matches!(err.root(), SyncError::Protocol { .. }));
        assert_eq!(transport.requests.len(), 2);
    }

    #[test]
    fn best_effort_collects_failures_and_keeps_going() {
        let schema = projection(&[
            (1, FieldWidth::Byte),
            (2, FieldWidth::Short),
            (3, FieldWidth::Byte),
        ]);
        let mut transport = ScriptedTransport::new()
            .reply(vec![0x00, 0x01])
            .fail(timeout())
            .reply(vec![0x00, 0x03]);

        let outcome = read_all(
            &mut transport,
            &schema,
            &supported(&[1, 2, 3]),
            ReadPolicy::BestEffort,
        )
        .unwrap();

        assert_eq!(transport.requests.len(), 3);
        assert_eq!(outcome.settings.get(qsid(1)), Some(1));
        assert_eq!(outcome.settings.get(qsid(3)), Some(3));
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].qsid, qsid(2));
        assert!(outcome.failures[0].error.is_timeout());
        assert!(!outcome.is_complete());
    }

    #[test]
    fn decoded_values_never_exceed_width() {
        let schema = projection(&[(1, FieldWidth::Byte), (2, FieldWidth::Short)]);
        let mut transport = ScriptedTransport::new()
            .reply(vec![0x00, 0xFF, 0xFF, 0xFF, 0xFF])
            .reply(vec![0x00, 0xFF, 0xFF, 0xFF, 0xFF]);

        let outcome = read_all(
            &mut transport,
            &schema,
            &supported(&[1, 2]),
            ReadPolicy::FailFast,
        )
        .unwrap();

        for (qsid, value) in outcome.settings.iter() {
            let width = schema.width(qsid).unwrap();
            assert!(value <= width.max_value());
        }
    }

    #[test]
    fn write_emits_six_byte_payload() {
        let mut transport = ScriptedTransport::new().reply(vec![0x00]);
        write(&mut transport, qsid(300), 42).unwrap();
        assert_eq!(
            transport.requests,
            vec![(Command::Set, vec![0x2C, 0x01, 0x2A, 0x00, 0x00, 0x00])]
        );
    }

    #[test]
    fn write_failure_surfaces_without_retry() {
        let mut transport = ScriptedTransport::new().fail(timeout());
        let err = write(&mut transport, qsid(5), 1).unwrap_err();

        assert!(matches!(err, SyncError::Write { .. }));
        assert!(err.is_timeout());
        assert_eq!(transport.requests.len(), 1);
    }

    #[test]
    fn settings_map_serializes_as_object() {
        let mut map = SettingsMap::default();
        map.insert(qsid(2), 10);
        map.insert(qsid(1), 300);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"1":300,"2":10}"#);
    }
}
