use std::collections::BTreeSet;

use qsettings_schema::Qsid;
use qsettings_transport::{Command, Transport};
use serde::Serialize;
use tracing::{debug, info};

use crate::codec::{decode_query_page, encode_query};
use crate::config::DiscoveryConfig;
use crate::error::{Result, SyncError};

/// QSIDs the connected device implements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SupportedSet(BTreeSet<Qsid>);

impl SupportedSet {
    pub fn contains(&self, qsid: Qsid) -> bool {
        self.0.contains(&qsid)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Supported QSIDs, ascending.
    pub fn iter(&self) -> impl Iterator<Item = Qsid> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Qsid> for SupportedSet {
    fn from_iter<I: IntoIterator<Item = Qsid>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Scanning,
    Done,
}

/// Page through the device's supported QSIDs.
///
/// Each QUERY carries the cursor offset; the response is scanned in order
/// until the first `0xFFFF`, which ends the whole scan. Without a terminator
/// the cursor advances by `config.page_size` and the next page is fetched.
///
/// A page holding fewer than `page_size` ids and no terminator would leave
/// a gap before the next cursor, so it fails the scan.
///
/// All or nothing: any failing page discards what was gathered and returns
/// [`SyncError::Discovery`] naming the offset.
pub fn discover<T: Transport + ?Sized>(
    transport: &mut T,
    config: &DiscoveryConfig,
) -> Result<SupportedSet> {
    if config.page_size == 0 {
        return Err(SyncError::InvalidConfig(
            "discovery page size must be non-zero".to_string(),
        ));
    }

    let mut supported = SupportedSet::default();
    let mut offset = 0u16;
    let mut pages = 0usize;
    let mut state = ScanState::Scanning;

    while state == ScanState::Scanning {
        let scanned = scan_page(transport, offset, config.page_size, &mut supported);
        state = scanned.map_err(|source| SyncError::Discovery {
            offset,
            source: Box::new(source),
        })?;
        pages += 1;

        if state == ScanState::Scanning {
            offset = offset.checked_add(config.page_size).ok_or_else(|| {
                SyncError::Discovery {
                    offset,
                    source: Box::new(SyncError::protocol(
                        Command::Query,
                        "QSID list ran past 0xFFFF without a terminator",
                    )),
                }
            })?;
        }
    }

    info!(supported = supported.len(), pages, "discovery complete");
    Ok(supported)
}

fn scan_page<T: Transport + ?Sized>(
    transport: &mut T,
    offset: u16,
    page_size: u16,
    supported: &mut SupportedSet,
) -> Result<ScanState> {
    let response = transport
        .request(Command::Query, &encode_query(offset))
        .map_err(|source| SyncError::transport(Command::Query, source))?;
    let values = decode_query_page(&response)?;
    debug!(offset, values = values.len(), "discovery page");

    if values.is_empty() {
        return Err(SyncError::protocol(
            Command::Query,
            "empty page without a terminator",
        ));
    }

    let count = values.len();
    for raw in values {
        if raw == Qsid::SENTINEL {
            return Ok(ScanState::Done);
        }
        let qsid = Qsid::new(raw)
            .ok_or_else(|| SyncError::protocol(Command::Query, format!("invalid qsid {raw}")))?;
        supported.0.insert(qsid);
    }

    if count < usize::from(page_size) {
        return Err(SyncError::protocol(
            Command::Query,
            format!("{count} ids and no terminator in a page of {page_size}"),
        ));
    }

    Ok(ScanState::Scanning)
}
