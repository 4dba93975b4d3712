use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use qsettings_frame::{poll_report, write_report, FrameError};
use qsettings_schema::SchemaProjection;
use qsettings_sync::{Qsid, VirtualDevice};
use qsettings_transport::UnixDomainSocket;
use tracing::{debug, info};

use crate::cmd::{load_projection, ServeArgs};
use crate::exit::{frame_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};

/// How long accept and reads block before the stop flag is checked again.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run(args: ServeArgs) -> CliResult<i32> {
    let projection = load_projection(&args.schema)?;

    let supported = match &args.supported {
        Some(ids) => Some(parse_supported(ids, &projection)?),
        None => None,
    };
    let mut device = VirtualDevice::from_projection(&projection, |qsid| {
        supported.as_ref().map_or(true, |ids| ids.contains(&qsid))
    });
    for pair in &args.values {
        let (qsid, value) = parse_value(pair)?;
        if !device.set_value(qsid, value) {
            return Err(CliError::new(
                USAGE,
                format!("--value {pair}: qsid {qsid} is not served"),
            ));
        }
    }

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let listener = UnixDomainSocket::bind(&args.path)
        .map_err(|err| transport_error("bind failed", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| transport_error("listen failed", err))?;
    info!(path = %listener.path().display(), "virtual keyboard listening");

    while running.load(Ordering::SeqCst) {
        let mut stream = match listener.accept() {
            Ok(stream) => stream,
            Err(err) if err.is_timeout() => {
                thread::sleep(POLL_INTERVAL);
                continue;
            }
            Err(err) => return Err(transport_error("accept failed", err)),
        };
        stream
            .set_read_timeout(Some(POLL_INTERVAL))
            .map_err(|err| transport_error("stream setup failed", err))?;
        debug!("client connected");

        let mut answered = 0usize;
        while running.load(Ordering::SeqCst) {
            let report = match poll_report(&mut stream) {
                Ok(Some(report)) => report,
                Ok(None) => continue,
                Err(FrameError::ConnectionClosed) => break,
                Err(err) => return Err(frame_error("receive failed", err)),
            };
            let response = device.handle_report(&report);
            write_report(&mut stream, &response)
                .map_err(|err| frame_error("send failed", err))?;
            answered = answered.saturating_add(1);
        }
        debug!(answered, "client disconnected");

        if args.once {
            break;
        }
    }

    info!("virtual keyboard stopped");
    Ok(SUCCESS)
}

fn parse_supported(ids: &[u16], projection: &SchemaProjection) -> CliResult<BTreeSet<Qsid>> {
    ids.iter()
        .map(|raw| {
            let qsid = Qsid::new(*raw)
                .ok_or_else(|| CliError::new(USAGE, format!("--supported: invalid qsid {raw}")))?;
            if !projection.contains(qsid) {
                return Err(CliError::new(
                    USAGE,
                    format!("--supported: qsid {qsid} is not in the settings definition"),
                ));
            }
            Ok(qsid)
        })
        .collect()
}

fn parse_value(pair: &str) -> CliResult<(Qsid, u32)> {
    let invalid = || CliError::new(USAGE, format!("--value expects QSID=VALUE, got {pair:?}"));
    let (qsid, value) = pair.split_once('=').ok_or_else(invalid)?;
    let qsid = qsid
        .trim()
        .parse::<u16>()
        .ok()
        .and_then(Qsid::new)
        .ok_or_else(invalid)?;
    let value = value.trim().parse::<u32>().map_err(|_| invalid())?;
    Ok((qsid, value))
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

#[cfg(test)]
mod tests {
    use qsettings_schema::FieldWidth;

    use super::*;

    #[test]
    fn parse_value_pairs() {
        let (qsid, value) = parse_value("7=300").unwrap();
        assert_eq!(qsid.get(), 7);
        assert_eq!(value, 300);

        assert!(parse_value("7").is_err());
        assert!(parse_value("0=1").is_err());
        assert!(parse_value("65535=1").is_err());
        assert!(parse_value("7=-1").is_err());
    }

    fn projection() -> SchemaProjection {
        [1u16, 3, 7]
            .into_iter()
            .map(|raw| (Qsid::new(raw).unwrap(), FieldWidth::Byte))
            .collect()
    }

    #[test]
    fn parse_supported_rejects_reserved_ids() {
        let projection = projection();
        assert_eq!(parse_supported(&[3, 1, 3], &projection).unwrap().len(), 2);
        assert_eq!(parse_supported(&[0], &projection).unwrap_err().code, USAGE);
        assert_eq!(
            parse_supported(&[0xFFFF], &projection).unwrap_err().code,
            USAGE
        );
    }

    #[test]
    fn parse_supported_rejects_ids_outside_definition() {
        let err = parse_supported(&[1, 9], &projection()).unwrap_err();
        assert_eq!(err.code, USAGE);
        assert!(err.message.contains("qsid 9"));
    }
}
