//! Virtual keyboard example: serves settings on a socket and syncs them
//! through a session on the same process.
//!
//! Run with:
//!   cargo run -p qsettings --example virtual-keyboard

use std::fs;
use std::thread;

use qsettings::frame::{read_report, write_report, FrameError, ReportTransport};
use qsettings::schema::SettingsDefinition;
use qsettings::sync::{FieldWidth, Qsid, Session, SessionConfig, VirtualDevice};
use qsettings::transport::UnixDomainSocket;

const DEFINITION: &str = r#"{
    "tabs": [
        {
            "name": "Grave Escape",
            "fields": [
                { "type": "boolean", "title": "Always send Escape if Alt is pressed", "qsid": 1, "bit": 0 }
            ]
        },
        {
            "name": "Tap-Hold",
            "fields": [
                { "type": "integer", "title": "Tapping Term", "qsid": 7, "min": 0, "max": 10000, "width": 2 },
                { "type": "integer", "title": "Mouse key delay", "qsid": 9, "width": 4 }
            ]
        }
    ]
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sock_dir = std::env::temp_dir().join(format!("qsettings-kb-{}", std::process::id()));
    fs::create_dir_all(&sock_dir)?;
    let sock_path = sock_dir.join("keyboard.sock");

    let projection = SettingsDefinition::from_json_str(DEFINITION)?.projection()?;
    let tapping_term = Qsid::new(7).ok_or("invalid qsid")?;

    let mut device = VirtualDevice::from_projection(&projection, |_| true)
        .with_setting(tapping_term, FieldWidth::Short, 200)
        .recording();
    let listener = UnixDomainSocket::bind(&sock_path)?;

    let server = thread::spawn(
        move || -> Result<VirtualDevice, Box<dyn std::error::Error + Send + Sync>> {
            let mut stream = listener.accept()?;
            loop {
                let report = match read_report(&mut stream) {
                    Ok(report) => report,
                    Err(FrameError::ConnectionClosed) => return Ok(device),
                    Err(err) => return Err(err.into()),
                };
                write_report(&mut stream, &device.handle_report(&report))?;
            }
        },
    );

    let transport = ReportTransport::new(UnixDomainSocket::connect(&sock_path)?);
    let mut session = Session::new(transport, projection, SessionConfig::default());

    let summary = session.refresh()?;
    eprintln!("supported: {}, read: {}", summary.supported, summary.read);
    for (qsid, value) in session.settings().iter() {
        eprintln!("  qsid {qsid} = {value}");
    }

    session.set(tapping_term, 175)?;
    eprintln!("tapping term now {:?}", session.get(tapping_term));

    // Dropping the session closes the stream and ends the server loop.
    drop(session);
    let device = server
        .join()
        .map_err(|_| "server thread panicked")?
        .map_err(|err| err.to_string())?;
    eprintln!(
        "device saw {} requests, tapping term stored as {:?}",
        device.requests().len(),
        device.value(tapping_term)
    );

    let _ = fs::remove_dir_all(&sock_dir);
    Ok(())
}
