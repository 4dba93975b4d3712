use qsettings_sync::{Qsid, Session, SyncError};
use tracing::info;

use crate::cmd::{load_projection, SetArgs};
use crate::exit::{sync_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_settings, OutputFormat, SettingsOutput};

pub fn run(args: SetArgs, format: OutputFormat) -> CliResult<i32> {
    let qsid = Qsid::new(args.qsid)
        .ok_or_else(|| CliError::new(USAGE, format!("--qsid must be 1..=65534, got {}", args.qsid)))?;
    let config = args.device.session_config(Default::default())?;
    let projection = load_projection(&args.schema)?;
    if !projection.contains(qsid) {
        return Err(sync_error("set failed", SyncError::UnknownQsid(qsid.get())));
    }
    let transport = args.device.connect()?;

    let mut session = Session::new(transport, projection, config);
    session
        .refresh()
        .map_err(|err| sync_error("read failed", err))?;

    let previous = session.get(qsid);
    session
        .set(qsid, args.value)
        .map_err(|err| sync_error("set failed", err))?;
    info!(%qsid, ?previous, value = args.value, "setting written");

    let mut changed = qsettings_sync::SettingsMap::default();
    changed.insert(qsid, args.value);
    let out = SettingsOutput::new(session.supported(), &changed, session.projection(), &[]);
    print_settings(&out, format);

    Ok(SUCCESS)
}
