use qsettings_sync::{ReadPolicy, Session};

use crate::cmd::{load_projection, DumpArgs};
use crate::exit::{sync_error, CliResult, FAILURE, SUCCESS};
use crate::output::{print_settings, OutputFormat, SettingsOutput};

pub fn run(args: DumpArgs, format: OutputFormat) -> CliResult<i32> {
    let policy = if args.best_effort {
        ReadPolicy::BestEffort
    } else {
        ReadPolicy::FailFast
    };
    let config = args.device.session_config(policy)?;
    let projection = load_projection(&args.schema)?;
    let transport = args.device.connect()?;

    let mut session = Session::new(transport, projection, config);
    let summary = session
        .refresh()
        .map_err(|err| sync_error("read failed", err))?;

    let out = SettingsOutput::new(
        session.supported(),
        session.settings(),
        session.projection(),
        &summary.failures,
    );
    print_settings(&out, format);

    // Best-effort still signals an incomplete read through the exit code.
    if summary.failures.is_empty() {
        Ok(SUCCESS)
    } else {
        Ok(FAILURE)
    }
}
