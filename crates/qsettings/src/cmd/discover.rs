use qsettings_sync::discover;

use crate::cmd::DiscoverArgs;
use crate::exit::{sync_error, CliResult, SUCCESS};
use crate::output::{print_supported, OutputFormat};

pub fn run(args: DiscoverArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.device.session_config(Default::default())?;
    let mut transport = args.device.connect()?;

    let supported = discover(&mut transport, &config.discovery)
        .map_err(|err| sync_error("discovery failed", err))?;

    print_supported(&supported, format);
    Ok(SUCCESS)
}
