use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("qsettings {}", env!("CARGO_PKG_VERSION"));
    if args.extended {
        println!(
            "target: {}",
            option_env!("QSETTINGS_BUILD_TARGET").unwrap_or("unknown")
        );
        println!("os: {} ({})", std::env::consts::OS, std::env::consts::ARCH);
        println!("protocol: vial qmk-settings (report size {})", qsettings_frame::REPORT_SIZE);
    }
    Ok(SUCCESS)
}
