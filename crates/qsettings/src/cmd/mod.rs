use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Subcommand};
use qsettings_frame::{ReportConfig, ReportTransport};
use qsettings_schema::{SchemaProjection, SettingsDefinition};
use qsettings_sync::{DiscoveryConfig, ReadPolicy, SessionConfig, DEFAULT_PAGE_SIZE};
use qsettings_transport::{DeviceStream, UnixDomainSocket};

use crate::exit::{schema_error, transport_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod discover;
pub mod dump;
pub mod serve;
pub mod set;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the QSIDs the device supports.
    Discover(DiscoverArgs),
    /// Read every supported setting.
    Dump(DumpArgs),
    /// Write one setting.
    Set(SetArgs),
    /// Run a virtual keyboard on a socket.
    Serve(ServeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Discover(args) => discover::run(args, format),
        Command::Dump(args) => dump::run(args, format),
        Command::Set(args) => set::run(args, format),
        Command::Serve(args) => serve::run(args),
        Command::Version(args) => version::run(args),
    }
}

/// Options shared by every command that talks to a device.
#[derive(Args, Debug)]
pub struct DeviceArgs {
    /// Device bridge socket path.
    pub path: PathBuf,
    /// Per-report timeout (e.g. 2s, 500ms).
    #[arg(long, default_value = "2s")]
    pub timeout: String,
    /// Discovery cursor step.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u16,
}

#[derive(Args, Debug)]
pub struct DiscoverArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// Settings definition (qmk_settings.json).
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,
    /// Keep reading after a setting fails and report failures at the end.
    #[arg(long)]
    pub best_effort: bool,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// Settings definition (qmk_settings.json).
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,
    /// Setting to change.
    #[arg(long)]
    pub qsid: u16,
    /// New value.
    #[arg(long)]
    pub value: u32,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Socket path to bind.
    pub path: PathBuf,
    /// Settings definition (qmk_settings.json).
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,
    /// Supported QSIDs (comma-separated). Default: every QSID in the definition.
    #[arg(long, value_delimiter = ',')]
    pub supported: Option<Vec<u16>>,
    /// Initial value, as QSID=VALUE. Repeatable.
    #[arg(long = "value", value_name = "QSID=VALUE")]
    pub values: Vec<String>,
    /// Exit after the first client disconnects.
    #[arg(long)]
    pub once: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

impl DeviceArgs {
    pub fn session_config(&self, read_policy: ReadPolicy) -> CliResult<SessionConfig> {
        if self.page_size == 0 {
            return Err(CliError::new(USAGE, "--page-size must be greater than zero"));
        }
        Ok(SessionConfig {
            discovery: DiscoveryConfig {
                page_size: self.page_size,
            },
            read_policy,
        })
    }

    pub fn connect(&self) -> CliResult<ReportTransport<DeviceStream>> {
        let timeout = parse_duration(&self.timeout)?;
        let stream = UnixDomainSocket::connect(&self.path)
            .map_err(|err| transport_error("connect failed", err))?;
        let config = ReportConfig {
            read_timeout: Some(timeout),
            write_timeout: Some(timeout),
        };
        ReportTransport::with_config(stream, &config)
            .map_err(|err| transport_error("stream setup failed", err))
    }
}

pub fn load_projection(path: &Path) -> CliResult<SchemaProjection> {
    SettingsDefinition::from_path(path)
        .and_then(|definition| definition.projection())
        .map_err(|err| schema_error("settings definition", err))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
