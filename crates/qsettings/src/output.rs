use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use qsettings_sync::{FieldWidth, ReadFailure, SchemaProjection, SettingsMap, SupportedSet};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct SupportedOutput {
    supported: Vec<u16>,
    count: usize,
}

#[derive(Serialize)]
pub struct SettingRow {
    pub qsid: u16,
    pub width: Option<FieldWidth>,
    pub value: u32,
}

#[derive(Serialize)]
pub struct FailureRow {
    pub qsid: u16,
    pub error: String,
}

#[derive(Serialize)]
pub struct SettingsOutput {
    pub supported: usize,
    pub settings: Vec<SettingRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureRow>,
}

impl SettingsOutput {
    pub fn new(
        supported: &SupportedSet,
        settings: &SettingsMap,
        projection: &SchemaProjection,
        failures: &[ReadFailure],
    ) -> Self {
        Self {
            supported: supported.len(),
            settings: settings
                .iter()
                .map(|(qsid, value)| SettingRow {
                    qsid: qsid.get(),
                    width: projection.width(qsid),
                    value,
                })
                .collect(),
            failures: failures
                .iter()
                .map(|failure| FailureRow {
                    qsid: failure.qsid.get(),
                    error: failure.error.to_string(),
                })
                .collect(),
        }
    }
}

pub fn print_supported(supported: &SupportedSet, format: OutputFormat) {
    let ids: Vec<u16> = supported.iter().map(|qsid| qsid.get()).collect();
    match format {
        OutputFormat::Json => {
            let out = SupportedOutput {
                count: ids.len(),
                supported: ids,
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["QSID"]);
            for id in &ids {
                table.add_row(vec![id.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let joined: Vec<String> = ids.iter().map(u16::to_string).collect();
            println!("supported ({}): {}", ids.len(), joined.join(", "));
        }
    }
}

pub fn print_settings(out: &SettingsOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = new_table(vec!["QSID", "WIDTH", "VALUE", "HEX"]);
            for row in &out.settings {
                table.add_row(vec![
                    row.qsid.to_string(),
                    width_label(row.width),
                    row.value.to_string(),
                    format!("0x{:X}", row.value),
                ]);
            }
            println!("{table}");
            print_failures_pretty(&out.failures);
        }
        OutputFormat::Pretty => {
            for row in &out.settings {
                println!(
                    "qsid={} width={} value={}",
                    row.qsid,
                    width_label(row.width),
                    row.value
                );
            }
            print_failures_pretty(&out.failures);
        }
    }
}

fn print_failures_pretty(failures: &[FailureRow]) {
    for failure in failures {
        println!("qsid={} error={}", failure.qsid, failure.error);
    }
}

fn width_label(width: Option<FieldWidth>) -> String {
    width.map_or_else(|| "?".to_string(), |w| w.to_string())
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}
