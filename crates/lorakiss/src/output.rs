use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use lorakiss_ax25::LinkFrame;
use lorakiss_frame::{command::command_name, KissFrame};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
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
struct DecodedOutput<'a> {
    port: u8,
    command: &'a str,
    source: String,
    destination: String,
    via: Vec<String>,
    control: String,
    pid: Option<String>,
    data_type: Option<&'a str>,
    payload: String,
    path: String,
}

impl<'a> DecodedOutput<'a> {
    fn new(kiss: &'a KissFrame, link: &LinkFrame) -> Self {
        Self {
            port: kiss.port,
            command: command_name(kiss.command),
            source: link.source.to_string(),
            destination: link.destination.to_string(),
            via: link.digipeaters.iter().map(ToString::to_string).collect(),
            control: format!("0x{:02X}", link.control),
            pid: link.pid.map(|pid| format!("0x{pid:02X}")),
            data_type: link.data_type().map(|data_type| data_type.name()),
            payload: payload_preview(&link.payload),
            path: payload_preview(&link.to_path_notation()),
        }
    }
}

/// Print a KISS frame and the link frame it carries.
pub fn print_decoded(kiss: &KissFrame, link: &LinkFrame, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = DecodedOutput::new(kiss, link);
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let out = DecodedOutput::new(kiss, link);
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            let pid = out.pid.clone().unwrap_or_else(|| "-".to_string());
            let data_type = out.data_type.unwrap_or("-").to_string();
            for (field, value) in [
                ("port", out.port.to_string()),
                ("command", out.command.to_string()),
                ("from", out.source),
                ("to", out.destination),
                ("via", out.via.join(",")),
                ("control", out.control),
                ("pid", pid),
                ("type", data_type),
                ("payload", out.payload),
            ] {
                table.add_row(vec![field.to_string(), value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "port={} from={} to={} via={} pid={:?} size={} payload={}",
                kiss.port,
                link.source,
                link.destination,
                link.via(),
                link.pid,
                link.payload.len(),
                payload_preview(&link.payload)
            );
        }
        OutputFormat::Raw => {
            let mut line = link.to_path_notation().to_vec();
            line.push(b'\n');
            print_raw(&line);
        }
    }
}

#[derive(Serialize)]
struct EncodedOutput<'a> {
    path: &'a str,
    ax25: String,
    kiss: String,
    size: usize,
}

/// Print an encoded KISS frame alongside the AX.25 frame inside it.
pub fn print_encoded(path: &str, ax25: &[u8], wire: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EncodedOutput {
                path,
                ax25: hex::encode(ax25),
                kiss: hex::encode(wire),
                size: wire.len(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PATH", "SIZE", "KISS"])
                .add_row(vec![
                    path.to_string(),
                    wire.len().to_string(),
                    hex::encode(wire),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", hex::encode(wire)),
        OutputFormat::Raw => print_raw(wire),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn payload_preview(payload: &[u8]) -> String {
    String::from_utf8_lossy(payload).into_owned()
}
