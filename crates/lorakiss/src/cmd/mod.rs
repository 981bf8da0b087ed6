use clap::{Args, Subcommand};
use std::path::PathBuf;

use lorakiss_ax25::Dialect;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the TNC: KISS server on TCP, radio simulated over UDP.
    Serve(ServeArgs),
    /// Decode a hex KISS frame and print the AX.25 frame it carries.
    Decode(DecodeArgs),
    /// Encode a path-notation packet into a hex KISS frame.
    Encode(EncodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args),
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// KISS server listen address.
    #[arg(long, env = "LORAKISS_BIND", default_value = "0.0.0.0:10001")]
    pub bind: String,
    /// Bridge configuration file (JSON). Flags below override it.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Radio-side dialect.
    #[arg(long, value_enum)]
    pub dialect: Option<DialectArg>,
    /// Do not append signal reports to received packets.
    #[arg(long)]
    pub no_signal_report: bool,
    /// Transmit queue poll interval (e.g. 500ms, 1s).
    #[arg(long)]
    pub poll_interval: Option<String>,
    /// UDP address the simulated radio receives packets on.
    #[arg(long, env = "LORAKISS_RADIO_BIND", default_value = "127.0.0.1:10002")]
    pub radio_bind: String,
    /// UDP address the simulated radio transmits packets to.
    #[arg(long, env = "LORAKISS_RADIO_PEER", default_value = "127.0.0.1:10003")]
    pub radio_peer: String,
    /// RSSI reported for simulated receptions (dBm).
    #[arg(long, default_value_t = -100, allow_hyphen_values = true)]
    pub rx_rssi: i32,
    /// SNR reported for simulated receptions (dB).
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub rx_snr: f32,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// KISS frame as hex (`c000...c0`); spaces and colons are ignored.
    /// Input without the leading FEND is read as a bare AX.25 frame.
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Packet in path notation, e.g. `N0CALL>APRS,WIDE1-1:!4725.51N/00939.86E[`.
    pub path: String,
    /// Append a signal report with this RSSI (dBm).
    #[arg(long, allow_hyphen_values = true)]
    pub rssi: Option<i32>,
    /// SNR for the signal report (dB).
    #[arg(long, allow_hyphen_values = true, requires = "rssi")]
    pub snr: Option<f32>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum DialectArg {
    Binary,
    Path,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Binary => Dialect::Binary,
            DialectArg::Path => Dialect::PathNotation,
        }
    }
}
