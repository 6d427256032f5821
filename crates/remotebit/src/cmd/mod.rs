use clap::{Args, Subcommand};
use std::path::PathBuf;

use bytes::BytesMut;
use remotebit::frame::{encode_buffer, encode_values, parse_component, ComponentId};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode a frame and print it.
    Encode(EncodeArgs),
    /// Decode a hex frame the way a receiver would.
    Decode(DecodeArgs),
    /// Connect to a listening device and send one frame.
    Send(SendArgs),
    /// Act as the device: listen and print handler invocations.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Component tag and id addressed by a frame.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Component name (speed, distance, button, joystick) or tag number.
    #[arg(long, short = 'c', value_parser = component_arg)]
    pub component: u8,
    /// Component id (0-15).
    #[arg(long, short = 'i', default_value = "0", value_parser = id_arg)]
    pub id: ComponentId,
}

/// Frame payload: values or raw bytes.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct PayloadArgs {
    /// 16-bit values (comma-separated). Larger numbers wrap.
    #[arg(long, value_delimiter = ',')]
    pub values: Option<Vec<u32>>,
    /// Raw bytes (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub bytes: Option<Vec<u8>>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame bytes as hex (e.g. 6400 2c01).
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Socket path of the listening device.
    #[arg(env = "REMOTEBIT_SOCKET")]
    pub path: PathBuf,
    #[command(flatten)]
    pub target: TargetArgs,
    #[command(flatten)]
    pub payload: PayloadArgs,
    /// Transmit power to apply before sending (0-7).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=7))]
    pub power: Option<u8>,
    /// How long to keep retrying the connection (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub connect_timeout: String,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Socket path to bind.
    #[arg(env = "REMOTEBIT_SOCKET")]
    pub path: PathBuf,
    /// Components to register handlers for (comma-separated).
    /// Default: button,joystick.
    #[arg(long, value_delimiter = ',', value_parser = component_arg)]
    pub components: Option<Vec<u8>>,
    /// Ids to register handlers for (comma-separated). Default: all 16.
    #[arg(long, value_delimiter = ',', value_parser = id_arg)]
    pub ids: Option<Vec<ComponentId>>,
    /// Exit after N handler invocations.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn component_arg(s: &str) -> Result<u8, String> {
    parse_component(s).map_err(|err| err.to_string())
}

fn id_arg(s: &str) -> Result<ComponentId, String> {
    let id: u8 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid component id: {s}"))?;
    ComponentId::try_from(id).map_err(|err| err.to_string())
}

/// Build the frame bytes for a target and payload.
pub fn build_frame(target: &TargetArgs, payload: &PayloadArgs) -> Vec<u8> {
    let (component, id) = (target.component, u8::from(target.id));
    let mut buf = BytesMut::new();
    match (&payload.values, &payload.bytes) {
        (Some(values), _) => encode_values(component, id, values, &mut buf),
        (None, Some(bytes)) => encode_buffer(component, id, bytes, &mut buf),
        (None, None) => encode_buffer(component, id, &[], &mut buf),
    }
    buf.to_vec()
}
