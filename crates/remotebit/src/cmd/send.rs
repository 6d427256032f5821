use std::time::Duration;

use remotebit::frame::Frame;
use remotebit::transport::{RadioConfig, UdsRadio};
use remotebit::RemoteBit;
use tracing::{info, warn};

use crate::cmd::{build_frame, SendArgs};
use crate::exit::{remotebit_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let connect_timeout = parse_duration(&args.connect_timeout)?;
    let radio = UdsRadio::connect(&args.path).with_config(RadioConfig {
        connect_timeout,
        ..RadioConfig::default()
    });

    let mut remote = RemoteBit::new(radio);
    remote
        .start()
        .map_err(|err| remotebit_error("connect failed", err))?;
    if !remote.is_connected() {
        warn!(path = ?args.path, "peer went away; frame will be dropped");
    }

    if let Some(level) = args.power {
        remote.set_transmit_power(level);
    }

    match (&args.payload.values, &args.payload.bytes) {
        (Some(values), _) => remote.send_values(args.target.component, args.target.id, values),
        (None, Some(bytes)) => {
            remote.send_buffer_from_array(args.target.component, args.target.id, bytes)
        }
        (None, None) => remote.send_buffer_from_array(args.target.component, args.target.id, &[]),
    }
    info!(
        component = args.target.component,
        id = u8::from(args.target.id),
        "frame sent"
    );

    if let Some(frame) = Frame::parse(&build_frame(&args.target, &args.payload)) {
        print_frame(&frame, format);
    }
    Ok(SUCCESS)
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(num) => (num, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
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
