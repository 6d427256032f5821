use remotebit::frame::Frame;
use remotebit::transport::MAX_FRAME_LEN;
use tracing::warn;

use crate::cmd::{build_frame, EncodeArgs};
use crate::exit::{CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let wire = build_frame(&args.target, &args.payload);
    if wire.len() > MAX_FRAME_LEN {
        warn!(
            length = wire.len(),
            max = MAX_FRAME_LEN,
            "frame exceeds the link maximum and would be truncated"
        );
    }

    let frame = Frame::parse(&wire)
        .ok_or_else(|| CliError::new(INTERNAL, "encoded frame is missing its header"))?;
    print_frame(&frame, format);
    Ok(SUCCESS)
}
