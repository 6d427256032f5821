use remotebit::frame::{from_hex, Frame, HEADER_SIZE};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = from_hex(&args.hex).map_err(|err| frame_error("decode failed", err))?;
    let frame = Frame::parse(&bytes).ok_or_else(|| {
        CliError::new(
            DATA_INVALID,
            format!(
                "frame has {} byte(s), fewer than the {HEADER_SIZE}-byte header; receivers drop it",
                bytes.len()
            ),
        )
    })?;
    print_frame(&frame, format);
    Ok(SUCCESS)
}
