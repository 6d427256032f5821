use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("remotebit {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: remotebit");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("REMOTEBIT_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "build_profile: {}",
        option_env!("REMOTEBIT_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("max_frame_len: {}", remotebit::transport::MAX_FRAME_LEN);
    println!("link: {}", if cfg!(unix) { "unix-domain-socket" } else { "none" });

    Ok(SUCCESS)
}
