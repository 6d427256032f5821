use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use remotebit::frame::{ComponentId, ReceivedComponent};
use remotebit::transport::UdsRadio;
use remotebit::RemoteBit;
use tracing::info;

use crate::cmd::ListenArgs;
use crate::exit::{remotebit_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_event, Event, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let components = args
        .components
        .unwrap_or_else(|| ReceivedComponent::ALL.map(u8::from).to_vec());
    let ids = args.ids.unwrap_or_else(|| ComponentId::all().collect());

    let mut remote = RemoteBit::new(UdsRadio::listen(&args.path));
    let (tx, rx) = mpsc::channel();
    for &component in &components {
        for &id in &ids {
            let values_tx = tx.clone();
            remote.on_received_values(component, id, move |values| {
                let _ = values_tx.send(Event::Values {
                    component,
                    id: id.into(),
                    values: values.to_vec(),
                });
            });
            let buffer_tx = tx.clone();
            remote.on_received_buffer(component, id, move |bytes| {
                let _ = buffer_tx.send(Event::Buffer {
                    component,
                    id: id.into(),
                    bytes: bytes.to_vec(),
                });
            });
        }
    }
    drop(tx);

    remote
        .start()
        .map_err(|err| remotebit_error("start failed", err))?;
    info!(path = ?args.path, keys = components.len() * ids.len(), "waiting for peer");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    let mut connected = false;

    while running.load(Ordering::SeqCst) {
        if remote.is_connected() != connected {
            connected = !connected;
            info!(connected, "link state changed");
        }

        let event = match rx.recv_timeout(POLL_INTERVAL) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        print_event(&event, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                return Ok(SUCCESS);
            }
        }
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
