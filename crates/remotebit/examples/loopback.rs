//! Drive the service against an in-process radio.
//!
//! Run with:
//!   cargo run -p remotebit --example loopback

use std::sync::mpsc;

use remotebit::frame::{ComponentId, ReceivedComponent, SendComponent};
use remotebit::transport::LoopbackRadio;
use remotebit::RemoteBit;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (radio, peer) = LoopbackRadio::pair();
    let mut remote = RemoteBit::new(radio);
    let joystick = ComponentId::try_from(0)?;

    let (tx, rx) = mpsc::channel();
    remote.on_received_values(ReceivedComponent::Joystick, joystick, move |axes| {
        let _ = tx.send(axes.to_vec());
    });
    remote.start()?;
    peer.connect();

    // The controller reports x=512, y=300.
    peer.deliver(&[101, 0, 0x00, 0x02, 0x2c, 0x01]);
    for axes in rx.try_iter() {
        eprintln!("joystick axes: {axes:?}");
        let speed = u32::from(axes[0]) * 100 / 1023;
        remote.send_values(SendComponent::Speed, joystick, &[speed]);
    }

    for frame in peer.sent() {
        eprintln!("sent frame: {frame:?}");
    }
    Ok(())
}
