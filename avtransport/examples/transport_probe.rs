//! # AVTransport probe
//!
//! Prints the transport state and position of one renderer, and optionally
//! sends a single transport command.
//!
//! ```bash
//! cargo run --example transport_probe -- http://192.168.1.40:49152/upnp/control/rendertransport1 [play|pause|stop|seek SECONDS]
//! ```

use avtransport::{ApiError, AvTransportClient, RendererControl};

fn main() -> Result<(), ApiError> {
    let mut args = std::env::args().skip(1);
    let Some(control_url) = args.next() else {
        eprintln!("usage: transport_probe <control-url> [play|pause|stop|seek SECONDS]");
        std::process::exit(2);
    };
    let client = AvTransportClient::new(control_url);

    match args.next().as_deref() {
        Some("play") => client.play()?,
        Some("pause") => client.pause()?,
        Some("stop") => client.stop()?,
        Some("seek") => {
            let target = args.next().and_then(|s| s.parse().ok()).unwrap_or(0);
            client.seek(target)?;
        }
        Some(other) => eprintln!("unknown command {:?}, only probing", other),
        None => {}
    }

    let transport = client.transport_info()?;
    println!(
        "state: {} ({}), speed {}",
        transport.current_transport_state, transport.current_transport_status, transport.current_speed
    );

    let position = client.position_info()?;
    println!("track {}: {}", position.track, position.track_uri);
    println!("  {} / {}", position.abs_time, position.track_duration);
    Ok(())
}
