//! Reference server binary, spec.md §6 ("Not core"). Wires a
//! [`ServerSession`] to nothing in particular -- the concrete transport
//! socket is out of scope (spec.md's Out-of-scope list) and left to the
//! embedding application. This binary exists to show the shape of the
//! cooperative event loop: connect/introduce/poll_timeouts/drain on a tick,
//! the way an application would drive it once a real socket is plugged in.
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::info;

use noodles::{ServerOptions, ServerSession};

#[derive(Parser, Debug)]
#[command(author, version, about = "Reference NOODLES server loop (no transport)", long_about = None)]
struct Args {
    #[arg(long, default_value_t = ServerOptions::default().listen_port)]
    port: u16,

    #[arg(long, default_value_t = ServerOptions::default().asset_port)]
    asset_port: u16,

    #[arg(long, default_value_t = ServerOptions::default().handshake_timeout_secs)]
    handshake_timeout_secs: u32,
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let options = ServerOptions {
        listen_port: args.port,
        asset_port: args.asset_port,
        handshake_timeout_secs: args.handshake_timeout_secs,
    };
    info!(?options, "starting reference NOODLES server loop");

    let mut session = ServerSession::new(options.session_options());
    session.install_table_builtins();

    // A real embedding would poll a socket's readiness here and feed inbound
    // frames into `session.handle_message`. With no transport wired up, the
    // loop just ticks the timeout check so the shape of the driver is clear.
    for _ in 0..3 {
        let dropped = session.poll_timeouts(Instant::now());
        if !dropped.is_empty() {
            info!(count = dropped.len(), "dropped clients past handshake deadline");
        }
        std::thread::sleep(Duration::from_millis(100));
    }

    info!("reference loop finished; plug in a transport to go further");
}
