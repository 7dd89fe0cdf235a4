//! Native client entry point.
//!
//! Wires a [`Whiteboard`] to the sync channel and drives the poll loop.
//! Widget UI is out of scope; this binary is the plumbing layer a frontend
//! feeds pointer events into.

use scrawl_client::Whiteboard;
use scrawl_core::{ConnectionState, sync::SyncClient};
use std::time::Duration;

const DEFAULT_SERVER_URL: &str = "ws://localhost:3030/ws";
const DEFAULT_CANVAS_SIZE: (u32, u32) = (800, 600);

/// Whether the poll loop should stop. A transport error always ends the
/// session; a plain disconnect only counts once the channel has actually
/// been up, so the initial `Connecting` phase is not mistaken for a drop.
fn session_ended(ever_connected: bool, state: ConnectionState) -> bool {
    match state {
        ConnectionState::Error => true,
        ConnectionState::Disconnected => ever_connected,
        ConnectionState::Connecting | ConnectionState::Connected => false,
    }
}

fn main() {
    env_logger::init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
    log::info!("Starting Scrawl, connecting to {}", url);

    let (width, height) = DEFAULT_CANVAS_SIZE;
    let mut whiteboard = Whiteboard::new(width, height);
    let mut channel = SyncClient::new();

    if let Err(e) = channel.connect(&url) {
        log::error!("Connection setup failed: {}", e);
        std::process::exit(1);
    }

    let mut last_status = (whiteboard.connection(), whiteboard.user_count());
    let mut ever_connected = false;
    loop {
        for event in channel.poll_events() {
            whiteboard.apply(event);
        }
        ever_connected |= whiteboard.connection() == ConnectionState::Connected;

        for message in whiteboard.take_outgoing() {
            if let Err(e) = channel.send(&message) {
                log::warn!("Dropping outbound message: {}", e);
            }
        }

        let status = (whiteboard.connection(), whiteboard.user_count());
        if status != last_status {
            log::info!(
                "status: {:?}, users: {}, segments: {}",
                status.0,
                status.1,
                whiteboard.board().len()
            );
            last_status = status;
        }

        if session_ended(ever_connected, whiteboard.connection()) {
            log::info!("Session ended ({:?})", whiteboard.connection());
            break;
        }

        std::thread::sleep(Duration::from_millis(10));
    }
}
