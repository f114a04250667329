//! Top-level server configuration, spec.md §6. The transport ports are
//! consumed only by the reference binary -- the session core has no opinion
//! about sockets, see [`noodles_session::SessionOptions`].
use noodles_session::SessionOptions;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServerOptions {
    pub listen_port: u16,
    pub asset_port: u16,
    pub handshake_timeout_secs: u32,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            listen_port: 50000,
            asset_port: 50001,
            handshake_timeout_secs: 30,
        }
    }
}

impl ServerOptions {
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            handshake_timeout_secs: self.handshake_timeout_secs,
        }
    }
}
