//! Session-layer configuration, the counterpart to
//! `noodles_registry::RegistryOptions`.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    /// Handshake must complete (receive `Introduction`) within this many
    /// seconds of connecting, spec.md §4.5 / E6. The original has no fixed
    /// number; 30s matches the teacher's own connection-timeout default.
    pub handshake_timeout_secs: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            handshake_timeout_secs: 30,
        }
    }
}
