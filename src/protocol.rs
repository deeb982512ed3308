//! Shared protocol constants for the ftclient control/data handshake

// Command verbs as they appear on the command line and on the wire
pub mod verb {
    pub const LIST: &str = "-l";
    pub const GET: &str = "-g";
}

// Valid unprivileged port range for both control and transfer ports
pub const MIN_PORT: u16 = 1024;
pub const MAX_PORT: u16 = 65535;

// Receive chunk size for the data channel. Policy only: the wire has no framing
pub const DEFAULT_RECV_CHUNK: usize = 4096;

// In-band error the server sends instead of file contents
pub const FILE_NOT_FOUND: &str = "FILE NOT FOUND";

// Listen backlog for the data channel; the listener is single-shot
pub const DATA_BACKLOG: i32 = 1;

// Default bind address for the data listener (all IPv4 interfaces)
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

pub fn port_in_range(port: u16) -> bool {
    (MIN_PORT..=MAX_PORT).contains(&port)
}
