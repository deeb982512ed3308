//! Control channel: one outbound connection carrying one command line

use std::net::TcpStream;

use crate::error::TransferError;
use crate::stream_io::Framing;

pub struct ControlConnection {
    stream: TcpStream,
    server: String,
}

impl ControlConnection {
    /// Connect to the server's control port. Blocks without a timeout.
    pub fn connect(host: &str, port: u16) -> Result<Self, TransferError> {
        let server = format!("{}:{}", host, port);
        let stream = TcpStream::connect((host, port)).map_err(|e| TransferError::Connection {
            addr: server.clone(),
            source: e,
        })?;
        let _ = stream.set_nodelay(true);
        Ok(ControlConnection { stream, server })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Send the command text in full. Returns the number of bytes written.
    pub fn send_command<F: Framing>(&mut self, framing: &F, wire: &str) -> Result<usize, TransferError> {
        framing.send_message(&mut self.stream, wire.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream_io::CloseDelimited;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_send_command_reaches_server() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut s, _) = listener.accept().unwrap();
            let mut got = String::new();
            s.read_to_string(&mut got).unwrap();
            got
        });

        let mut conn = ControlConnection::connect("127.0.0.1", port).unwrap();
        assert_eq!(conn.server(), format!("127.0.0.1:{}", port));
        let n = conn
            .send_command(&CloseDelimited::default(), "-g report.txt 50001")
            .unwrap();
        assert_eq!(n, 19);
        drop(conn);

        assert_eq!(server.join().unwrap(), "-g report.txt 50001");
    }

    #[test]
    fn test_connect_refused() {
        let port = {
            let sock = TcpListener::bind("127.0.0.1:0").unwrap();
            sock.local_addr().unwrap().port()
        };
        match ControlConnection::connect("127.0.0.1", port) {
            Err(TransferError::Connection { addr, .. }) => {
                assert_eq!(addr, format!("127.0.0.1:{}", port))
            }
            Err(e) => panic!("expected Connection error, got {}", e),
            Ok(_) => panic!("connect to a closed port succeeded"),
        }
    }
}
