//! Data channel: a single-shot listener the server connects back to

use socket2::{Domain, Protocol, Socket, Type};
use std::io::{self, ErrorKind};
use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};

use crate::error::TransferError;
use crate::protocol::DATA_BACKLOG;
use crate::stream_io::{Framing, Payload};

pub struct DataListener {
    listener: TcpListener,
    addr: SocketAddr,
}

impl DataListener {
    /// Bind `bind_address:port` with a backlog of one. The port range is
    /// checked during argument validation, not here.
    pub fn bind(bind_address: &str, port: u16) -> Result<Self, TransferError> {
        let ip: IpAddr = bind_address.parse().map_err(|_| {
            TransferError::Validation(format!("invalid bind address: {}", bind_address))
        })?;
        let addr = SocketAddr::new(ip, port);
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
            .map_err(|e| bind_error(addr, e))?;
        socket.bind(&addr.into()).map_err(|e| bind_error(addr, e))?;
        socket.listen(DATA_BACKLOG).map_err(|e| bind_error(addr, e))?;
        let listener: TcpListener = socket.into();
        let addr = listener.local_addr().map_err(|e| bind_error(addr, e))?;
        Ok(DataListener { listener, addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Block until the server connects. The listener is consumed and closed,
    /// so no second connection can ever be accepted.
    pub fn accept_once(self) -> Result<DataConnection, TransferError> {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => return Ok(DataConnection { stream, peer }),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(TransferError::io("accept data connection", e)),
            }
        }
    }
}

fn bind_error(addr: SocketAddr, source: io::Error) -> TransferError {
    TransferError::Bind {
        addr: addr.to_string(),
        source,
    }
}

/// The one accepted data connection. Consumed by whichever of
/// [`receive`](Self::receive) or [`discard`](Self::discard) runs.
pub struct DataConnection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl DataConnection {
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn receive<F: Framing>(mut self, framing: &F) -> Result<Payload, TransferError> {
        framing.receive_message(&mut self.stream)
    }

    /// Read the incoming message to its end without keeping it, so the
    /// sender's writes complete before the socket closes.
    pub fn discard<F: Framing>(mut self, framing: &F) -> Result<u64, TransferError> {
        framing.discard_message(&mut self.stream)
    }
}
