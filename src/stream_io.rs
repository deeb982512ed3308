//! Reliable send/receive over a connected stream
//!
//! The protocol has no length prefix: a message ends when the sender closes
//! the connection. That convention is kept behind [`Framing`] so a framed
//! transport can replace [`CloseDelimited`] without touching the dispatcher.

use std::borrow::Cow;
use std::io::{ErrorKind, Read, Write};

use crate::error::TransferError;
use crate::protocol::DEFAULT_RECV_CHUNK;

/// Tunables for the stream primitives
#[derive(Clone, Copy, Debug)]
pub struct StreamConfig {
    pub recv_chunk_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            recv_chunk_size: DEFAULT_RECV_CHUNK,
        }
    }
}

/// Raw bytes received on the data channel
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Payload {
    bytes: Vec<u8>,
}

impl Payload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Payload { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload decoded as text. Invalid UTF-8 is replaced, never rejected.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Write all of `message`, looping over partial writes.
///
/// Returns the number of bytes written, always `message.len()` on success.
pub fn send_all<W: Write + ?Sized>(stream: &mut W, message: &[u8]) -> Result<usize, TransferError> {
    let total = message.len();
    let mut sent = 0usize;
    while sent < total {
        match stream.write(&message[sent..]) {
            Ok(0) => return Err(TransferError::ConnectionBroken { sent, total }),
            Ok(n) => sent += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(TransferError::io("send", e)),
        }
    }
    stream
        .flush()
        .map_err(|e| TransferError::io("flush", e))?;
    Ok(sent)
}

/// Read until the peer closes, in chunks of at most `chunk_size` bytes.
pub fn receive_all<R: Read + ?Sized>(stream: &mut R, chunk_size: usize) -> Result<Payload, TransferError> {
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut data = Vec::new();
    loop {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => data.extend_from_slice(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(TransferError::io("receive", e)),
        }
    }
    Ok(Payload::new(data))
}

/// Read and discard until the peer closes. Returns the bytes thrown away.
pub fn drain<R: Read + ?Sized>(stream: &mut R, chunk_size: usize) -> Result<u64, TransferError> {
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut discarded = 0u64;
    loop {
        match stream.read(&mut buf) {
            Ok(0) => return Ok(discarded),
            Ok(n) => discarded += n as u64,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(TransferError::io("drain", e)),
        }
    }
}

/// How one message is delimited on a stream
pub trait Framing {
    fn send_message<W: Write + ?Sized>(&self, stream: &mut W, message: &[u8]) -> Result<usize, TransferError>;
    fn receive_message<R: Read + ?Sized>(&self, stream: &mut R) -> Result<Payload, TransferError>;
    fn discard_message<R: Read + ?Sized>(&self, stream: &mut R) -> Result<u64, TransferError>;
}

/// Unframed messages terminated by connection close
#[derive(Clone, Copy, Debug, Default)]
pub struct CloseDelimited {
    config: StreamConfig,
}

impl CloseDelimited {
    pub fn new(config: StreamConfig) -> Self {
        CloseDelimited { config }
    }
}

impl Framing for CloseDelimited {
    fn send_message<W: Write + ?Sized>(&self, stream: &mut W, message: &[u8]) -> Result<usize, TransferError> {
        send_all(stream, message)
    }

    fn receive_message<R: Read + ?Sized>(&self, stream: &mut R) -> Result<Payload, TransferError> {
        receive_all(stream, self.config.recv_chunk_size)
    }

    fn discard_message<R: Read + ?Sized>(&self, stream: &mut R) -> Result<u64, TransferError> {
        drain(stream, self.config.recv_chunk_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Accepts at most `per_call` bytes per write, optionally stalling at `limit`
    struct ThrottledWriter {
        out: Vec<u8>,
        per_call: usize,
        limit: Option<usize>,
        calls: usize,
        interrupt_first: bool,
    }

    impl ThrottledWriter {
        fn new(per_call: usize) -> Self {
            ThrottledWriter {
                out: Vec::new(),
                per_call,
                limit: None,
                calls: 0,
                interrupt_first: false,
            }
        }
    }

    impl Write for ThrottledWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls += 1;
            if self.interrupt_first && self.calls == 1 {
                return Err(io::Error::new(ErrorKind::Interrupted, "signal"));
            }
            let room = match self.limit {
                Some(l) => l.saturating_sub(self.out.len()),
                None => usize::MAX,
            };
            let n = buf.len().min(self.per_call).min(room);
            self.out.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Hands out at most `per_call` bytes per read, then EOF
    struct ChunkedReader {
        data: Vec<u8>,
        pos: usize,
        per_call: usize,
        reads: usize,
    }

    impl ChunkedReader {
        fn new(data: &[u8], per_call: usize) -> Self {
            ChunkedReader {
                data: data.to_vec(),
                pos: 0,
                per_call,
                reads: 0,
            }
        }
    }

    impl Read for ChunkedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            let n = (self.data.len() - self.pos).min(self.per_call).min(buf.len());
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_send_all_across_partial_writes() {
        let msg = b"-g report.txt 50001";
        for per_call in [1usize, 3, 7, 64] {
            let mut w = ThrottledWriter::new(per_call);
            let n = send_all(&mut w, msg).unwrap();
            assert_eq!(n, msg.len());
            assert_eq!(w.out, msg);
        }
    }

    #[test]
    fn test_send_all_zero_write_is_broken() {
        let mut w = ThrottledWriter::new(4);
        w.limit = Some(6);
        match send_all(&mut w, b"-l 50002 extra") {
            Err(TransferError::ConnectionBroken { sent, total }) => {
                assert_eq!(sent, 6);
                assert_eq!(total, 14);
            }
            other => panic!("expected ConnectionBroken, got {:?}", other),
        }
    }

    #[test]
    fn test_send_all_retries_interrupted() {
        let mut w = ThrottledWriter::new(2);
        w.interrupt_first = true;
        send_all(&mut w, b"-l 50002").unwrap();
        assert_eq!(w.out, b"-l 50002");
    }

    #[test]
    fn test_send_all_empty_message() {
        let mut w = ThrottledWriter::new(2);
        assert_eq!(send_all(&mut w, b"").unwrap(), 0);
        assert_eq!(w.calls, 0);
    }

    #[test]
    fn test_receive_all_reassembles_chunks() {
        let data: Vec<u8> = (0..10_000u32).map(|i| b'a' + (i % 26) as u8).collect();
        for (per_call, chunk) in [(1usize, 4096usize), (333, 4096), (5000, 16), (10_000, 4096)] {
            let mut r = ChunkedReader::new(&data, per_call);
            let payload = receive_all(&mut r, chunk).unwrap();
            assert_eq!(payload.as_bytes(), &data[..]);
        }
    }

    #[test]
    fn test_receive_all_empty_stream() {
        let mut r = ChunkedReader::new(b"", 10);
        let payload = receive_all(&mut r, 4096).unwrap();
        assert!(payload.is_empty());
        assert_eq!(r.reads, 1);
    }

    #[test]
    fn test_payload_text_is_lossy() {
        let payload = Payload::new(vec![b'o', b'k', 0xff]);
        assert_eq!(payload.text(), "ok\u{fffd}");
        assert_eq!(payload.len(), 3);
    }

    #[test]
    fn test_close_delimited_discard_counts_bytes() {
        let framing = CloseDelimited::new(StreamConfig { recv_chunk_size: 8 });
        let mut r = ChunkedReader::new(b"hello world, discarded", 5);
        assert_eq!(framing.discard_message(&mut r).unwrap(), 22);
    }
}
