use anyhow::Result;
use chrono::Utc;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;

/// Transfer events. Every hook defaults to a no-op.
pub trait Logger: Send + Sync {
    fn control_connected(&self, _server: &str) {}
    fn command_sent(&self, _wire: &str, _bytes: usize) {}
    fn listening(&self, _addr: &str) {}
    fn data_accepted(&self, _peer: &SocketAddr) {}
    fn payload_received(&self, _bytes: usize) {}
    fn listing_shown(&self, _bytes: usize) {}
    fn file_saved(&self, _path: &Path, _bytes: usize) {}
    fn duplicate_discarded(&self, _path: &Path, _bytes: u64) {}
    fn error(&self, _context: &str, _msg: &str) {}
    fn done(&self, _ok: bool, _seconds: f64) {}
}

pub struct NoopLogger;
impl Logger for NoopLogger {}

pub struct TextLogger {
    file: Mutex<File>,
}

impl TextLogger {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(f),
        })
    }

    fn line(&self, s: &str) {
        let mut f = self.file.lock();
        let _ = writeln!(f, "[{}] {}", Utc::now().to_rfc3339(), s);
    }
}

impl Logger for TextLogger {
    fn control_connected(&self, server: &str) {
        self.line(&format!("CONNECT server={}", server));
    }
    fn command_sent(&self, wire: &str, bytes: usize) {
        self.line(&format!("COMMAND text=\"{}\" bytes={}", wire, bytes));
    }
    fn listening(&self, addr: &str) {
        self.line(&format!("LISTEN addr={}", addr));
    }
    fn data_accepted(&self, peer: &SocketAddr) {
        self.line(&format!("ACCEPT peer={}", peer));
    }
    fn payload_received(&self, bytes: usize) {
        self.line(&format!("RECV bytes={}", bytes));
    }
    fn listing_shown(&self, bytes: usize) {
        self.line(&format!("LIST bytes={}", bytes));
    }
    fn file_saved(&self, path: &Path, bytes: usize) {
        self.line(&format!("SAVE path={} bytes={}", path.display(), bytes));
    }
    fn duplicate_discarded(&self, path: &Path, bytes: u64) {
        self.line(&format!("DUPLICATE path={} discarded={}", path.display(), bytes));
    }
    fn error(&self, context: &str, msg: &str) {
        self.line(&format!("ERROR ctx={} msg={}", context, msg));
    }
    fn done(&self, ok: bool, seconds: f64) {
        self.line(&format!("DONE ok={ok} seconds={seconds:.3}"));
    }
}

/// Human-readable progress on stderr for `--verbose`
pub struct StderrLogger;

impl Logger for StderrLogger {
    fn control_connected(&self, server: &str) {
        eprintln!("connected to {}", server);
    }
    fn command_sent(&self, wire: &str, _bytes: usize) {
        eprintln!("sent command: {}", wire);
    }
    fn listening(&self, addr: &str) {
        eprintln!("waiting for data connection on {}", addr);
    }
    fn data_accepted(&self, peer: &SocketAddr) {
        eprintln!("data connection from {}", peer);
    }
    fn payload_received(&self, bytes: usize) {
        eprintln!("received {} bytes", bytes);
    }
    fn duplicate_discarded(&self, path: &Path, bytes: u64) {
        eprintln!("discarded {} bytes for existing {}", bytes, path.display());
    }
}

/// Fans events out to several loggers
pub struct MultiLogger {
    inner: Vec<Box<dyn Logger>>,
}

impl MultiLogger {
    pub fn new(inner: Vec<Box<dyn Logger>>) -> Self {
        Self { inner }
    }
}

impl Logger for MultiLogger {
    fn control_connected(&self, server: &str) {
        self.inner.iter().for_each(|l| l.control_connected(server));
    }
    fn command_sent(&self, wire: &str, bytes: usize) {
        self.inner.iter().for_each(|l| l.command_sent(wire, bytes));
    }
    fn listening(&self, addr: &str) {
        self.inner.iter().for_each(|l| l.listening(addr));
    }
    fn data_accepted(&self, peer: &SocketAddr) {
        self.inner.iter().for_each(|l| l.data_accepted(peer));
    }
    fn payload_received(&self, bytes: usize) {
        self.inner.iter().for_each(|l| l.payload_received(bytes));
    }
    fn listing_shown(&self, bytes: usize) {
        self.inner.iter().for_each(|l| l.listing_shown(bytes));
    }
    fn file_saved(&self, path: &Path, bytes: usize) {
        self.inner.iter().for_each(|l| l.file_saved(path, bytes));
    }
    fn duplicate_discarded(&self, path: &Path, bytes: u64) {
        self.inner.iter().for_each(|l| l.duplicate_discarded(path, bytes));
    }
    fn error(&self, context: &str, msg: &str) {
        self.inner.iter().for_each(|l| l.error(context, msg));
    }
    fn done(&self, ok: bool, seconds: f64) {
        self.inner.iter().for_each(|l| l.done(ok, seconds));
    }
}
