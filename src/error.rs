//! Error taxonomy for a single transfer run
//!
//! Every failure is terminal: callers report the message and exit with
//! [`TransferError::exit_code`]. Nothing is retried.

use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum TransferError {
    /// Bad argument count, port range, verb or filename. Raised before any network I/O.
    Validation(String),
    /// Control connection could not be established
    Connection { addr: String, source: io::Error },
    /// Data listener could not bind its port
    Bind { addr: String, source: io::Error },
    /// A write reported zero bytes before the whole message was sent
    ConnectionBroken { sent: usize, total: usize },
    /// A list request came back with no data
    EmptyResponse { server: String },
    /// The requested file already exists locally; nothing was written
    DuplicateFile { path: PathBuf },
    /// The server answered a get request with the not-found sentinel
    RemoteFileNotFound { server: String, filename: String },
    /// Any other socket or filesystem failure
    Io { context: String, source: io::Error },
}

impl TransferError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        TransferError::Io {
            context: context.into(),
            source,
        }
    }

    /// Process exit code for this failure. A remote not-found is reported,
    /// not treated as a client failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            TransferError::RemoteFileNotFound { .. } => 0,
            _ => 1,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TransferError::Validation(_))
    }
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Validation(msg) => write!(f, "{}", msg),
            TransferError::Connection { addr, .. } => write!(f, "could not connect to {}", addr),
            TransferError::Bind { addr, .. } => write!(f, "could not listen on {}", addr),
            TransferError::ConnectionBroken { sent, total } => write!(
                f,
                "socket connection broken after {} of {} bytes",
                sent, total
            ),
            TransferError::EmptyResponse { server } => {
                write!(f, "error in data: {} sent an empty response", server)
            }
            TransferError::DuplicateFile { path } => write!(
                f,
                "{} already exists in directory! File not saved.",
                path.display()
            ),
            TransferError::RemoteFileNotFound { server, filename } => {
                write!(f, "{} says FILE NOT FOUND ({})", server, filename)
            }
            TransferError::Io { context, .. } => write!(f, "{}", context),
        }
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferError::Connection { source, .. }
            | TransferError::Bind { source, .. }
            | TransferError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
