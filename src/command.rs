//! Commands and validated requests
//!
//! A [`Request`] is everything one run needs: where the server is, what to
//! ask for, and which local port the server should connect back to.

use std::fmt;
use std::path::{Component, Path};

use crate::error::TransferError;
use crate::protocol::{port_in_range, verb, MAX_PORT, MIN_PORT};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Directory listing of the server's working directory
    List,
    /// Contents of one file from the server's working directory
    Get { filename: String },
}

impl Command {
    pub fn filename(&self) -> Option<&str> {
        match self {
            Command::List => None,
            Command::Get { filename } => Some(filename),
        }
    }

    /// Text sent on the control connection. No terminator.
    pub fn wire_text(&self, transfer_port: u16) -> String {
        match self {
            Command::List => format!("{} {}", verb::LIST, transfer_port),
            Command::Get { filename } => format!("{} {} {}", verb::GET, filename, transfer_port),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::List => write!(f, "list"),
            Command::Get { filename } => write!(f, "get {}", filename),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub server_host: String,
    pub server_port: u16,
    pub command: Command,
    pub transfer_port: u16,
}

impl Request {
    /// Build a request from the positional arguments that follow the server
    /// port: `-l <transfer_port>` or `-g <filename> <transfer_port>`.
    pub fn from_parts(server_host: &str, server_port: u16, rest: &[String]) -> Result<Self, TransferError> {
        if server_host.trim().is_empty() {
            return Err(TransferError::Validation("server hostname is empty".into()));
        }
        if !port_in_range(server_port) {
            return Err(invalid_port("server", server_port));
        }
        let (verb_arg, tail) = rest
            .split_first()
            .ok_or_else(|| TransferError::Validation("missing command (-l or -g)".into()))?;
        let (command, port_arg) = match (verb_arg.as_str(), tail) {
            (verb::LIST, [port]) => (Command::List, port),
            (verb::LIST, [_, _, ..]) => {
                return Err(TransferError::Validation(
                    "-l does not take a filename".into(),
                ))
            }
            (verb::GET, [filename, port]) => {
                validate_filename(filename)?;
                (
                    Command::Get {
                        filename: filename.clone(),
                    },
                    port,
                )
            }
            (verb::GET, [_]) => {
                return Err(TransferError::Validation("-g requires a filename".into()))
            }
            (verb::LIST, []) | (verb::GET, _) => {
                return Err(TransferError::Validation(
                    "wrong number of arguments".into(),
                ))
            }
            (other, _) => {
                return Err(TransferError::Validation(format!(
                    "invalid command '{}': expected -l or -g",
                    other
                )))
            }
        };
        let transfer_port = parse_port("transfer", port_arg)?;
        Ok(Request {
            server_host: server_host.to_string(),
            server_port,
            command,
            transfer_port,
        })
    }

    /// `host:port` of the control connection, as shown to the user
    pub fn server_label(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn wire_text(&self) -> String {
        self.command.wire_text(self.transfer_port)
    }
}

/// Parse a port argument and check it against the unprivileged range
pub fn parse_port(which: &str, s: &str) -> Result<u16, TransferError> {
    let n: u32 = s
        .trim()
        .parse()
        .map_err(|_| TransferError::Validation(format!("invalid {} port number: {}", which, s)))?;
    match u16::try_from(n) {
        Ok(p) if port_in_range(p) => Ok(p),
        _ => Err(TransferError::Validation(format!(
            "invalid {} port number: {} (must be {}-{})",
            which, s, MIN_PORT, MAX_PORT
        ))),
    }
}

fn invalid_port(which: &str, port: u16) -> TransferError {
    TransferError::Validation(format!(
        "invalid {} port number: {} (must be {}-{})",
        which, port, MIN_PORT, MAX_PORT
    ))
}

/// A requested filename must be one plain path component: it travels
/// space-separated on the wire and is created inside the download directory.
pub fn validate_filename(name: &str) -> Result<(), TransferError> {
    if name.is_empty() {
        return Err(TransferError::Validation("filename is empty".into()));
    }
    if name.contains('\0') {
        return Err(TransferError::Validation("filename contains NUL byte".into()));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(TransferError::Validation(format!(
            "filename '{}' contains whitespace",
            name
        )));
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(TransferError::Validation(format!(
            "filename '{}' must not contain directory components",
            name
        ))),
    }
}
