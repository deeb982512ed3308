//! Turns a received payload into the local effect of the command:
//! print a listing, or create the requested file if it is not already there.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::command::Command;
use crate::error::TransferError;
use crate::protocol::FILE_NOT_FOUND;
use crate::stream_io::Payload;

/// Where results go and how the server is named in messages
#[derive(Clone, Debug)]
pub struct DispatchContext {
    pub server: String,
    pub download_dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Listed { bytes: usize },
    Saved { path: PathBuf, bytes: usize },
}

impl DispatchContext {
    pub fn target_path(&self, filename: &str) -> PathBuf {
        self.download_dir.join(filename)
    }

    /// Fails with `DuplicateFile` if something already occupies the target
    /// name. Dangling symlinks count as present.
    pub fn ensure_absent(&self, filename: &str) -> Result<PathBuf, TransferError> {
        let path = self.target_path(filename);
        if std::fs::symlink_metadata(&path).is_ok() {
            return Err(TransferError::DuplicateFile { path });
        }
        Ok(path)
    }
}

/// True when the payload carries the server's not-found sentinel.
///
/// Matches anywhere in the text, so a real file containing the sentinel is
/// indistinguishable from the error. The wire gives no other signal.
pub fn is_not_found_sentinel(payload: &Payload) -> bool {
    payload.text().contains(FILE_NOT_FOUND)
}

pub fn dispatch<W: Write + ?Sized>(
    command: &Command,
    payload: &Payload,
    ctx: &DispatchContext,
    out: &mut W,
) -> Result<Outcome, TransferError> {
    match command {
        Command::List => show_listing(payload, ctx, out),
        Command::Get { filename } => save_file(filename, payload, ctx, out),
    }
}

fn show_listing<W: Write + ?Sized>(
    payload: &Payload,
    ctx: &DispatchContext,
    out: &mut W,
) -> Result<Outcome, TransferError> {
    writeln!(out, "\nReceiving directory structure from {}\n", ctx.server)
        .map_err(|e| TransferError::io("print listing", e))?;
    if payload.is_empty() {
        return Err(TransferError::EmptyResponse {
            server: ctx.server.clone(),
        });
    }
    writeln!(out, "{}", payload.text())
        .and_then(|_| out.flush())
        .map_err(|e| TransferError::io("print listing", e))?;
    Ok(Outcome::Listed {
        bytes: payload.len(),
    })
}

fn save_file<W: Write + ?Sized>(
    filename: &str,
    payload: &Payload,
    ctx: &DispatchContext,
    out: &mut W,
) -> Result<Outcome, TransferError> {
    if is_not_found_sentinel(payload) {
        return Err(TransferError::RemoteFileNotFound {
            server: ctx.server.clone(),
            filename: filename.to_string(),
        });
    }
    let path = ctx.target_path(filename);
    writeln!(out, "\nReceiving {} from {}\n", filename, ctx.server)
        .map_err(|e| TransferError::io("print status", e))?;
    write_new_file(&path, payload.as_bytes())?;
    writeln!(out, "File transfer complete\n")
        .and_then(|_| out.flush())
        .map_err(|e| TransferError::io("print status", e))?;
    Ok(Outcome::Saved {
        path,
        bytes: payload.len(),
    })
}

/// Create `path` and write `bytes` to it. Never opens an existing file.
fn write_new_file(path: &Path, bytes: &[u8]) -> Result<(), TransferError> {
    let mut f = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(TransferError::DuplicateFile {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(TransferError::io(format!("create {}", path.display()), e)),
    };
    if let Err(e) = f.write_all(bytes).and_then(|_| f.sync_all()) {
        drop(f);
        let _ = std::fs::remove_file(path);
        return Err(TransferError::io(format!("write {}", path.display()), e));
    }
    Ok(())
}
