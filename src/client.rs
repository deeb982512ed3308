//! One transfer run: control connect, send command, listen, accept once,
//! receive, dispatch. Strictly sequential; every failure ends the run.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use crate::command::{Command, Request};
use crate::config::ClientConfig;
use crate::control::ControlConnection;
use crate::data::DataListener;
use crate::dispatch::{dispatch, DispatchContext, Outcome};
use crate::error::TransferError;
use crate::logger::Logger;
use crate::stream_io::{CloseDelimited, Framing};

pub struct Client<F = CloseDelimited> {
    config: ClientConfig,
    framing: F,
    logger: Arc<dyn Logger>,
}

impl Client<CloseDelimited> {
    pub fn new(config: ClientConfig, logger: Arc<dyn Logger>) -> Self {
        let framing = CloseDelimited::new(config.stream_config());
        Client::with_framing(config, framing, logger)
    }
}

impl<F: Framing> Client<F> {
    pub fn with_framing(config: ClientConfig, framing: F, logger: Arc<dyn Logger>) -> Self {
        Client {
            config,
            framing,
            logger,
        }
    }

    /// Run `request` to completion, writing user-facing output to `out`.
    pub fn run<W: Write + ?Sized>(&self, request: &Request, out: &mut W) -> Result<Outcome, TransferError> {
        let start = Instant::now();
        let result = self.transfer(request, out);
        if let Err(e) = &result {
            let msg = match std::error::Error::source(e) {
                Some(cause) => format!("{}: {}", e, cause),
                None => e.to_string(),
            };
            self.logger.error(&request.command.to_string(), &msg);
        }
        self.logger
            .done(result.is_ok(), start.elapsed().as_secs_f64());
        result
    }

    fn transfer<W: Write + ?Sized>(&self, request: &Request, out: &mut W) -> Result<Outcome, TransferError> {
        // Held open until the run ends; the server may still be reading it
        let mut control = ControlConnection::connect(&request.server_host, request.server_port)?;
        self.logger.control_connected(control.server());

        let wire = request.wire_text();
        let sent = control.send_command(&self.framing, &wire)?;
        self.logger.command_sent(&wire, sent);

        let listener = DataListener::bind(&self.config.bind_address, request.transfer_port)?;
        self.logger.listening(&listener.local_addr().to_string());
        let conn = listener.accept_once()?;
        self.logger.data_accepted(&conn.peer());

        let ctx = DispatchContext {
            server: request.server_label(),
            download_dir: self.config.download_dir.clone(),
        };

        if let Command::Get { filename } = &request.command {
            if let Err(e) = ctx.ensure_absent(filename) {
                let discarded = conn.discard(&self.framing)?;
                if let TransferError::DuplicateFile { path } = &e {
                    self.logger.duplicate_discarded(path, discarded);
                }
                return Err(e);
            }
        }

        let payload = conn.receive(&self.framing)?;
        self.logger.payload_received(payload.len());

        let outcome = dispatch(&request.command, &payload, &ctx, out)?;
        match &outcome {
            Outcome::Listed { bytes } => self.logger.listing_shown(*bytes),
            Outcome::Saved { path, bytes } => self.logger.file_saved(path, *bytes),
        }
        drop(control);
        Ok(outcome)
    }
}
