//! ftclient - list or fetch files from an ftserver
//!
//! Sends one command over a control connection, then waits on a local
//! transfer port for the server to connect back with the response.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use std::sync::Arc;

use ftclient::cli::ClientArgs;
use ftclient::client::Client;
use ftclient::config::ClientConfig;
use ftclient::error::TransferError;
use ftclient::logger::{Logger, MultiLogger, NoopLogger, StderrLogger, TextLogger};

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\nError: {:#}\n", e);
            e.downcast_ref::<TransferError>()
                .map(TransferError::exit_code)
                .unwrap_or(1)
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted by user. Exiting (Ctrl-C)...");
        std::process::exit(130);
    })
    .context("Error setting Ctrl-C handler")?;

    let args = match ClientArgs::try_parse() {
        Ok(a) => a,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            return Ok(1);
        }
    };

    let request = match args.to_request() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("\nError: {}\n\n{}\n", e, ClientArgs::usage());
            return Ok(e.exit_code());
        }
    };

    let mut config = ClientConfig::resolve(args.config.as_deref())?;
    args.apply_overrides(&mut config);

    let logger = build_logger(&config, args.verbose)?;
    let client = Client::new(config, logger);

    let result = {
        let mut out = std::io::stdout().lock();
        client.run(&request, &mut out)
    };
    match result {
        Ok(_) => {
            println!("Goodbye!\n");
            Ok(0)
        }
        Err(e) if e.exit_code() == 0 => {
            println!("\n{}\n", e);
            println!("Goodbye!\n");
            Ok(0)
        }
        Err(e @ TransferError::DuplicateFile { .. }) => {
            // The server finished its side; the session still closes politely
            eprintln!("\nError: {}\n", e);
            println!("Goodbye!\n");
            Ok(e.exit_code())
        }
        Err(e) => Err(e.into()),
    }
}

fn build_logger(config: &ClientConfig, verbose: bool) -> Result<Arc<dyn Logger>> {
    let mut loggers: Vec<Box<dyn Logger>> = Vec::new();
    if let Some(p) = &config.log_file {
        let l = TextLogger::new(p).with_context(|| format!("open log file {}", p.display()))?;
        loggers.push(Box::new(l));
    }
    if verbose {
        loggers.push(Box::new(StderrLogger));
    }
    // Choose logger once; NoopLogger keeps the quiet path free
    let logger: Arc<dyn Logger> = if loggers.is_empty() {
        Arc::new(NoopLogger)
    } else {
        Arc::new(MultiLogger::new(loggers))
    };
    Ok(logger)
}
