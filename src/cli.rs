//! Command-line surface for the ftclient binary

use clap::{ArgGroup, CommandFactory, Parser};
use std::path::PathBuf;

use crate::command::{parse_port, Request};
use crate::config::ClientConfig;
use crate::error::TransferError;
use crate::protocol::verb;

/// `-l` and `-g` are options so flags may follow them; exactly one is required
/// and the transfer port is always its last value.
#[derive(Clone, Debug, Parser)]
#[command(
    author,
    version,
    about = "Fetch a directory listing or a text file from an ftserver over a control + data connection",
    override_usage = "ftclient [OPTIONS] <SERVER_HOST> <SERVER_PORT> <-l | -g FILENAME> <TRANSFER_PORT>",
    group(ArgGroup::new("command").required(true).args(["list", "get"]))
)]
pub struct ClientArgs {
    /// Server hostname
    pub server_host: String,

    /// Server control port (1024-65535)
    #[arg(value_parser = parse_server_port)]
    pub server_port: u16,

    /// List the server's directory, data arrives on TRANSFER_PORT
    #[arg(short = 'l', value_name = "TRANSFER_PORT")]
    pub list: Option<String>,

    /// Get FILENAME from the server, data arrives on TRANSFER_PORT
    #[arg(short = 'g', num_args = 2, value_names = ["FILENAME", "TRANSFER_PORT"])]
    pub get: Option<Vec<String>>,

    /// Read settings from this TOML file instead of the per-user config
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Append timestamped transfer events to this file
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Directory where -g saves files (default: current directory)
    #[arg(long = "download-dir")]
    pub download_dir: Option<PathBuf>,

    /// Print connection progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_server_port(s: &str) -> Result<u16, String> {
    parse_port("server", s).map_err(|e| e.to_string())
}

impl ClientArgs {
    pub fn to_request(&self) -> Result<Request, TransferError> {
        let mut rest = Vec::with_capacity(3);
        match (&self.list, &self.get) {
            (Some(port), None) => {
                rest.push(verb::LIST.to_string());
                rest.push(port.clone());
            }
            (None, Some(values)) => {
                rest.push(verb::GET.to_string());
                rest.extend(values.iter().cloned());
            }
            _ => {}
        }
        Request::from_parts(&self.server_host, self.server_port, &rest)
    }

    /// Command-line flags win over file settings
    pub fn apply_overrides(&self, cfg: &mut ClientConfig) {
        if let Some(p) = &self.log_file {
            cfg.log_file = Some(p.clone());
        }
        if let Some(d) = &self.download_dir {
            cfg.download_dir = d.clone();
        }
    }

    pub fn usage() -> String {
        ClientArgs::command().render_usage().to_string()
    }
}
