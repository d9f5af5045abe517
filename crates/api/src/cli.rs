//! Command-line flags.

use std::path::PathBuf;

use clap::Parser;
use govm_observability::LogFormat;

#[derive(Debug, Parser)]
#[command(
    name = "govm",
    version,
    about = "HTTP API for listing and operating on vSphere VMs via govc"
)]
pub struct Cli {
    /// HTTP listen address; `:PORT` listens on all interfaces.
    #[arg(short = 'l', long = "listen", default_value = ":10100")]
    pub listen: String,

    /// JSON settings file (`vm-path`, `GOVC_*` keys).
    #[arg(long = "cnf", default_value = "config.json")]
    pub config: PathBuf,

    /// Log output format: json or pretty.
    #[arg(long, default_value = "json")]
    pub log_format: LogFormat,
}

/// Expand the `:PORT` shorthand into an address `TcpListener::bind` accepts.
pub fn listen_addr(listen: &str) -> String {
    if listen.starts_with(':') {
        format!("0.0.0.0{listen}")
    } else {
        listen.to_string()
    }
}
