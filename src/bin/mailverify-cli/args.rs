use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mailverify_lib::{Config, ValidationMode};

#[derive(Parser)]
#[command(name = "mailverify-cli", version, about = "Email address verification")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,

    /// TOML configuration file
    #[arg(long, global = true, env = "MAILVERIFY_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON log lines instead of human-readable ones
    #[arg(long, global = true)]
    pub log_json: bool,

    /// enable the SMTP reachability probe
    #[arg(long, global = true)]
    pub smtp_probe: bool,

    /// skip the remote classification API
    #[arg(long, global = true)]
    pub no_remote: bool,

    /// skip the static disposable list
    #[arg(long, global = true)]
    pub no_static_list: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every enabled check against one address or a list on stdin
    Verify {
        email: Option<String>,
        /// read addresses from stdin, one per line
        #[arg(long, conflicts_with = "email")]
        stdin: bool,
        /// format: human|json|ndjson
        #[arg(long, default_value = "human")]
        format: String,
        /// write the report to a file (json/ndjson)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Syntax check only, no network
    Validate {
        /// mode: strict|relaxed
        #[arg(long, default_value = "strict")]
        mode: String,
        /// format: human|json
        #[arg(long, default_value = "human")]
        format: String,
        email: String,
    },
    /// Serve the HTTP API
    Serve {
        /// listen address, overrides [server].bind
        #[arg(long)]
        bind: Option<String>,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Loads the configuration file, then applies command-line overrides.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if self.smtp_probe {
            config.smtp.enabled = true;
        }
        if self.no_remote {
            config.disposable.use_remote_api = false;
        }
        if self.no_static_list {
            config.disposable.use_static_list = false;
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn mode_from_str(s: &str) -> ValidationMode {
    match s {
        "relaxed" => ValidationMode::Relaxed,
        _ => ValidationMode::Strict,
    }
}
