use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use mailverify_lib::VerifierOptions;
use mailverify_lib::bulk::DEFAULT_WORKERS;

#[derive(Parser)]
#[command(name = "mailverify-cli", version, about = "Email deliverability verification")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,

    /// per-operation network timeout, in seconds (connect, read/write, DNS)
    #[arg(long, global = true, default_value_t = 10)]
    pub timeout: u64,

    /// envelope sender used for MAIL FROM (empty string sends `<>`)
    #[arg(long = "mail-from", global = true)]
    pub mail_from: Option<String>,

    /// name announced in EHLO/HELO (defaults to the local host name)
    #[arg(long, global = true)]
    pub helo: Option<String>,

    /// SMTP port on the mail exchanger
    #[arg(long, global = true, default_value_t = 25)]
    pub port: u16,

    /// session attempts when the local host runs out of sockets
    #[arg(long = "max-attempts", global = true, default_value_t = 3)]
    pub max_attempts: u32,

    /// more log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// also append logs to this file
    #[arg(long = "log-file", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// verify a single address
    Verify {
        email: String,
        /// format: human|json
        #[arg(long, default_value = "human")]
        format: String,
    },
    /// verify every address of a .txt or .csv file
    Bulk {
        /// input file (.txt one address per line, .csv with an Email column)
        #[arg(short, long)]
        input: PathBuf,
        /// report destination, `-` for stdout
        #[arg(short, long, default_value = "results.csv")]
        out: String,
        /// concurrent verifications
        #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
        workers: usize,
        /// format: human|json|ndjson|csv
        #[arg(long, default_value = "csv")]
        format: String,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn clap_command() -> clap::Command {
        <Self as clap::CommandFactory>::command()
    }

    pub fn verifier_options(&self) -> VerifierOptions {
        let mut options = VerifierOptions::new()
            .with_timeout(Duration::from_secs(self.timeout.max(1)))
            .with_port(self.port)
            .with_max_attempts(self.max_attempts);
        if let Some(mail_from) = &self.mail_from {
            options = options.with_mail_from(mail_from.as_str());
        }
        if let Some(helo) = &self.helo {
            options = options.with_helo_domain(helo.as_str());
        }
        options
    }

    /// Default directive for the log filter when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
