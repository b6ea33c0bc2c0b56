//! CLI argument definitions using clap, and post-parse validation.
//!
//! clap owns option-parse failures (unknown flag, missing flag argument)
//! and exits 2; the validation here covers value ranges, duration syntax
//! and positional arity, and exits 1 through [`CliError::Usage`].

use clap::{ArgAction, Args, Parser};
use std::path::PathBuf;
use std::time::Duration;

use crate::client::{
    parse_time, GetOptions, Persistence, PutOptions, Verbosity, DEFAULT_FCP_HOST,
    DEFAULT_FCP_PORT, DEFAULT_PRIORITY, ONE_YEAR_SECS,
};
use crate::commands::get::GetRequest;
use crate::commands::put::PutRequest;
use crate::error::{CliError, CliResult};

/// Flags shared by all four utilities.
#[derive(Args, Debug, Default)]
pub struct CommonArgs {
    /// Increase verbosity (repeatable).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Print version information and exit.
    #[arg(short = 'V', long = "version")]
    pub version: bool,

    /// FCP service host (falls back to $FCP_HOST).
    #[arg(short = 'H', long = "fcpHost", value_name = "HOST", env = "FCP_HOST")]
    pub fcp_host: Option<String>,

    /// FCP service port (falls back to $FCP_PORT).
    #[arg(short = 'P', long = "fcpPort", value_name = "PORT", env = "FCP_PORT")]
    pub fcp_port: Option<String>,
}

impl CommonArgs {
    /// Verbosity selected by the repeated verbose flag.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flag_count(self.verbose)
    }

    /// Resolve host and port. clap's env fallback supplies the variable
    /// when the flag is absent, so the precedence is flag, then
    /// environment, then built-in default.
    pub fn endpoint(&self) -> CliResult<(String, u16)> {
        let host = self
            .fcp_host
            .clone()
            .unwrap_or_else(|| DEFAULT_FCP_HOST.to_string());
        let port = match &self.fcp_port {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| CliError::usage(format!("invalid fcpPort {raw:?}")))?,
            None => DEFAULT_FCP_PORT,
        };
        Ok((host, port))
    }
}

/// Queue flags shared by get and put.
#[derive(Args, Debug, Default)]
pub struct QueueArgs {
    /// Request persistence: connection, reboot or forever.
    #[arg(short = 'p', long = "persistence", value_name = "KIND")]
    pub persistence: Option<String>,

    /// Priority class, 0 (highest) to 6.
    #[arg(
        short = 'r',
        long = "priority",
        value_name = "LEVEL",
        allow_negative_numbers = true
    )]
    pub priority: Option<String>,

    /// Operation timeout, e.g. 30, 10m, 6h, 1d, 2w.
    #[arg(short = 't', long = "timeout", value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Place the request on the node's global queue.
    #[arg(short = 'g', long = "global")]
    pub global: bool,
}

impl QueueArgs {
    pub fn persistence(&self) -> CliResult<Persistence> {
        match &self.persistence {
            Some(raw) => raw.parse().map_err(CliError::Usage),
            None => Ok(Persistence::default()),
        }
    }

    pub fn priority(&self) -> CliResult<u8> {
        let Some(raw) = &self.priority else {
            return Ok(DEFAULT_PRIORITY);
        };
        let level: i64 = raw
            .trim()
            .parse()
            .map_err(|_| CliError::usage(format!("invalid priority {raw:?}")))?;
        if !(0..=6).contains(&level) {
            return Err(CliError::usage(format!("priority {level} out of range 0..=6")));
        }
        Ok(level as u8)
    }

    pub fn timeout(&self) -> CliResult<Duration> {
        match &self.timeout {
            Some(raw) => parse_time(raw)
                .map(Duration::from_secs)
                .map_err(CliError::Usage),
            None => Ok(Duration::from_secs(ONE_YEAR_SECS)),
        }
    }
}

/// fcpget argument set.
#[derive(Parser, Debug)]
#[command(
    name = "fcpget",
    about = "Fetch a key from the network and write its payload to a file or standard output"
)]
pub struct GetArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub queue: QueueArgs,

    /// Key URI, optionally followed by an output file.
    #[arg(value_name = "URI [FILE]")]
    pub positional: Vec<String>,
}

impl GetArgs {
    pub fn into_request(self) -> CliResult<GetRequest> {
        if !(1..=2).contains(&self.positional.len()) {
            return Err(CliError::usage(
                "expected a key URI and an optional output file",
            ));
        }
        let options = GetOptions {
            verbosity: self.common.verbosity(),
            persistence: self.queue.persistence()?,
            priority: self.queue.priority()?,
            global: self.queue.global,
            timeout: self.queue.timeout()?,
        };
        let mut positional = self.positional.into_iter();
        Ok(GetRequest {
            uri: positional.next().expect("arity checked"),
            output: positional.next().map(PathBuf::from),
            options,
        })
    }
}

/// fcpput argument set.
#[derive(Parser, Debug)]
#[command(
    name = "fcpput",
    about = "Insert a payload read from a file or standard input under a key"
)]
pub struct PutArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub queue: QueueArgs,

    /// Do not wait for the insert to complete.
    #[arg(short = 'n', long = "nowait")]
    pub nowait: bool,

    /// MIME type recorded with the inserted data.
    #[arg(short = 'm', long = "mimetype", value_name = "TYPE")]
    pub mimetype: Option<String>,

    /// Key URI, optionally followed by an input file (- for standard input).
    #[arg(value_name = "URI [FILE]")]
    pub positional: Vec<String>,
}

impl PutArgs {
    pub fn into_request(self) -> CliResult<PutRequest> {
        if !(1..=2).contains(&self.positional.len()) {
            return Err(CliError::usage(
                "expected a key URI and an optional input file",
            ));
        }
        let options = PutOptions {
            verbosity: self.common.verbosity(),
            persistence: self.queue.persistence()?,
            priority: self.queue.priority()?,
            global: self.queue.global,
            timeout: self.queue.timeout()?,
            mimetype: self.mimetype,
            max_retries: -1,
            nowait: self.nowait,
        };
        let mut positional = self.positional.into_iter();
        Ok(PutRequest {
            uri: positional.next().expect("arity checked"),
            input: positional.next(),
            options,
        })
    }
}

/// fcpgenkey argument set.
#[derive(Parser, Debug)]
#[command(
    name = "fcpgenkey",
    about = "Generate an SSK keypair and print the public and private URIs"
)]
pub struct GenkeyArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Accepted for command-line compatibility; not used.
    #[arg(value_name = "URI")]
    pub positional: Vec<String>,
}

impl GenkeyArgs {
    pub fn validate(&self) -> CliResult<()> {
        if self.positional.len() > 1 {
            return Err(CliError::usage("expected at most one argument"));
        }
        Ok(())
    }
}

/// fcpinvertkey argument set.
#[derive(Parser, Debug)]
#[command(
    name = "fcpinvertkey",
    about = "Derive the public URI for a private key URI"
)]
pub struct InvertkeyArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Private key URI (read from standard input if omitted).
    #[arg(value_name = "URI")]
    pub positional: Vec<String>,
}

impl InvertkeyArgs {
    pub fn uri(&self) -> CliResult<Option<&str>> {
        match self.positional.as_slice() {
            [] => Ok(None),
            [uri] => Ok(Some(uri)),
            _ => Err(CliError::usage("expected at most one key URI")),
        }
    }
}
