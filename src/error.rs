//! CLI error types.

use colored::Colorize;
use thiserror::Error;

use crate::client::FcpError;

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;

/// Errors surfaced by the four command-line utilities.
///
/// Option-parse failures (unknown flag, missing flag argument) never reach
/// this type; clap reports them itself and exits 2. Everything here exits 1.
#[derive(Debug, Error)]
pub enum CliError {
    /// Post-parse validation failure: bad port, priority, persistence,
    /// timeout or positional arity. Reported together with the usage line.
    #[error("{0}")]
    Usage(String),

    /// Client construction failure.
    #[error("Failed to connect to FCP service at {host}:{port}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: FcpError,
    },

    /// A fetch or insert that the node did not complete.
    #[error("{progname}: Failed to {op} key {uri}")]
    Operation {
        progname: String,
        op: &'static str,
        uri: String,
        #[source]
        source: FcpError,
    },

    /// Payload source file could not be read.
    #[error("Failed to read input from file {path}")]
    ReadInput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Payload sink file could not be written.
    #[error("Failed to write data to output file {path}")]
    WriteOutput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Transport error outside a fetch or insert (genkey, invertkey).
    #[error("{0}")]
    Fcp(#[from] FcpError),

    /// I/O error on the standard streams.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Create a validation error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Whether the usage line should accompany the message.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    /// Exit code for this error. Usage and runtime failures alike exit 1;
    /// exit 2 belongs to clap's own option-parse errors.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Print an error to standard error, with its source chain when verbose.
pub fn report(err: &CliError, verbose: bool) {
    eprintln!("{} {}", "Error:".red().bold(), err);
    if verbose {
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            eprintln!("  {} {}", "caused by:".yellow(), cause);
            source = cause.source();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_exits_one() {
        assert_eq!(CliError::usage("bad priority").exit_code(), 1);
        assert_eq!(
            CliError::Connect {
                host: "localhost".into(),
                port: 9481,
                source: FcpError::Protocol("refused".into()),
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn test_connect_message() {
        let err = CliError::Connect {
            host: "envhost".into(),
            port: 9482,
            source: FcpError::Protocol("refused".into()),
        };
        assert_eq!(
            err.to_string(),
            "Failed to connect to FCP service at envhost:9482"
        );
    }

    #[test]
    fn test_operation_message() {
        let err = CliError::Operation {
            progname: "fcpget".into(),
            op: "get",
            uri: "freenet:KSK@gpl.txt".into(),
            source: FcpError::Timeout,
        };
        assert_eq!(err.to_string(), "fcpget: Failed to get key freenet:KSK@gpl.txt");
    }

    #[test]
    fn test_usage_flag() {
        assert!(CliError::usage("arity").is_usage());
        assert!(!CliError::Fcp(FcpError::Timeout).is_usage());
    }
}
