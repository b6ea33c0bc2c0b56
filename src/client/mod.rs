//! Node client contract and typed request options.
//!
//! The four utilities drive exactly one client session per invocation
//! through the [`NodeClient`] trait. [`FcpConnection`] is the production
//! implementation; tests substitute scripted mocks at the same seam.

pub mod conn;
pub mod message;

pub use conn::FcpConnection;
pub use message::FcpMessage;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Default FCP service host.
pub const DEFAULT_FCP_HOST: &str = "127.0.0.1";

/// Default FCP service port.
pub const DEFAULT_FCP_PORT: u16 = 9481;

/// Protocol version announced in the client hello.
pub const FCP_PROTOCOL_VERSION: &str = "2.0";

/// Default priority class; 0 is highest, 6 lowest.
pub const DEFAULT_PRIORITY: u8 = 3;

/// Default operation timeout: one non-leap year.
pub const ONE_YEAR_SECS: u64 = 365 * 24 * 60 * 60;

/// Errors surfaced by the FCP transport.
#[derive(Debug, Error)]
pub enum FcpError {
    /// Socket-level failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The node sent something outside the message grammar, or an
    /// unexpected reply.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The node reported the operation failed.
    #[error("node reported failure: {description}")]
    Failed {
        code: Option<u32>,
        description: String,
    },

    /// The operation deadline passed.
    #[error("operation timed out")]
    Timeout,
}

/// Client verbosity, forwarded to the node and driving the local log filter.
///
/// The numeric scale runs from silent (0) to noisy (7); the wire form is the
/// bare number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Verbosity(pub u32);

impl Verbosity {
    pub const SILENT: Verbosity = Verbosity(0);
    pub const FATAL: Verbosity = Verbosity(1);
    pub const CRITICAL: Verbosity = Verbosity(2);
    pub const ERROR: Verbosity = Verbosity(3);
    pub const INFO: Verbosity = Verbosity(4);
    pub const DETAIL: Verbosity = Verbosity(5);
    pub const DEBUG: Verbosity = Verbosity(6);
    pub const NOISY: Verbosity = Verbosity(7);

    /// Level selected by N occurrences of the verbose flag: zero means
    /// errors only, the first flag selects DETAIL and each further flag
    /// raises the numeric level by one.
    pub fn from_flag_count(count: u8) -> Self {
        if count == 0 {
            Self::ERROR
        } else {
            Verbosity(Self::DETAIL.0 + u32::from(count) - 1)
        }
    }

    /// Whether the level is at or past the verbose threshold.
    pub fn is_verbose(self) -> bool {
        self >= Self::DETAIL
    }

    /// Default directive for the tracing env filter.
    pub fn filter_directive(self) -> &'static str {
        match self.0 {
            0..=3 => "error",
            4 => "info",
            5 => "debug",
            _ => "trace",
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request retention policy on the node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Persistence {
    /// Kept only while this connection lasts.
    #[default]
    Connection,
    /// Kept across reconnects.
    Reboot,
    /// Kept across node restarts.
    Forever,
}

impl FromStr for Persistence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connection" => Ok(Self::Connection),
            "reboot" => Ok(Self::Reboot),
            "forever" => Ok(Self::Forever),
            _ => Err(format!(
                "persistence must be one of connection, reboot or forever, not {s:?}"
            )),
        }
    }
}

impl fmt::Display for Persistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection => write!(f, "connection"),
            Self::Reboot => write!(f, "reboot"),
            Self::Forever => write!(f, "forever"),
        }
    }
}

/// Options for a fetch.
#[derive(Debug, Clone)]
pub struct GetOptions {
    pub verbosity: Verbosity,
    pub persistence: Persistence,
    pub priority: u8,
    pub global: bool,
    pub timeout: Duration,
}

impl Default for GetOptions {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::default(),
            persistence: Persistence::default(),
            priority: DEFAULT_PRIORITY,
            global: false,
            timeout: Duration::from_secs(ONE_YEAR_SECS),
        }
    }
}

/// Options for an insert.
#[derive(Debug, Clone)]
pub struct PutOptions {
    pub verbosity: Verbosity,
    pub persistence: Persistence,
    pub priority: u8,
    pub global: bool,
    pub timeout: Duration,
    /// Content type recorded with the data; the node infers one from the
    /// URI suffix when absent.
    pub mimetype: Option<String>,
    /// Maximum retries; -1 means unbounded.
    pub max_retries: i32,
    /// Return once the node has accepted the request instead of waiting
    /// for the insert to complete.
    pub nowait: bool,
}

impl Default for PutOptions {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::default(),
            persistence: Persistence::default(),
            priority: DEFAULT_PRIORITY,
            global: false,
            timeout: Duration::from_secs(ONE_YEAR_SECS),
            mimetype: None,
            max_retries: -1,
            nowait: false,
        }
    }
}

/// SSK keypair returned by key generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keypair {
    pub public_uri: String,
    pub private_uri: String,
}

/// Payload and content type returned by a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub mimetype: Option<String>,
    pub data: Vec<u8>,
}

/// Result of an insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// The insert completed; the node returned the final URI.
    Stored(String),
    /// nowait insert: the request has been handed to the node.
    Queued,
}

/// One client session against the local node.
///
/// Implementations hold a single connection. `shutdown` is issued on every
/// exit path and must swallow a second call.
pub trait NodeClient {
    /// Generate an SSK keypair.
    fn genkey(&mut self) -> Result<Keypair, FcpError>;

    /// Derive the public (request) URI for a private (insert) URI.
    fn invert_private(&mut self, uri: &str) -> Result<String, FcpError>;

    /// Fetch the payload behind a key.
    fn get(&mut self, uri: &str, opts: &GetOptions) -> Result<Fetched, FcpError>;

    /// Insert a payload under a key.
    fn put(&mut self, uri: &str, data: &[u8], opts: &PutOptions) -> Result<PutOutcome, FcpError>;

    /// Close the session. Idempotent.
    fn shutdown(&mut self) -> Result<(), FcpError>;
}

/// Parse a duration of the form `<n>[s|m|h|d|w]` into seconds.
///
/// A bare number means seconds.
pub fn parse_time(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    let (value, multiplier) = match s.chars().last() {
        Some(unit) if unit.is_ascii_alphabetic() => {
            let mult = match unit {
                's' => 1,
                'm' => 60,
                'h' => 3600,
                'd' => 86_400,
                'w' => 604_800,
                _ => return Err(format!("unknown duration unit {unit:?} in {s:?}")),
            };
            (&s[..s.len() - 1], mult)
        }
        _ => (s, 1),
    };
    value
        .parse::<u64>()
        .map(|n| n * multiplier)
        .map_err(|_| format!("invalid duration {s:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_from_flag_count() {
        assert_eq!(Verbosity::from_flag_count(0), Verbosity::ERROR);
        assert_eq!(Verbosity::from_flag_count(1), Verbosity::DETAIL);
        assert_eq!(Verbosity::from_flag_count(2), Verbosity::DEBUG);
        assert_eq!(Verbosity::from_flag_count(3), Verbosity::NOISY);
        assert_eq!(Verbosity::from_flag_count(4), Verbosity(8));
    }

    #[test]
    fn test_verbosity_filter() {
        assert_eq!(Verbosity::ERROR.filter_directive(), "error");
        assert_eq!(Verbosity::DETAIL.filter_directive(), "debug");
        assert_eq!(Verbosity::NOISY.filter_directive(), "trace");
        assert!(!Verbosity::ERROR.is_verbose());
        assert!(Verbosity::DETAIL.is_verbose());
    }

    #[test]
    fn test_persistence_round_trip() {
        for p in [
            Persistence::Connection,
            Persistence::Reboot,
            Persistence::Forever,
        ] {
            assert_eq!(p.to_string().parse::<Persistence>().unwrap(), p);
        }
        assert!("always".parse::<Persistence>().is_err());
        // No case folding on the wire form.
        assert!("Forever".parse::<Persistence>().is_err());
    }

    #[test]
    fn test_option_defaults() {
        let get = GetOptions::default();
        assert_eq!(get.priority, 3);
        assert_eq!(get.persistence, Persistence::Connection);
        assert!(!get.global);
        assert_eq!(get.timeout, Duration::from_secs(ONE_YEAR_SECS));

        let put = PutOptions::default();
        assert_eq!(put.max_retries, -1);
        assert!(!put.nowait);
        assert!(put.mimetype.is_none());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("30"), Ok(30));
        assert_eq!(parse_time("45s"), Ok(45));
        assert_eq!(parse_time("10m"), Ok(600));
        assert_eq!(parse_time("6h"), Ok(21_600));
        assert_eq!(parse_time("1d"), Ok(86_400));
        assert_eq!(parse_time("2w"), Ok(1_209_600));
    }

    #[test]
    fn test_parse_time_rejects() {
        assert!(parse_time("").is_err());
        assert!(parse_time("tenminutes").is_err());
        assert!(parse_time("5y").is_err());
        assert!(parse_time("m").is_err());
        assert!(parse_time("-5").is_err());
    }
}
