//! Command-line client tools for the Freenet FCP interface.
//!
//! This crate provides four thin utilities over one FCP client session:
//!
//! - **fcpget**: fetch a key and write the payload to a file or stdout
//! - **fcpput**: insert a payload read from a file or stdin under a key
//! - **fcpgenkey**: generate an SSK keypair and print both URIs
//! - **fcpinvertkey**: derive the public URI from a private key URI
//!
//! plus [`pseudoconfig`], a reader for a restricted configuration dialect.
//!
//! # Quick Start
//!
//! ```bash
//! # Fetch a key to stdout
//! fcpget KSK@gpl.txt
//!
//! # Insert a file, content type guessed from the extension
//! fcpput KSK@gpl.txt gpl.txt
//!
//! # Generate a keypair
//! fcpgenkey
//! ```
//!
//! # Connection
//!
//! All four utilities talk to the FCP service on `127.0.0.1:9481`.
//! Override with `-H`/`-P` or the `FCP_HOST`/`FCP_PORT` environment
//! variables; flags beat the environment, the environment beats the
//! defaults.

pub mod cli;
pub mod client;
pub mod commands;
pub mod error;
pub mod io;
pub mod mime;
pub mod pseudoconfig;
pub mod uri;

pub use error::{CliError, CliResult};

/// Install the tracing subscriber: fmt layer on standard error, filter
/// derived from the verbosity level unless `RUST_LOG` overrides it.
pub fn init_logging(verbosity: client::Verbosity) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
