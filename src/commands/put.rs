//! Insert command.

use std::io::{Read, Write};

use tracing::info;

use crate::client::{NodeClient, PutOptions, PutOutcome};
use crate::error::{CliError, CliResult};
use crate::io::{read_payload, STDIN_MARKER};
use crate::{mime, uri};

/// Inputs for one insert.
#[derive(Debug)]
pub struct PutRequest {
    pub uri: String,
    /// Source filename; absent or `-` means standard input.
    pub input: Option<String>,
    pub options: PutOptions,
}

/// Execute the insert: read the payload, settle the MIME type, issue one
/// client operation, echo the resulting URI in synchronous mode.
pub fn run<C: NodeClient>(
    client: &mut C,
    progname: &str,
    req: &PutRequest,
    stdin: &mut impl Read,
    stdout: &mut impl Write,
) -> CliResult<()> {
    let target = uri::canonicalize(&req.uri);
    let data = read_payload(req.input.as_deref(), stdin)?;

    let mut options = req.options.clone();
    if options.mimetype.is_none() {
        if let Some(name) = req.input.as_deref().filter(|n| *n != STDIN_MARKER) {
            options.mimetype = mime::guess_type(name).map(str::to_string);
        }
    }
    info!(uri = %target, bytes = data.len(), mimetype = ?options.mimetype, "inserting");

    let outcome = client
        .put(&target, &data, &options)
        .map_err(|source| CliError::Operation {
            progname: progname.to_string(),
            op: "put",
            uri: target.clone(),
            source,
        })?;

    match outcome {
        PutOutcome::Stored(stored) => {
            writeln!(stdout, "{stored}")?;
            Ok(())
        }
        // The request is with the node; nothing to print.
        PutOutcome::Queued => Ok(()),
    }
}
