//! Fetch command.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::client::{GetOptions, NodeClient};
use crate::error::{CliError, CliResult};
use crate::{io, mime, uri};

/// Inputs for one fetch.
#[derive(Debug)]
pub struct GetRequest {
    pub uri: String,
    pub output: Option<PathBuf>,
    pub options: GetOptions,
}

/// Execute the fetch: one client operation, then route the payload.
pub fn run<C: NodeClient>(
    client: &mut C,
    progname: &str,
    req: &GetRequest,
    stdout: &mut impl Write,
) -> CliResult<()> {
    let target = uri::canonicalize(&req.uri);
    info!(uri = %target, "fetching");

    let fetched = client
        .get(&target, &req.options)
        .map_err(|source| CliError::Operation {
            progname: progname.to_string(),
            op: "get",
            uri: target.clone(),
            source,
        })?;

    let output = req
        .output
        .as_deref()
        .map(|path| resolve_output_path(path, fetched.mimetype.as_deref()));
    io::write_payload(&fetched.data, output.as_deref(), stdout)?;
    if let Some(path) = output {
        info!(path = %path.display(), bytes = fetched.data.len(), "payload written");
    }
    Ok(())
}

/// Append an extension for the served MIME type when the target has none
/// and the type is known; otherwise the path stands.
fn resolve_output_path(path: &Path, mimetype: Option<&str>) -> PathBuf {
    if path.extension().is_some() {
        return path.to_path_buf();
    }
    match mimetype.and_then(mime::extension_for) {
        Some(ext) => path.with_extension(ext),
        None => path.to_path_buf(),
    }
}
