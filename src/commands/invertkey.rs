//! Private-to-public key inversion command.

use std::io::{Read, Write};

use crate::client::NodeClient;
use crate::error::CliResult;
use crate::uri;

/// Invert the given URI, or one read from `input` (stripped of surrounding
/// whitespace) when no positional was supplied. The resulting URI goes to
/// the sink without a trailing newline.
pub fn run<C: NodeClient>(
    client: &mut C,
    key: Option<&str>,
    input: &mut impl Read,
    stdout: &mut impl Write,
) -> CliResult<()> {
    let key = match key {
        Some(key) => key.to_string(),
        None => {
            let mut buf = String::new();
            input.read_to_string(&mut buf)?;
            buf.trim().to_string()
        }
    };
    let target = uri::canonicalize(&key);
    let public = client.invert_private(&target)?;
    write!(stdout, "{public}")?;
    stdout.flush()?;
    Ok(())
}
