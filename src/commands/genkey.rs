//! Keypair generation command.

use std::io::Write;

use crate::client::NodeClient;
use crate::error::CliResult;

/// Generate one SSK keypair and print the public URI, then the private
/// URI, each on its own line.
pub fn run<C: NodeClient>(client: &mut C, stdout: &mut impl Write) -> CliResult<()> {
    let keypair = client.genkey()?;
    write!(stdout, "{}\n{}\n", keypair.public_uri, keypair.private_uri)?;
    stdout.flush()?;
    Ok(())
}
