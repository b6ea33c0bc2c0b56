//! fcpinvertkey binary entry point.

use clap::{CommandFactory, Parser};

use fcptools::cli::InvertkeyArgs;
use fcptools::client::{FcpConnection, NodeClient};
use fcptools::commands::invertkey;
use fcptools::error::{report, CliError, CliResult};
use fcptools::init_logging;

const PROGNAME: &str = "fcpinvertkey";

fn main() {
    let args = InvertkeyArgs::parse();
    if args.common.version {
        println!("This is {}, version {}", PROGNAME, env!("CARGO_PKG_VERSION"));
        return;
    }

    let verbosity = args.common.verbosity();
    init_logging(verbosity);

    if let Err(e) = run(&args) {
        report(&e, verbosity.is_verbose());
        if e.is_usage() {
            eprintln!("{}", InvertkeyArgs::command().render_usage());
        }
        std::process::exit(e.exit_code());
    }
}

fn run(args: &InvertkeyArgs) -> CliResult<()> {
    let key = args.uri()?;
    let (host, port) = args.common.endpoint()?;
    let verbosity = args.common.verbosity();

    let mut client = FcpConnection::connect(&host, port, verbosity).map_err(|source| {
        CliError::Connect {
            host: host.clone(),
            port,
            source,
        }
    })?;
    let result = invertkey::run(&mut client, key, &mut std::io::stdin(), &mut std::io::stdout());
    // Shut down on every exit path; a second call is swallowed.
    let _ = client.shutdown();
    result
}
