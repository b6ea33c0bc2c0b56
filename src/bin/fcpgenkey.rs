//! fcpgenkey binary entry point.

use clap::{CommandFactory, Parser};

use fcptools::cli::GenkeyArgs;
use fcptools::client::{FcpConnection, NodeClient};
use fcptools::commands::genkey;
use fcptools::error::{report, CliError, CliResult};
use fcptools::init_logging;

const PROGNAME: &str = "fcpgenkey";

fn main() {
    let args = GenkeyArgs::parse();
    if args.common.version {
        println!("This is {}, version {}", PROGNAME, env!("CARGO_PKG_VERSION"));
        return;
    }

    let verbosity = args.common.verbosity();
    init_logging(verbosity);

    if let Err(e) = run(args) {
        report(&e, verbosity.is_verbose());
        if e.is_usage() {
            eprintln!("{}", GenkeyArgs::command().render_usage());
        }
        std::process::exit(e.exit_code());
    }
}

fn run(args: GenkeyArgs) -> CliResult<()> {
    args.validate()?;
    let (host, port) = args.common.endpoint()?;
    let verbosity = args.common.verbosity();

    let mut client = FcpConnection::connect(&host, port, verbosity).map_err(|source| {
        CliError::Connect {
            host: host.clone(),
            port,
            source,
        }
    })?;
    let result = genkey::run(&mut client, &mut std::io::stdout());
    // Shut down on every exit path; a second call is swallowed.
    let _ = client.shutdown();
    result
}
