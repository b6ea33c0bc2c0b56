//! fcpget binary entry point.

use clap::{CommandFactory, Parser};

use fcptools::cli::GetArgs;
use fcptools::client::{FcpConnection, NodeClient};
use fcptools::commands::get;
use fcptools::error::{report, CliError, CliResult};
use fcptools::init_logging;

const PROGNAME: &str = "fcpget";

fn main() {
    let args = GetArgs::parse();
    if args.common.version {
        println!("This is {}, version {}", PROGNAME, env!("CARGO_PKG_VERSION"));
        return;
    }

    let verbosity = args.common.verbosity();
    init_logging(verbosity);

    if let Err(e) = run(args) {
        report(&e, verbosity.is_verbose());
        if e.is_usage() {
            eprintln!("{}", GetArgs::command().render_usage());
        }
        std::process::exit(e.exit_code());
    }
}

fn run(args: GetArgs) -> CliResult<()> {
    let (host, port) = args.common.endpoint()?;
    let verbosity = args.common.verbosity();
    let req = args.into_request()?;

    let mut client = FcpConnection::connect(&host, port, verbosity).map_err(|source| {
        CliError::Connect {
            host: host.clone(),
            port,
            source,
        }
    })?;
    let result = get::run(&mut client, PROGNAME, &req, &mut std::io::stdout());
    // Shut down on every exit path; a second call is swallowed.
    let _ = client.shutdown();
    result
}
