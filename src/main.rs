//! template - starting point for API command-line tools
//!
//! Resolves layered configuration (flags, environment, config file and
//! defaults) before dispatching to the selected command.

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use template_cli::cli::Cli;
use template_cli::config::env::StdEnv;
use template_cli::config::resolver::Resolver;
use template_cli::config::AppContext;
use template_cli::Result;

fn main() {
    // Parse command-line arguments
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_logging(cli.debug);

    if let Err(e) = run(cli) {
        debug!("Command failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    info!("Starting template");

    cli.check_conflicts()?;

    let flags = cli.flag_overrides();
    let context = AppContext::load(&Resolver::new(), cli.resolve_options(), &flags, &StdEnv)?;

    cli.execute(context)
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "template_cli=debug,template=debug" } else { "template_cli=warn,template=warn" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
