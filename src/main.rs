use color_eyre::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fbot::cli::{parse_args, run_cli_command, CliCommand, USAGE};
use fbot::config::ClientConfig;

/// Environment variable holding the log filter, e.g. `FBOT_LOG=fbot=debug`.
const LOG_ENV: &str = "FBOT_LOG";

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = match parse_args(std::env::args()) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("fbot: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    init_tracing(args.debug);

    // Version and help do not need configuration
    let config = match args.command {
        CliCommand::Version | CliCommand::Help => ClientConfig::default(),
        _ => ClientConfig::from_env()?,
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_cli_command(args.command, config))
}

/// Log to stderr so replies on stdout stay clean.
fn init_tracing(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
