use anyhow::Result;
use clap::Parser;
use scriptdock::cli::{self, Cli, LogLevelArg};
use scriptdock::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli::load_config(cli.config.as_ref())?;

    // CLI --log-level takes precedence, then RUST_LOG, then the config file.
    let configured = config.snapshot().log_level.to_level_filter();
    let cli_level = cli.log_level.map(LogLevelArg::to_level_filter);
    debug::init_log_bridge(debug::resolve_level(cli_level, configured));

    log::info!("Starting scriptdock {}", scriptdock::VERSION);

    let code = cli::run(cli, config)?;
    log::info!("Exiting with code {}", code);
    if code != 0 {
        // No destructors left to run that matter at this point.
        std::process::exit(code);
    }
    Ok(())
}
