use anyhow::Result;
use deb_stager::{cli, config::Config, setup_logging};

fn main() -> Result<()> {
    // Usage errors exit with status 1, help and version with 0
    let args = cli::parse_args();

    setup_logging(args.debug)?;

    let config = Config::from_args(&args)?;

    cli::execute_command(&config)
}
