use anyhow::Result;
use pulse::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    pulse::logging::init(cli.common.verbose, cli.common.quiet)?;
    cli.execute()
}
