use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    docs2pdf::logging::init().context("init logging")?;

    let cli = docs2pdf::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    docs2pdf::crawl::run(cli).context("crawl")?;

    Ok(())
}
