use std::process::ExitCode;

use clap::Parser;
use console::style;
use dsp::{Error, PROGRAM_NAME, cli::Cli, init_tracing::init_tracing, session::Session};
use tracing::Level;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(if cli.verbose { Level::DEBUG } else { Level::WARN });

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {} {}", PROGRAM_NAME, style("error:").red().bold(), e);
            e.exit_code()
        }
    }
}

async fn run(cli: &Cli) -> Result<(), Error> {
    let mode = cli.display_flags().resolve()?;
    let mut session = Session::new(mode, cli.session_config());

    let report = session.run(&cli.target_flags()).await?;
    print!("{}", report);
    Ok(())
}
