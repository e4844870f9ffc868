use anyhow::Context;
use clap::Parser;
use qscript::utils::{logger, palette::Palette};
use qscript::{app, Cli, LocalStorage, ProjectConfig, QscriptError};
use std::io::{IsTerminal, Write};

fn main() {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    match run(&cli) {
        Ok(problems) => std::process::exit(i32::from(problems)),
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("❌ {:#}", e);
            let exit_code = match e.downcast_ref::<QscriptError>() {
                Some(error) => {
                    eprintln!("💡 {}", error.recovery_suggestion());
                    error.exit_code()
                }
                None => 1,
            };
            std::process::exit(exit_code);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<u8> {
    let config = ProjectConfig::load(cli.config.as_deref())
        .context("cannot load the project configuration")?;
    let stdout = std::io::stdout();
    let palette = Palette::new(!cli.no_color && stdout.is_terminal());
    let mut out = stdout.lock();
    let problems = app::run(&cli.command, &LocalStorage::new(), &config, palette, &mut out)?;
    out.flush()?;
    if problems > 0 {
        tracing::debug!("exiting with {} problems", problems);
    }
    Ok(problems)
}
