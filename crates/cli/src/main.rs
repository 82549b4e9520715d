//! treewatch - recursive directory change watcher

use clap::Parser;
use cli_lib::{cmd, logging, Cli};
use std::io::{self, Write};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;
use watcher::WatchConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(err) => {
            logging::init(cli.debug);
            return fatal(&err, WatchConfig::default().exit_delay());
        }
    };
    logging::init(config.debug);

    match cmd::watch::run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fatal(&err, config.exit_delay()),
    }
}

/// Report a fatal error on stdout, pause so it can be read, then fail
fn fatal(err: &anyhow::Error, delay: Duration) -> ExitCode {
    tracing::error!("{err:#}");

    let mut out = io::stdout().lock();
    let _ = writeln!(out, "error: {err}");
    let _ = out.flush();
    drop(out);

    if !delay.is_zero() {
        thread::sleep(delay);
    }
    ExitCode::FAILURE
}
