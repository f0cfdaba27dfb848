//! bigblob: resumable, chunked download of one large Azure blob or S3 object.
//!
//! The transfer engine lives in the `resumable-dl` crate; this crate adds the
//! storage providers, settings handling and the command-line front end.

use std::process::ExitCode;

use clap::Parser;
use log::error;

mod cli;
pub mod location;
pub mod providers;
mod report;
pub mod settings;

pub type AppResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

pub fn run() -> ExitCode {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(cli::execute(cli)) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
