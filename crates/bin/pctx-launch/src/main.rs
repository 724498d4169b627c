//! Launcher for the prompt context server.
//!
//! Resolves launch settings from flags or a JSON config file, starts the
//! server with its output captured in a log file, and waits for it to exit
//! or for Ctrl+C.

mod config;
mod logging;
mod supervisor;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use crate::config::{LAUNCHER_LOG, LaunchArgs, LaunchConfig};
use crate::supervisor::{SupervisorExit, supervise};

#[tokio::main]
async fn main() -> ExitCode {
    let args = LaunchArgs::parse();
    if let Err(err) = logging::init(Path::new(LAUNCHER_LOG)) {
        eprintln!("failed to initialize logging at {LAUNCHER_LOG}: {err}");
        return ExitCode::FAILURE;
    }

    let config = match LaunchConfig::resolve(args) {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match supervise(&config, interrupt_signal()).await {
        Ok(SupervisorExit::Exited(status)) => {
            info!(%status, "server exited");
            ExitCode::SUCCESS
        }
        Ok(SupervisorExit::Interrupted) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn interrupt_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl+C: {err}");
        std::future::pending::<()>().await;
    }
}
