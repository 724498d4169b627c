//! Child process supervision for the server.
//!
//! The launcher owns one child at a time: it starts the server with its
//! output redirected to a log file, then waits for it to exit or for an
//! interrupt, whichever comes first.

use std::fs::{self, File};
use std::future::Future;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::config::{LaunchConfig, LaunchError};

/// How long a terminated server may take to exit before it is killed.
const TERMINATE_GRACE: Duration = Duration::from_secs(5);

/// How a supervised run ended.
#[derive(Debug)]
pub enum SupervisorExit {
    Exited(ExitStatus),
    Interrupted,
}

/// Builds the server command line: `<server> -d <store path> -c <collection>`.
#[must_use]
pub fn server_command(config: &LaunchConfig) -> Command {
    let mut command = Command::new(&config.server_script);
    command
        .arg("-d")
        .arg(&config.store_path)
        .arg("-c")
        .arg(&config.collection_name);
    command
}

/// Starts the server and blocks until it exits or `interrupt` resolves.
///
/// On interrupt the child is asked to terminate and is reaped. The child's
/// exit status is reported but never treated as a failure.
///
/// # Errors
/// Returns `LaunchError::Io` if the log file cannot be created or the server
/// cannot be spawned.
pub async fn supervise<F>(config: &LaunchConfig, interrupt: F) -> Result<SupervisorExit, LaunchError>
where
    F: Future<Output = ()>,
{
    prepare_log_dirs(&config.log_file)?;
    let log = File::create(&config.log_file).map_err(|source| LaunchError::Io {
        context: format!("failed to create log file {}", config.log_file.display()),
        source,
    })?;
    let log_for_stderr = log.try_clone().map_err(|source| LaunchError::Io {
        context: "failed to share log file with stderr".to_string(),
        source,
    })?;

    let mut command = server_command(config);
    command
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(log_for_stderr));

    info!("starting server: {}", describe(&command));
    info!("server output is written to {}", config.log_file.display());
    let mut child = command.spawn().map_err(|source| LaunchError::Io {
        context: format!("failed to start {}", config.server_script.display()),
        source,
    })?;
    info!(pid = child.id(), "server started, press Ctrl+C to stop");

    let status = tokio::select! {
        status = child.wait() => Some(status),
        () = interrupt => None,
    };

    match status {
        Some(Ok(status)) => Ok(SupervisorExit::Exited(status)),
        Some(Err(source)) => Err(LaunchError::Io {
            context: "failed to wait for server".to_string(),
            source,
        }),
        None => {
            info!("received interrupt, stopping server");
            terminate(&mut child).await;
            info!("server stopped");
            Ok(SupervisorExit::Interrupted)
        }
    }
}

/// Sends SIGTERM and waits for the child, killing it if it outlives
/// [`TERMINATE_GRACE`].
#[cfg(unix)]
async fn terminate(child: &mut Child) {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()) else {
        return;
    };
    if let Err(err) = signal::kill(Pid::from_raw(pid), Signal::SIGTERM) {
        warn!("failed to send SIGTERM to server: {err}");
        force_kill(child).await;
        return;
    }
    match tokio::time::timeout(TERMINATE_GRACE, child.wait()).await {
        Ok(Ok(status)) => info!("server exited with {status}"),
        Ok(Err(err)) => warn!("failed to wait for server: {err}"),
        Err(_) => {
            warn!("server ignored SIGTERM for {TERMINATE_GRACE:?}, killing it");
            force_kill(child).await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate(child: &mut Child) {
    force_kill(child).await;
}

async fn force_kill(child: &mut Child) {
    if let Err(err) = child.kill().await {
        warn!("failed to stop server: {err}");
    }
}

fn prepare_log_dirs(log_file: &Path) -> Result<(), LaunchError> {
    let Some(dir) = log_file.parent().filter(|dir| !dir.as_os_str().is_empty()) else {
        return Ok(());
    };
    fs::create_dir_all(dir).map_err(|source| LaunchError::Io {
        context: format!("failed to create log directory {}", dir.display()),
        source,
    })
}

fn describe(command: &Command) -> String {
    let command = command.as_std();
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
