use clap::Parser;
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::error;

pub const LAUNCHER_LOG: &str = "logs/server.log";
pub const DEFAULT_OUTPUT_LOG: &str = "logs/server_output.log";
const SERVER_BIN: &str = "pctx-mcpd";

#[derive(Parser, Debug, Default)]
#[command(name = "pctx-launch", version, about = "Starts the prompt context server.")]
pub struct LaunchArgs {
    /// JSON file with `server_script`, `chromadb_path`, `collection_name` and `log_file` keys.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Server executable to start.
    #[arg(long)]
    pub server_script: Option<PathBuf>,

    #[arg(long)]
    pub chromadb_path: Option<PathBuf>,

    #[arg(long)]
    pub collection_name: Option<String>,

    /// File receiving the server's stdout and stderr.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Flat JSON launch configuration; every key is optional.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server_script: Option<PathBuf>,
    pub chromadb_path: Option<PathBuf>,
    pub collection_name: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// Fully resolved launch parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub server_script: PathBuf,
    pub store_path: PathBuf,
    pub collection_name: String,
    pub log_file: PathBuf,
}

#[derive(Debug)]
pub enum LaunchError {
    MissingSetting(&'static str),
    ConfigRead { path: PathBuf, source: io::Error },
    ConfigParse { path: PathBuf, source: serde_json::Error },
    Io { context: String, source: io::Error },
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::ConfigRead { path, source } => {
                write!(f, "failed to read config file {}: {source}", path.display())
            }
            Self::ConfigParse { path, source } => {
                write!(f, "failed to parse config file {}: {source}", path.display())
            }
            Self::Io { context, source } => write!(f, "{context}: {source}"),
        }
    }
}

impl Error for LaunchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingSetting(_) => None,
            Self::ConfigRead { source, .. } | Self::Io { source, .. } => Some(source),
            Self::ConfigParse { source, .. } => Some(source),
        }
    }
}

/// Reads a JSON launch configuration file.
///
/// # Errors
/// Returns `LaunchError` if the file cannot be read or is not a JSON object
/// with the expected keys.
pub fn load_file_config(path: &Path) -> Result<FileConfig, LaunchError> {
    let raw = std::fs::read_to_string(path).map_err(|source| LaunchError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| LaunchError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

impl LaunchConfig {
    /// Resolves launch parameters from the arguments and, when `--config` was
    /// given, the config file.
    ///
    /// A config file that cannot be loaded is logged and treated as empty.
    ///
    /// # Errors
    /// Returns `LaunchError::MissingSetting` if the store path or collection
    /// name is absent or empty after resolution.
    pub fn resolve(args: LaunchArgs) -> Result<Self, LaunchError> {
        let file = args.config.as_deref().map(|path| {
            load_file_config(path).unwrap_or_else(|err| {
                error!("{err}");
                FileConfig::default()
            })
        });
        Self::from_sources(args, file)
    }

    /// Merges file values over arguments; without a file the arguments are used
    /// as given.
    fn from_sources(args: LaunchArgs, file: Option<FileConfig>) -> Result<Self, LaunchError> {
        let file = file.unwrap_or_default();

        let server_script = file
            .server_script
            .or(args.server_script)
            .unwrap_or_else(default_server_script);
        let store_path = file
            .chromadb_path
            .or(args.chromadb_path)
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or(LaunchError::MissingSetting("chromadb_path"))?;
        let collection_name = file
            .collection_name
            .or(args.collection_name)
            .filter(|name| !name.is_empty())
            .ok_or(LaunchError::MissingSetting("collection_name"))?;
        let log_file = file
            .log_file
            .or(args.log_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_LOG));

        Ok(Self {
            server_script,
            store_path,
            collection_name,
            log_file,
        })
    }
}

/// Prefers a server binary installed next to the launcher, else relies on `PATH`.
fn default_server_script() -> PathBuf {
    let file_name = format!("{SERVER_BIN}{}", std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&file_name)))
        .filter(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(file_name))
}
