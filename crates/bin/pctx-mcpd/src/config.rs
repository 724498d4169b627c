use clap::Parser;
use pctx_store::schema::{DEFAULT_DB_NAME, DEFAULT_DB_NAMESPACE, is_valid_collection_name};
use std::error::Error;
use std::fmt;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pctx-mcpd", version, about = "Prompt context MCP server.")]
struct CliArgs {
    /// Directory of the persistent vector store.
    #[arg(long = "chromadb-path", short = 'd', visible_alias = "store-path")]
    store_path: PathBuf,

    /// Collection to query inside the store.
    #[arg(long, short = 'c')]
    collection_name: String,

    #[arg(long, env = "PCTX_DB_NAMESPACE", default_value = DEFAULT_DB_NAMESPACE)]
    db_namespace: String,

    #[arg(long, env = "PCTX_DB_NAME", default_value = DEFAULT_DB_NAME)]
    db_name: String,

    /// Where the embedding model is downloaded and cached.
    #[arg(long, env = "PCTX_MODEL_CACHE_DIR")]
    model_cache_dir: Option<PathBuf>,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub store_path: PathBuf,
    pub collection_name: String,
    pub db_namespace: String,
    pub db_name: String,
    pub model_cache_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value:?}")
            }
        }
    }
}

impl Error for ConfigError {}

impl ServerConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.store_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "--chromadb-path",
                value: String::new(),
            });
        }

        if !is_valid_collection_name(&args.collection_name) {
            return Err(ConfigError::InvalidSetting {
                name: "--collection-name",
                value: args.collection_name,
            });
        }

        if args.db_namespace.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "PCTX_DB_NAMESPACE",
                value: args.db_namespace,
            });
        }

        if args.db_name.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "PCTX_DB_NAME",
                value: args.db_name,
            });
        }

        let model_cache_dir = args
            .model_cache_dir
            .filter(|path| !path.as_os_str().is_empty());

        Ok(Self {
            store_path: args.store_path,
            collection_name: args.collection_name,
            db_namespace: args.db_namespace,
            db_name: args.db_name,
            model_cache_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            store_path: PathBuf::from("/var/lib/pctx/store"),
            collection_name: "prompts".to_string(),
            db_namespace: DEFAULT_DB_NAMESPACE.to_string(),
            db_name: DEFAULT_DB_NAME.to_string(),
            model_cache_dir: None,
        }
    }

    #[test]
    fn parses_short_flags() {
        let args = CliArgs::try_parse_from(["pctx-mcpd", "-d", "/data/store", "-c", "prompts"])
            .expect("short flags should parse");

        assert_eq!(args.store_path, PathBuf::from("/data/store"));
        assert_eq!(args.collection_name, "prompts");
    }

    #[test]
    fn parses_long_flags() {
        let args = CliArgs::try_parse_from([
            "pctx-mcpd",
            "--chromadb-path",
            "/data/store",
            "--collection-name",
            "prompts",
        ])
        .expect("long flags should parse");

        let config = ServerConfig::try_from(args).expect("config should parse");
        assert_eq!(config.store_path, PathBuf::from("/data/store"));
        assert_eq!(config.collection_name, "prompts");
    }

    #[test]
    fn requires_store_path_and_collection() {
        assert!(CliArgs::try_parse_from(["pctx-mcpd", "-c", "prompts"]).is_err());
        assert!(CliArgs::try_parse_from(["pctx-mcpd", "-d", "/data/store"]).is_err());
    }

    #[test]
    fn rejects_blank_collection_name() {
        let mut args = base_args();
        args.collection_name = "  ".to_string();

        let err = ServerConfig::try_from(args).expect_err("blank collection should fail");
        assert!(err.to_string().contains("--collection-name"));
    }

    #[test]
    fn drops_empty_model_cache_dir() {
        let mut args = base_args();
        args.model_cache_dir = Some(PathBuf::new());

        let config = ServerConfig::try_from(args).expect("config should parse");
        assert!(config.model_cache_dir.is_none());
    }
}
