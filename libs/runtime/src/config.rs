//! Application configuration.
//!
//! Sources, later ones winning: serde defaults, the YAML file, then
//! `APP__`-prefixed environment variables (`APP__SERVER__PORT=9000` sets
//! `server.port`).

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::paths::resolve_home_dir;

pub const ENV_PREFIX: &str = "APP__";
const HOME_SUBDIR: &str = ".users-server";
const MEMORY_DSN: &str = "sqlite::memory:";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// `None` keeps users in process memory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Base for relative log and database paths. Empty picks `~/.users-server`;
    /// always absolute after loading.
    pub home_dir: String,
    pub host: String,
    pub port: u16,
    /// 0 keeps the ingress default.
    pub timeout_sec: u64,
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            home_dir: String::new(),
            host: "127.0.0.1".into(),
            port: 8087,
            timeout_sec: 0,
            cors_enabled: false,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `sqlite://relative/or/absolute.db` or `sqlite::memory:`.
    pub url: String,
    #[serde(default)]
    pub max_conns: Option<u32>,
    #[serde(default)]
    pub busy_timeout_ms: Option<u32>,
}

impl DatabaseConfig {
    fn sqlite_file(path: &str) -> Self {
        Self {
            url: format!("sqlite://{path}"),
            max_conns: Some(10),
            busy_timeout_ms: Some(5000),
        }
    }
}

/// Per-subsystem log settings keyed by tracing target prefix; "default"
/// covers every target without its own entry.
pub type LoggingConfig = HashMap<String, LogSection>;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    #[serde(default = "level_info")]
    pub console_level: String,
    /// Empty disables file output for this subsystem.
    #[serde(default)]
    pub file: String,
    #[serde(default = "level_debug")]
    pub file_level: String,
    #[serde(default)]
    pub max_age_days: Option<u32>,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

fn level_info() -> String {
    "info".into()
}

fn level_debug() -> String {
    "debug".into()
}

pub fn default_logging_config() -> LoggingConfig {
    HashMap::from([(
        "default".to_string(),
        LogSection {
            console_level: level_info(),
            file: "logs/users-server.log".into(),
            file_level: level_debug(),
            max_age_days: Some(7),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    )])
}

/// Overrides collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
    pub mock: bool,
}

impl AppConfig {
    /// Settings used when no config file is given: a SQLite file under the
    /// home dir and the default log sections.
    pub fn bundled() -> Self {
        Self {
            server: ServerConfig::default(),
            database: Some(DatabaseConfig::sqlite_file("database/users.db")),
            logging: Some(default_logging_config()),
        }
    }

    /// Read `path`, layer the environment on top and resolve the home dir
    /// (creating it).
    pub fn load_layered(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("Config file not found: {}", path.display());
        }

        let mut config: AppConfig = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to parse yaml config file {}", path.display()))?;

        config.resolve_home_dir()?;
        Ok(config)
    }

    /// [`load_layered`](Self::load_layered) when a path is given, otherwise
    /// [`bundled`](Self::bundled) with the home dir resolved.
    pub fn load_or_default(path: Option<impl AsRef<Path>>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_layered(path);
        }
        let mut config = Self::bundled();
        config.resolve_home_dir()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// `--port` replaces the port, `--mock` swaps the store for a throwaway
    /// SQLite database, each `-v` raises the default console level.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        if args.mock {
            match &mut self.database {
                Some(db) => db.url = MEMORY_DSN.into(),
                None => {
                    self.database = Some(DatabaseConfig {
                        url: MEMORY_DSN.into(),
                        max_conns: None,
                        busy_timeout_ms: None,
                    })
                }
            }
        }

        let level = match args.verbose {
            0 => return,
            1 => "debug",
            _ => "trace",
        };
        self.logging
            .get_or_insert_with(default_logging_config)
            .entry("default".to_string())
            .and_modify(|s| s.console_level = level.into());
    }

    fn resolve_home_dir(&mut self) -> Result<()> {
        let configured = Some(self.server.home_dir.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        let resolved = resolve_home_dir(configured, HOME_SUBDIR, true)
            .context("Failed to resolve server.home_dir")?;
        self.server.home_dir = resolved.to_string_lossy().into_owned();
        Ok(())
    }
}
