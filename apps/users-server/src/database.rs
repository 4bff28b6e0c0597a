//! Opening the SQLite connection behind the durable user store.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use runtime::DatabaseConfig;
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sea_orm::sqlx::ConnectOptions as _;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, SqlxSqliteConnector};
use url::Url;

/// Where a configured `sqlite` URL points.
#[derive(Debug, PartialEq, Eq)]
pub enum SqliteTarget {
    /// Private database that lives as long as its last connection.
    Memory,
    /// A file, already made absolute; `query` keeps any URL options.
    File { path: PathBuf, query: Option<String> },
}

impl SqliteTarget {
    /// Parse `raw`, anchoring relative file paths at `home`.
    pub fn parse(raw: &str, home: &Path) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            bail!("Database URL not configured");
        }
        // `sqlite://:memory:` has an empty host with a bogus port, so it never reaches Url
        let lower = raw.to_ascii_lowercase();
        if lower == "sqlite::memory:" || lower == "sqlite://:memory:" {
            return Ok(Self::Memory);
        }

        let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;
        if !matches!(url.scheme(), "sqlite" | "sqlite3") {
            bail!("Unsupported database type: {}", url.scheme());
        }
        let Some((_, rest)) = raw.split_once("://") else {
            bail!("DSN must look like sqlite://<path> (got: {})", raw);
        };

        let (file, query) = match rest.split_once('?') {
            Some((f, q)) => (f, Some(q.to_string())),
            None => (rest, None),
        };
        if file.is_empty() {
            bail!("Empty SQLite path in DSN");
        }

        let file = PathBuf::from(file);
        let path = if file.is_relative() { home.join(file) } else { file };
        Ok(Self::File { path, query })
    }

    /// Connection string for sqlx; new files are created unless the URL says otherwise.
    pub fn dsn(&self) -> String {
        match self {
            Self::Memory => "sqlite::memory:".to_string(),
            Self::File { path, query } => format!(
                "sqlite://{}?{}",
                path.to_string_lossy().replace('\\', "/"),
                query.as_deref().unwrap_or("mode=rwc")
            ),
        }
    }
}

/// Check the URL without touching the filesystem.
pub fn validate(cfg: &DatabaseConfig, home: &Path) -> Result<()> {
    SqliteTarget::parse(&cfg.url, home).map(|_| ())
}

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn connect(cfg: &DatabaseConfig, home: &Path) -> Result<DatabaseConnection> {
    let target = SqliteTarget::parse(&cfg.url, home)?;
    let busy_timeout = cfg.busy_timeout_ms.map(|ms| Duration::from_millis(u64::from(ms)));

    tracing::info!("Connecting to database: {}", target.dsn());
    let conn = match &target {
        SqliteTarget::Memory => connect_memory(busy_timeout).await,
        SqliteTarget::File { path, .. } => connect_file(&target, path, cfg.max_conns, busy_timeout).await,
    }
    .with_context(|| format!("Failed to connect to database {}", target.dsn()))?;
    tracing::info!("Connected DB backend: {:?}", conn.get_database_backend());
    Ok(conn)
}

/// The data lives as long as the single pooled connection, so that connection
/// is never retired for age or idleness.
async fn connect_memory(busy_timeout: Option<Duration>) -> Result<DatabaseConnection> {
    let mut sqlite = SqliteConnectOptions::from_str(&SqliteTarget::Memory.dsn())?.disable_statement_logging();
    if let Some(t) = busy_timeout {
        sqlite = sqlite.busy_timeout(t);
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .max_lifetime(None)
        .idle_timeout(None)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(sqlite)
        .await?;
    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

async fn connect_file(
    target: &SqliteTarget,
    path: &Path,
    max_conns: Option<u32>,
    busy_timeout: Option<Duration>,
) -> Result<DatabaseConnection> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create database directory {}", dir.display()))?;
    }

    let mut opts = ConnectOptions::new(target.dsn());
    opts.acquire_timeout(ACQUIRE_TIMEOUT).sqlx_logging(false);
    if let Some(max) = max_conns {
        opts.max_connections(max);
    }
    if let Some(t) = busy_timeout {
        opts.map_sqlx_sqlite_opts(move |o| o.busy_timeout(t));
    }
    Ok(Database::connect(opts).await?)
}
