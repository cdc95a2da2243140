use std::{env, net::SocketAddr, path::PathBuf};
use anyhow::{Context, Result};

/// Default cap on a single profile photo upload (5 MiB).
const DEFAULT_UPLOAD_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Longest accepted session lifetime, in days.
const MAX_SESSION_DURATION_DAYS: i64 = 365;

/// Parses `SESSION_DURATION_DAYS`, which must be between 1 and 365.
fn parse_session_duration_days(raw: &str) -> Result<i64> {
    let days: i64 = raw
        .trim()
        .parse()
        .context("Invalid SESSION_DURATION_DAYS")?;
    anyhow::ensure!(
        (1..=MAX_SESSION_DURATION_DAYS).contains(&days),
        "SESSION_DURATION_DAYS must be between 1 and {}, got {}",
        MAX_SESSION_DURATION_DAYS,
        days
    );
    Ok(days)
}

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The URL of the Redis server. Sessions stay in process memory when unset.
    pub redis_url: Option<String>,
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// The duration of a session in days.
    pub session_duration_days: i64,
    /// The directory uploaded files are written to.
    pub upload_dir: PathBuf,
    /// The largest accepted upload, in bytes.
    pub upload_max_bytes: usize,
    /// Origins allowed by CORS.
    pub allowed_origins: Vec<String>,
    /// Whether cookies carry the `Secure` attribute.
    pub secure_cookies: bool,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| {
                "http://localhost:3000,http://127.0.0.1:3000".to_string()
            })
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
                .parse()
                .context("Invalid BIND_ADDR")?,
            session_duration_days: match env::var("SESSION_DURATION_DAYS") {
                Ok(raw) => parse_session_duration_days(&raw)?,
                Err(_) => 7,
            },
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".to_string())
                .into(),
            upload_max_bytes: match env::var("UPLOAD_MAX_BYTES") {
                Ok(raw) => raw.parse().context("Invalid UPLOAD_MAX_BYTES")?,
                Err(_) => DEFAULT_UPLOAD_MAX_BYTES,
            },
            allowed_origins,
            secure_cookies: env::var("APP_ENV")
                .unwrap_or_else(|_| "development".to_string()) == "production",
        })
    }

    /// Session lifetime in seconds.
    pub fn session_ttl_secs(&self) -> u64 {
        self.session_duration_days.max(0) as u64 * 86400
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            redis_url: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            session_duration_days: 7,
            upload_dir: PathBuf::from("uploads"),
            upload_max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            secure_cookies: false,
        }
    }
}
