use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgSslMode;

/// Error raised when a required variable is missing or a value does not parse.
#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has invalid value {:?}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// TLS mode for the server connection. Overrides any `sslmode` in `url`.
    pub ssl_mode: PgSslMode,
    /// Connections kept open at all times.
    pub pool_size: u32,
    /// Extra connections opened under load, on top of `pool_size`.
    pub max_overflow: u32,
    /// How long a request waits for a free connection before failing.
    pub acquire_timeout: Duration,
}

/// Token signing and password hashing settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
}

/// Process-wide settings, loaded once at startup and shared as `web::Data<Config>`.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    pub environment: String,
    pub server_host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

impl DatabaseConfig {
    /// Reads the `DATABASE_URL` and `DB_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        Self::for_url(url)
    }

    /// Settings for `url`, with everything else read from the `DB_*` variables.
    ///
    /// TLS defaults to `require`. Weaker modes are refused in production.
    pub fn for_url(url: String) -> Result<Self, ConfigError> {
        let ssl_mode = parse_var("DB_SSL_MODE", PgSslMode::Require)?;
        if is_production(&environment()) && !is_encrypted(ssl_mode) {
            return Err(ConfigError::Invalid {
                key: "DB_SSL_MODE",
                value: env::var("DB_SSL_MODE").unwrap_or_default(),
            });
        }

        Ok(Self {
            url,
            ssl_mode,
            pool_size: parse_var("DB_POOL_SIZE", 5)?,
            max_overflow: parse_var("DB_MAX_OVERFLOW", 10)?,
            acquire_timeout: Duration::from_secs(parse_var("DB_POOL_TIMEOUT_SECS", 30)?),
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_expiration_hours: i64 = parse_var("JWT_EXPIRATION_HOURS", 24 * 7)?;

        Ok(Self {
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "Todo API".to_string()),
            environment: environment(),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: parse_var("SERVER_PORT", 8000)?,
            cors_origins: parse_origins(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            ),
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?,
                token_ttl: chrono::Duration::hours(jwt_expiration_hours),
                bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            },
        })
    }

    pub fn is_production(&self) -> bool {
        is_production(&self.environment)
    }

    pub fn server_addr(&self) -> (String, u16) {
        (self.server_host.clone(), self.server_port)
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string())
}

fn is_production(environment: &str) -> bool {
    environment.eq_ignore_ascii_case("production")
}

fn is_encrypted(mode: PgSslMode) -> bool {
    matches!(
        mode,
        PgSslMode::Require | PgSslMode::VerifyCa | PgSslMode::VerifyFull
    )
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
