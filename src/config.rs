//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};

/// Development default values - NEVER use in production.
pub mod defaults {
    pub const DEV_DATABASE_URL: &str = "postgres://ob:ob@localhost:5432/occurrence_book";
    pub const DEV_JWT_SECRET: &str = "dev-jwt-secret-do-not-use-in-production";
    pub const DEV_HOST: &str = "127.0.0.1";
    pub const DEV_PORT: u16 = 8001;
    pub const DEV_DB_MAX_CONNECTIONS: u32 = 10;
    pub const DEV_DB_MIN_CONNECTIONS: u32 = 1;
    pub const DEV_TOKEN_TTL_MINUTES: i64 = 30;
    pub const DEV_UPLOAD_DIR: &str = "./uploads";
    pub const DEV_RECONCILE_INTERVAL_SECS: u64 = 3600;
    pub const DEV_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

    // S3/MinIO defaults for development
    pub const DEV_S3_ENDPOINT: &str = "http://localhost:9100";
    pub const DEV_S3_BUCKET: &str = "occurrence-files";
    pub const DEV_S3_REGION: &str = "us-east-1";
    pub const DEV_S3_ACCESS_KEY: &str = "minioadmin";
    pub const DEV_S3_SECRET_KEY: &str = "minioadmin";
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Check if this is a development environment.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if this is a production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Database connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// PostgreSQL connection string
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Bearer token settings.
#[derive(Clone)]
pub struct TokenSettings {
    /// HS256 signing secret
    pub secret: SecretString,
    /// Token lifetime from issuance
    pub ttl_minutes: i64,
}

impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"[REDACTED]")
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

/// Which blob backend holds uploaded evidence files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    S3,
}

impl StorageBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "local" | "fs" => Some(Self::Local),
            "s3" | "minio" => Some(Self::S3),
            _ => None,
        }
    }
}

/// S3 storage configuration.
#[derive(Debug, Clone)]
pub struct S3Settings {
    /// S3 endpoint URL (for MinIO or custom S3-compatible services)
    pub endpoint: Option<String>,
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

/// Blob storage configuration.
#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// Directory used by the local backend
    pub upload_dir: PathBuf,
    pub s3: S3Settings,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    pub database: DatabaseSettings,
    pub tokens: TokenSettings,
    pub storage: StorageSettings,
    /// Seconds between count reconciliation runs (0 disables the task)
    pub reconcile_interval_secs: u64,
    /// Origins allowed by CORS in development
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In development mode (RUST_ENV=development) every variable has a
    /// default. In production mode the server will NOT start if the
    /// database URL, JWT secret or S3 credentials are development defaults.
    ///
    /// Environment variables:
    /// - `RUST_ENV`: Environment (development/production) - REQUIRED
    /// - `OB_HOST`, `OB_PORT`: bind address (default: 127.0.0.1:8001)
    /// - `DATABASE_URL`: PostgreSQL connection string
    /// - `OB_DB_MAX_CONNECTIONS`, `OB_DB_MIN_CONNECTIONS`: pool bounds
    /// - `OB_JWT_SECRET`: HS256 signing secret
    /// - `OB_TOKEN_TTL_MINUTES`: bearer token lifetime (default: 30)
    /// - `OB_STORAGE_BACKEND`: `local` or `s3` (default: local)
    /// - `OB_UPLOAD_DIR`: directory for the local backend
    /// - `S3_ENDPOINT`, `S3_BUCKET`, `S3_REGION`, `S3_ACCESS_KEY`, `S3_SECRET_KEY`
    /// - `OB_RECONCILE_INTERVAL_SECS`: count reconciliation interval (0 disables)
    /// - `OB_CORS_ORIGINS`: comma-separated origins allowed in development
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_str = env::var("RUST_ENV").map_err(|_| ConfigError::MissingEnvVar("RUST_ENV"))?;

        let environment = Environment::parse(&env_str).ok_or(ConfigError::InvalidValue(
            "RUST_ENV must be 'development' or 'production'",
        ))?;

        let host = env::var("OB_HOST").unwrap_or_else(|_| defaults::DEV_HOST.to_string());

        let port = env::var("OB_PORT")
            .unwrap_or_else(|_| defaults::DEV_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("OB_PORT must be a valid port number"))?;

        let database = DatabaseSettings {
            url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| defaults::DEV_DATABASE_URL.to_string()),
            max_connections: env::var("OB_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| defaults::DEV_DB_MAX_CONNECTIONS.to_string())
                .parse::<u32>()
                .map_err(|_| {
                    ConfigError::InvalidValue("OB_DB_MAX_CONNECTIONS must be a valid number")
                })?,
            min_connections: env::var("OB_DB_MIN_CONNECTIONS")
                .unwrap_or_else(|_| defaults::DEV_DB_MIN_CONNECTIONS.to_string())
                .parse::<u32>()
                .map_err(|_| {
                    ConfigError::InvalidValue("OB_DB_MIN_CONNECTIONS must be a valid number")
                })?,
        };

        let ttl_minutes = env::var("OB_TOKEN_TTL_MINUTES")
            .unwrap_or_else(|_| defaults::DEV_TOKEN_TTL_MINUTES.to_string())
            .parse::<i64>()
            .ok()
            .filter(|m| *m > 0)
            .ok_or(ConfigError::InvalidValue(
                "OB_TOKEN_TTL_MINUTES must be a positive number",
            ))?;

        let tokens = TokenSettings {
            secret: SecretString::from(
                env::var("OB_JWT_SECRET").unwrap_or_else(|_| defaults::DEV_JWT_SECRET.to_string()),
            ),
            ttl_minutes,
        };

        let backend = match env::var("OB_STORAGE_BACKEND") {
            Ok(v) => StorageBackend::parse(&v).ok_or(ConfigError::InvalidValue(
                "OB_STORAGE_BACKEND must be 'local' or 's3'",
            ))?,
            Err(_) => StorageBackend::Local,
        };

        let storage = StorageSettings {
            backend,
            upload_dir: PathBuf::from(
                env::var("OB_UPLOAD_DIR").unwrap_or_else(|_| defaults::DEV_UPLOAD_DIR.to_string()),
            ),
            s3: S3Settings {
                endpoint: env::var("S3_ENDPOINT").ok().or_else(|| {
                    if environment.is_development() {
                        Some(defaults::DEV_S3_ENDPOINT.to_string())
                    } else {
                        None
                    }
                }),
                bucket: env::var("S3_BUCKET")
                    .unwrap_or_else(|_| defaults::DEV_S3_BUCKET.to_string()),
                region: env::var("S3_REGION")
                    .unwrap_or_else(|_| defaults::DEV_S3_REGION.to_string()),
                access_key: env::var("S3_ACCESS_KEY")
                    .unwrap_or_else(|_| defaults::DEV_S3_ACCESS_KEY.to_string()),
                secret_key: env::var("S3_SECRET_KEY")
                    .unwrap_or_else(|_| defaults::DEV_S3_SECRET_KEY.to_string()),
            },
        };

        let reconcile_interval_secs = env::var("OB_RECONCILE_INTERVAL_SECS")
            .unwrap_or_else(|_| defaults::DEV_RECONCILE_INTERVAL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue("OB_RECONCILE_INTERVAL_SECS must be a valid number")
            })?;

        let cors_origins = parse_origins(
            &env::var("OB_CORS_ORIGINS").unwrap_or_else(|_| defaults::DEV_CORS_ORIGINS.to_string()),
        );

        let config = Config {
            environment,
            host,
            port,
            database,
            tokens,
            storage,
            reconcile_interval_secs,
            cors_origins,
        };

        if environment.is_production() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Validate that production configuration does not use development defaults.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.database.url == defaults::DEV_DATABASE_URL {
            errors.push(format!(
                "DATABASE_URL is using development default '{}'. Set a production PostgreSQL URL.",
                defaults::DEV_DATABASE_URL
            ));
        }

        if self.tokens.secret.expose_secret() == defaults::DEV_JWT_SECRET {
            errors.push(
                "OB_JWT_SECRET is using development default. Set a strong signing secret."
                    .to_string(),
            );
        }

        if self.storage.backend == StorageBackend::S3
            && (self.storage.s3.access_key == defaults::DEV_S3_ACCESS_KEY
                || self.storage.s3.secret_key == defaults::DEV_S3_SECRET_KEY)
        {
            errors.push(
                "S3_ACCESS_KEY/S3_SECRET_KEY are using development defaults. Set production S3 credentials."
                    .to_string(),
            );
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}
