use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub database: DatabaseConfig,
    pub services: ServiceConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let database_path =
            env::var("APP_DATABASE_PATH").unwrap_or_else(|_| "enrollment.db".to_string());

        let base_url = env::var("APP_SERVICE_BASE_URL")
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty());
        let lookup_mode = match env::var("APP_LOOKUP_MODE") {
            Ok(raw) => LookupMode::parse(&raw).ok_or(ConfigError::InvalidLookupMode(raw))?,
            Err(_) => LookupMode::Http,
        };
        let timeout_secs = env::var("APP_LOOKUP_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_LOOKUP_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidLookupTimeout)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            database: DatabaseConfig {
                path: database_path,
            },
            services: ServiceConfig {
                base_url,
                lookup_mode,
                lookup_timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Location of the SQLite database shared by the registry and the workflows.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 5;

/// How workflows confirm entities they do not own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupMode {
    /// Call the owning service's read endpoint.
    Http,
    /// Read the registry repositories in-process.
    Local,
}

impl LookupMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "http" | "remote" => Some(Self::Http),
            "local" | "in-process" => Some(Self::Local),
            _ => None,
        }
    }
}

/// Cross-service validation settings.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: Option<String>,
    pub lookup_mode: LookupMode,
    pub lookup_timeout: Duration,
}

impl ServiceConfig {
    /// Base URL of the owning services, defaulting to this server's own address.
    pub fn base_url_for(&self, server: &ServerConfig) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => {
                let host = if server.host == "0.0.0.0" {
                    "127.0.0.1"
                } else {
                    server.host.as_str()
                };
                format!("http://{}:{}", host, server.port)
            }
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLookupMode(String),
    InvalidLookupTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLookupMode(value) => {
                write!(f, "APP_LOOKUP_MODE must be 'http' or 'local', got '{value}'")
            }
            ConfigError::InvalidLookupTimeout => {
                write!(f, "APP_LOOKUP_TIMEOUT_SECS must be a positive number of seconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidLookupMode(_)
            | ConfigError::InvalidLookupTimeout => None,
        }
    }
}
