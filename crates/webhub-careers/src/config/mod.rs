use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_PORT: &str = "3001";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: &str = "587";
const DEFAULT_MAILBOX: &str = "careers@webhub.com";
const DEFAULT_OUTBOX_DIR: &str = "outbox";
const DEFAULT_TABLE: &str = "applications";

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

    /// Internal error messages are only echoed to callers while developing.
    pub fn exposes_error_details(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Top-level configuration for the application, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub mail: MailConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            mail: MailConfig::from_env()?,
            store: StoreConfig::from_env(),
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Credential wrapper that keeps values out of `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

/// Outbound notification settings for the careers inbox.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub transport: MailTransportConfig,
    pub from_address: String,
    pub recipient: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailTransportConfig {
    Smtp {
        host: String,
        port: u16,
        username: String,
        password: Secret,
    },
    File {
        outbox_dir: PathBuf,
    },
}

impl MailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let username = non_empty_var("SMTP_USERNAME");
        let transport = match env::var("MAIL_TRANSPORT")
            .unwrap_or_else(|_| "file".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "smtp" => {
                let host = env::var("SMTP_HOST").unwrap_or_else(|_| DEFAULT_SMTP_HOST.to_string());
                let port = env::var("SMTP_PORT")
                    .unwrap_or_else(|_| DEFAULT_SMTP_PORT.to_string())
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidSmtpPort)?;
                let username = username
                    .clone()
                    .ok_or(ConfigError::MissingVar("SMTP_USERNAME"))?;
                let password =
                    non_empty_var("SMTP_PASSWORD").ok_or(ConfigError::MissingVar("SMTP_PASSWORD"))?;
                MailTransportConfig::Smtp {
                    host,
                    port,
                    username,
                    password: Secret::new(password),
                }
            }
            "file" => MailTransportConfig::File {
                outbox_dir: PathBuf::from(
                    env::var("MAIL_OUTBOX_DIR").unwrap_or_else(|_| DEFAULT_OUTBOX_DIR.to_string()),
                ),
            },
            other => return Err(ConfigError::InvalidMailTransport(other.to_string())),
        };

        let from_address = non_empty_var("MAIL_FROM")
            .or(username)
            .unwrap_or_else(|| DEFAULT_MAILBOX.to_string());
        let recipient =
            non_empty_var("CAREERS_INBOX").unwrap_or_else(|| DEFAULT_MAILBOX.to_string());

        Ok(Self {
            transport,
            from_address,
            recipient,
        })
    }
}

/// Hosted `applications` table settings. Absent credentials disable persistence.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub supabase: Option<SupabaseConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub api_key: Secret,
    pub table: String,
}

impl StoreConfig {
    fn from_env() -> Self {
        let supabase = match (non_empty_var("SUPABASE_URL"), non_empty_var("SUPABASE_KEY")) {
            (Some(url), Some(api_key)) => Some(SupabaseConfig {
                url,
                api_key: Secret::new(api_key),
                table: non_empty_var("SUPABASE_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            }),
            _ => None,
        };

        Self { supabase }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSmtpPort,
    InvalidMailTransport(String),
    MissingVar(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSmtpPort => write!(f, "SMTP_PORT must be a valid u16"),
            ConfigError::InvalidMailTransport(value) => {
                write!(f, "MAIL_TRANSPORT must be 'smtp' or 'file' (found '{value}')")
            }
            ConfigError::MissingVar(key) => {
                write!(f, "{key} is required for the selected mail transport")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidSmtpPort
            | ConfigError::InvalidMailTransport(_)
            | ConfigError::MissingVar(_) => None,
        }
    }
}
