use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

pub const DEFAULT_PROXY_USER_HEADER: &str = "X-Remote-User";
pub const DEFAULT_CALENDAR_TIMEZONE: &str = "Europe/London";
pub const DEFAULT_PRODUCT_ID: &str = "-//coursecal//Calendar 1.0//EN";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    SingleUser,
    Proxy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    pub proxy: Option<ProxyAuthConfig>,
    pub single_user: Option<SingleUserAuthConfig>,
}

/// Identity handed over by a trusted reverse proxy.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyAuthConfig {
    #[serde(default = "default_proxy_user_header")]
    pub user_header: String,
}

fn default_proxy_user_header() -> String {
    DEFAULT_PROXY_USER_HEADER.to_owned()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SingleUserAuthConfig {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub serve_origin: Option<String>,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the server address as a string in the format "host:port".
    #[must_use]
    pub fn serve_origin(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// ## Summary
    /// Returns the server origin URL.
    #[must_use]
    pub fn origin(&self) -> String {
        if let Some(origin) = &self.serve_origin {
            origin.clone()
        } else {
            self.serve_origin()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Feed rendering settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// IANA name of the zone used for deadline date math.
    pub timezone: String,
    /// `PRODID` written into every feed.
    pub product_id: String,
}

impl CalendarConfig {
    /// ## Summary
    /// Resolves the configured canonical time zone.
    ///
    /// ## Errors
    /// Returns `InvalidConfiguration` if the name is not a known IANA zone.
    pub fn timezone(&self) -> CoreResult<chrono_tz::Tz> {
        self.timezone.parse::<chrono_tz::Tz>().map_err(|_err| {
            CoreError::InvalidConfiguration(format!(
                "unknown calendar timezone '{}'",
                self.timezone
            ))
        })
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_CALENDAR_TIMEZONE.to_owned(),
            product_id: DEFAULT_PRODUCT_ID.to_owned(),
        }
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8698)?
            .set_default("database.max_connections", 4)?
            .set_default("logging.level", "debug")?
            .set_default("auth.method", "single_user")?
            .set_default("calendar.timezone", DEFAULT_CALENDAR_TIMEZONE)?
            .set_default("calendar.product_id", DEFAULT_PRODUCT_ID)?
            // Env file
            .add_source(
                config::Environment::default()
                    .convert_case(config::Case::Snake)
                    .separator("_")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// ## Summary
    /// Checks settings that deserialize fine but cannot be used.
    ///
    /// ## Errors
    /// Returns `InvalidConfiguration` for an unknown calendar timezone or a
    /// selected auth method without its section.
    pub fn validate(&self) -> CoreResult<()> {
        self.calendar.timezone()?;

        match self.auth.method {
            AuthMethod::SingleUser if self.auth.single_user.is_none() => {
                Err(CoreError::InvalidConfiguration(
                    "auth.method is single_user but auth.single_user is missing".to_owned(),
                ))
            }
            AuthMethod::SingleUser | AuthMethod::Proxy => Ok(()),
        }
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading, deserializing or validating the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    settings.validate()?;
    Ok(settings)
}
