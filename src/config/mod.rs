use std::env;

const DEFAULT_BACKEND_API_URL: &str = "http://localhost:7000";
const DEFAULT_COOKIE_NAME: &str = "fintrack_session";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_api_url: String,
    pub cookie_name: String,
    pub server_host: String,
    pub server_port: u16,
    pub production: bool,
    pub expose_login_token: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend_api_url: DEFAULT_BACKEND_API_URL.to_string(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            production: false,
            expose_login_token: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, falling back to
    /// the defaults for missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let server_port = match lookup("SERVER_PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "SERVER_PORT",
                    value,
                })?,
            None => defaults.server_port,
        };

        let production = lookup("APP_ENV")
            .map(|value| value.trim().eq_ignore_ascii_case("production"))
            .unwrap_or(defaults.production);

        let expose_login_token = match lookup("EXPOSE_LOGIN_TOKEN") {
            Some(value) => parse_flag("EXPOSE_LOGIN_TOKEN", value)?,
            None => defaults.expose_login_token,
        };

        Ok(Config {
            backend_api_url: lookup("BACKEND_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty())
                .unwrap_or(defaults.backend_api_url),
            cookie_name: lookup("COOKIE_NAME")
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(defaults.cookie_name),
            server_host: lookup("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port,
            production,
            expose_login_token,
        })
    }
}

fn parse_flag(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value }),
    }
}
