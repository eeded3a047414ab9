// Application configuration
// Reads the process environment (after dotenv) into a typed AppConfig

use thiserror::Error;

/// Session tokens live for 7 days (604800 seconds)
pub const SESSION_TTL_SECS: i64 = 604_800;

/// Default refresh threshold: re-issue once less than 3.5 days remain
pub const DEFAULT_REFRESH_THRESHOLD_SECS: i64 = 302_400;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("invalid value '{value}' for {var}")]
    Invalid { var: &'static str, value: String },
}

/// Settings for the session cookie and sliding expiration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Re-issue a fresh token when a valid one is close to expiry
    pub sliding: bool,
    /// Remaining lifetime (seconds) below which a token is re-issued
    pub refresh_threshold_secs: i64,
    /// Add the `Secure` attribute to the cookie
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sliding: true,
            refresh_threshold_secs: DEFAULT_REFRESH_THRESHOLD_SECS,
            secure_cookie: false,
        }
    }
}

impl SessionConfig {
    /// Whether a token expiring at `exp` should be re-issued at `now`.
    /// Expired tokens never reach this point; verification rejects them first.
    pub fn should_refresh(&self, exp: i64, now: i64) -> bool {
        self.sliding && exp - now < self.refresh_threshold_secs
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// PostgreSQL URL; the in-memory store is used when unset
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub session: SessionConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match non_empty("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value: raw,
            })?,
            None => 4000,
        };

        let jwt_secret = non_empty("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let sliding = match non_empty("SESSION_SLIDING") {
            Some(raw) => parse_bool("SESSION_SLIDING", raw)?,
            None => true,
        };
        let refresh_threshold_secs = match non_empty("SESSION_REFRESH_THRESHOLD_SECS") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(secs) if secs >= 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "SESSION_REFRESH_THRESHOLD_SECS",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_REFRESH_THRESHOLD_SECS,
        };
        let secure_cookie = match non_empty("COOKIE_SECURE") {
            Some(raw) => parse_bool("COOKIE_SECURE", raw)?,
            None => false,
        };

        Ok(Self {
            host,
            port,
            database_url: non_empty("DATABASE_URL"),
            jwt_secret,
            session: SessionConfig {
                sliding,
                refresh_threshold_secs,
                secure_cookie,
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_bool(var: &'static str, raw: String) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { var, value: raw }),
    }
}
