use regex::Regex;
use std::env;
use std::error::Error;
use std::fmt;
use url::Url;

// telegram usernames: 5-32 chars, alphanumeric and underscore
const USERNAME_PATTERN: &str = r"^@?([a-zA-Z0-9_]{5,32})$";
const CHANNEL_PATTERN: &str = r"^(?:@|(?:https?://)?t\.me/)?([a-zA-Z0-9_]{5,32})$";

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { name: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => {
                write!(f, "{} environment variable is required", name)
            }
            ConfigError::Invalid { name, reason } => {
                write!(f, "{} environment variable is invalid: {}", name, reason)
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Clone)]
pub struct BotConfig {
    pub bot_token: String,
    /// bot handle without the leading `@`
    pub bot_username: String,
    /// channel handle in `@name` form, as the Bot API expects it
    pub channel_username: String,
    pub channel_url: Url,
    pub database_url: String,
    pub admin_phone: String,
    pub admin_username: String,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"<redacted>")
            .field("bot_username", &self.bot_username)
            .field("channel_username", &self.channel_username)
            .field("channel_url", &self.channel_url.as_str())
            .field("database_url", &"<redacted>")
            .field("admin_phone", &self.admin_phone)
            .field("admin_username", &self.admin_username)
            .finish()
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// builds the config from any variable source; blank values count as missing
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let bot_token = required("BOT_TOKEN")?;
        let bot_username = Self::extract_username(
            "BOT_USERNAME",
            USERNAME_PATTERN,
            &required("BOT_USERNAME")?,
        )?;
        let channel_name = Self::extract_username(
            "CHANNEL_USERNAME",
            CHANNEL_PATTERN,
            &required("CHANNEL_USERNAME")?,
        )?;
        let channel_url = Url::parse(&format!("https://t.me/{}", channel_name)).map_err(|e| {
            ConfigError::Invalid {
                name: "CHANNEL_USERNAME",
                reason: e.to_string(),
            }
        })?;
        let database_url = required("DATABASE_URL")?;
        let admin_phone = required("ADMIN_PHONE")?;
        let admin_username = required("ADMIN_USERNAME")?;

        Ok(Self {
            bot_token,
            bot_username,
            channel_username: format!("@{}", channel_name),
            channel_url,
            database_url,
            admin_phone,
            admin_username,
        })
    }

    fn extract_username(
        name: &'static str,
        pattern: &str,
        value: &str,
    ) -> Result<String, ConfigError> {
        let regex = Regex::new(pattern).map_err(|e| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        })?;
        regex
            .captures(value)
            .map(|captures| captures[1].to_string())
            .ok_or_else(|| ConfigError::Invalid {
                name,
                reason: format!("'{}' is not a valid telegram username", value),
            })
    }

    /// deep link that attributes signups to `user_id`
    pub fn referral_link(&self, user_id: i64) -> String {
        format!("https://t.me/{}?start={}", self.bot_username, user_id)
    }
}
