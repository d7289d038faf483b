use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub cart_ttl_secs: u64,
    pub cart_sweep_secs: u64,
    pub mail: MailConfig,
}

/// SMTP relay settings. Without a username and password the mailer stays disabled.
#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    pub server: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
}

impl MailConfig {
    pub fn from_env() -> Self {
        Self {
            server: env::var("MAIL_SERVER").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            port: parse_or("MAIL_PORT", 587),
            username: non_empty("MAIL_USERNAME"),
            password: non_empty("MAIL_PASSWORD"),
            from: non_empty("MAIL_FROM"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// Sender address; falls back to the relay login like most SMTP setups expect.
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().or(self.username.as_deref())
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000);
        Ok(Self {
            port,
            database_url,
            host,
            cart_ttl_secs: parse_or("CART_TTL_SECS", 7200),
            cart_sweep_secs: parse_or("CART_SWEEP_SECS", 300),
            mail: MailConfig::from_env(),
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
