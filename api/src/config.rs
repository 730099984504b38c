use std::env;

use anyhow::{bail, Context};

/// Editor tokens stay valid for a week unless configured otherwise
const DEFAULT_EDITOR_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

const DEFAULT_PORT: u16 = 8080;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Key for signing editor tokens (HMAC-SHA256)
    pub editor_token_secret: String,
    pub editor_token_ttl_secs: i64,
    /// Emit `matchmaker_debug` events for recommend and submit
    pub matchmaker_debug: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let editor_token_secret =
            env::var("EDITOR_TOKEN_SECRET").context("EDITOR_TOKEN_SECRET must be set")?;
        if editor_token_secret.trim().is_empty() {
            bail!("EDITOR_TOKEN_SECRET must not be empty");
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: match env::var("PORT") {
                Ok(port) => port.parse().context("PORT must be a valid port number")?,
                Err(_) => DEFAULT_PORT,
            },
            editor_token_secret,
            editor_token_ttl_secs: match env::var("EDITOR_TOKEN_TTL_SECS") {
                Ok(ttl) => ttl
                    .parse()
                    .context("EDITOR_TOKEN_TTL_SECS must be a number of seconds")?,
                Err(_) => DEFAULT_EDITOR_TOKEN_TTL_SECS,
            },
            matchmaker_debug: env::var("MATCHMAKER_DEBUG").is_ok_and(|v| v == "1"),
        })
    }
}
