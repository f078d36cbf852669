use std::{env, fs, path::Path, time::Duration};

use crate::{domain::UserId, errors::Error, Result};

/// Typed configuration for the relay.
///
/// Read once at startup; nothing here is reloadable at runtime.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,

    // Admin identity
    pub admin_id: UserId,
    pub admin_username: String,

    // Health endpoint
    pub health_port: u16,

    // Outbound sends
    pub send_timeout: Duration,
}

impl Config {
    /// Config with default runtime settings (used by tests and embedders).
    pub fn new(telegram_bot_token: &str, admin_id: i64, admin_username: &str) -> Self {
        Self {
            telegram_bot_token: telegram_bot_token.to_string(),
            admin_id: UserId(admin_id),
            admin_username: normalize_username(admin_username),
            health_port: 8080,
            send_timeout: Duration::from_millis(15_000),
        }
    }

    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = env_str("BOT_TOKEN")
            .and_then(non_empty)
            .or_else(|| env_str("TELEGRAM_BOT_TOKEN").and_then(non_empty))
            .ok_or_else(|| {
                Error::Config("BOT_TOKEN environment variable is required".to_string())
            })?;

        let admin_id = env_str("ADMIN_ID")
            .ok_or_else(|| Error::Config("ADMIN_ID environment variable is required".to_string()))
            .and_then(|raw| parse_admin_id(&raw))?;

        let admin_username = env_str("ADMIN_USERNAME")
            .map(|s| normalize_username(&s))
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("ADMIN_USERNAME environment variable is required".to_string())
            })?;

        let mut cfg = Self::new(&telegram_bot_token, admin_id, &admin_username);

        if let Some(port) = env_u16("PORT") {
            cfg.health_port = port;
        }
        if let Some(ms) = env_u64("RELAY_SEND_TIMEOUT_MS") {
            cfg.send_timeout = Duration::from_millis(ms.max(1));
        }

        Ok(cfg)
    }
}

fn parse_admin_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| Error::Config(format!("ADMIN_ID must be a numeric user id: {e}")))
}

/// `@name` and `name` are the same handle.
fn normalize_username(raw: &str) -> String {
    raw.trim().trim_start_matches('@').to_string()
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u16(key: &str) -> Option<u16> {
    env_str(key).and_then(|s| s.trim().parse::<u16>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
