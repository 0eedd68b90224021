use anyhow::{Context, Result, anyhow};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::views::AgentSettings;

pub const DEV_API_BASE: &str = "http://localhost:5000";
pub const PROD_API_BASE: &str = "https://mailboxiq-backend.onrender.com";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    /// `development` talks to the local backend, anything else to the hosted one.
    pub environment: Option<String>,
    /// Overrides the environment-derived base URL.
    pub api_base: Option<String>,
    /// 0 disables the timeout.
    pub request_timeout_secs: Option<u64>,
    /// JSON list of emails served when the backend is unreachable.
    pub offline_seed: Option<String>,
    pub tone: Option<String>,
    pub auto_save_drafts: Option<bool>,
}

/// Values given on the command line or through `MAILBOXIQ_*` variables.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_base: Option<String>,
    pub environment: Option<String>,
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow!("no config dir available"))?
        .join("mailboxiq"))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

pub fn log_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("mailboxiq.log");
    Ok(p)
}

/// Load the config file, writing a template on first run.
pub fn load_config() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        let sample = Config {
            environment: Some("production".to_string()),
            api_base: None,
            request_timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            offline_seed: None,
            tone: Some("neutral".to_string()),
            auto_save_drafts: Some(true),
        };
        let tom = toml::to_string_pretty(&sample)?;
        fs::write(&path, tom)?;
        info!("Created template config at {}", path.display());
        return Ok(sample);
    }
    let s = fs::read_to_string(&path)?;
    let cfg: Config =
        toml::from_str(&s).with_context(|| format!("invalid config at {}", path.display()))?;
    Ok(cfg)
}

pub fn resolve_api_base(cfg: &Config, overrides: &Overrides) -> Result<Url> {
    let explicit = overrides.api_base.as_ref().or(cfg.api_base.as_ref());
    let raw = match explicit {
        Some(base) => base.clone(),
        None => {
            let env = overrides
                .environment
                .as_deref()
                .or(cfg.environment.as_deref())
                .unwrap_or("production");
            if env.eq_ignore_ascii_case("development") {
                DEV_API_BASE.to_string()
            } else {
                PROD_API_BASE.to_string()
            }
        }
    };
    let url = Url::parse(&raw).with_context(|| format!("invalid api base '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!("api base must be http(s), got '{raw}'"));
    }
    Ok(url)
}

pub fn request_timeout(cfg: &Config) -> Option<Duration> {
    match cfg.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS) {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    }
}

pub fn resolve_seed_path(cfg: &Config) -> Option<PathBuf> {
    cfg.offline_seed.as_ref().map(PathBuf::from)
}

pub fn agent_settings(cfg: &Config) -> AgentSettings {
    AgentSettings {
        tone: cfg.tone.clone().filter(|t| !t.trim().is_empty()),
        auto_save_drafts: cfg.auto_save_drafts.unwrap_or(true),
    }
}
