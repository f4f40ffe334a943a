use std::{collections::HashMap, fs, io, net::SocketAddr, path::PathBuf};

use remo_client::{parse_base_url, DEFAULT_API_URL};
use shared::error::ConfigError;

const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_bind: SocketAddr,
    pub api_base_url: String,
    pub access_token: String,
    pub appliance: String,
    pub signals: Vec<String>,
    pub static_dir: PathBuf,
}

/// Raw values before validation; every field may still be missing or blank.
#[derive(Debug)]
struct RawSettings {
    server_bind: String,
    api_base_url: String,
    access_token: Option<String>,
    appliance: Option<String>,
    signals: Option<String>,
    static_dir: String,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            api_base_url: DEFAULT_API_URL.into(),
            access_token: None,
            appliance: None,
            signals: None,
            static_dir: "static".into(),
        }
    }
}

pub fn load_settings() -> Result<Settings, ConfigError> {
    let file = match fs::read_to_string(SETTINGS_FILE) {
        Ok(contents) => Some(contents),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(invalid_file(e)),
    };
    settings_from_sources(file.as_deref(), |key| std::env::var(key).ok())
}

fn invalid_file(error: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidSetting {
        name: SETTINGS_FILE,
        message: error.to_string(),
    }
}

pub(crate) fn settings_from_sources(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, ConfigError> {
    let mut raw = RawSettings::default();

    if let Some(contents) = file {
        let file_cfg =
            toml::from_str::<HashMap<String, String>>(contents).map_err(invalid_file)?;
        if let Some(v) = file_cfg.get("bind_addr") {
            raw.server_bind = v.clone();
        }
        if let Some(v) = file_cfg.get("api_url") {
            raw.api_base_url = v.clone();
        }
        if let Some(v) = file_cfg.get("access_token") {
            raw.access_token = Some(v.clone());
        }
        if let Some(v) = file_cfg.get("appliance") {
            raw.appliance = Some(v.clone());
        }
        if let Some(v) = file_cfg.get("signals") {
            raw.signals = Some(v.clone());
        }
        if let Some(v) = file_cfg.get("static_dir") {
            raw.static_dir = v.clone();
        }
    }

    // Prefixed variables win over the plain ones.
    let lookup = |name: &str| env(&format!("APP__{name}")).or_else(|| env(name));

    if let Some(v) = lookup("SERVER_BIND") {
        raw.server_bind = v;
    }
    if let Some(v) = lookup("NATUREREMO_API_URL") {
        raw.api_base_url = v;
    }
    if let Some(v) = lookup("NATUREREMO_TOKEN") {
        raw.access_token = Some(v);
    }
    if let Some(v) = lookup("APPLIANCE") {
        raw.appliance = Some(v);
    }
    if let Some(v) = lookup("SIGNALS") {
        raw.signals = Some(v);
    }
    if let Some(v) = lookup("STATIC_DIR") {
        raw.static_dir = v;
    }

    raw.validate()
}

impl RawSettings {
    fn validate(self) -> Result<Settings, ConfigError> {
        let access_token = required(self.access_token, "NATUREREMO_TOKEN")?;
        let appliance = required(self.appliance, "APPLIANCE")?;
        let signals = split_signal_names(self.signals.as_deref().unwrap_or_default());
        if signals.is_empty() {
            return Err(ConfigError::EmptySignalList);
        }

        let server_bind = self
            .server_bind
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidSetting {
                name: "SERVER_BIND",
                message: e.to_string(),
            })?;
        parse_base_url(&self.api_base_url).map_err(|e| ConfigError::InvalidSetting {
            name: "NATUREREMO_API_URL",
            message: format!("{e:#}"),
        })?;

        Ok(Settings {
            server_bind,
            api_base_url: self.api_base_url.trim().to_string(),
            access_token,
            appliance,
            signals,
            static_dir: PathBuf::from(self.static_dir),
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingSetting(name))
}

/// Splits a comma-separated list, keeping order and duplicates.
pub fn split_signal_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
