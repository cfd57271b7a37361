use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use client_core::OMDB_BASE_URL;
use serde::Deserialize;
use tracing::warn;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub omdb_base_url: String,
    pub omdb_api_key: Option<String>,
    pub search_debounce_ms: u64,
    pub session_cookie: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".into(),
            omdb_base_url: OMDB_BASE_URL.into(),
            omdb_api_key: None,
            search_debounce_ms: 500,
            session_cookie: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    omdb_base_url: Option<String>,
    omdb_api_key: Option<String>,
    search_debounce_ms: Option<u64>,
    session_cookie: Option<String>,
}

impl Settings {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        Url::parse(&self.api_url)
            .with_context(|| format!("invalid list service url '{}'", self.api_url))?;
        Url::parse(&self.omdb_base_url)
            .with_context(|| format!("invalid catalog url '{}'", self.omdb_base_url))?;
        if self.search_debounce_ms > 10_000 {
            bail!(
                "search debounce of {}ms is too long (max 10000)",
                self.search_debounce_ms
            );
        }
        Ok(())
    }
}

pub fn load_settings(path: &Path) -> Settings {
    let mut settings = Settings::default();
    apply_file(&mut settings, path);
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    let file_cfg = match toml::from_str::<FileSettings>(&raw) {
        Ok(file_cfg) => file_cfg,
        Err(error) => {
            warn!(path = %path.display(), %error, "ignoring unreadable config file");
            return;
        }
    };

    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.omdb_base_url {
        settings.omdb_base_url = v;
    }
    if let Some(v) = file_cfg.omdb_api_key {
        settings.omdb_api_key = Some(v);
    }
    if let Some(v) = file_cfg.search_debounce_ms {
        settings.search_debounce_ms = v;
    }
    if let Some(v) = file_cfg.session_cookie {
        settings.session_cookie = Some(v);
    }
}

/// Later keys in each list win over earlier ones.
fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let last = |keys: &[&str]| keys.iter().filter_map(|key| lookup(key)).last();

    if let Some(v) = last(&["CINETRACKR_API_URL", "APP__API_URL"]) {
        settings.api_url = v;
    }
    if let Some(v) = last(&["OMDB_BASE_URL", "APP__OMDB_BASE_URL"]) {
        settings.omdb_base_url = v;
    }
    if let Some(v) = last(&["OMDB_API_KEY", "APP__OMDB_API_KEY"]) {
        settings.omdb_api_key = Some(v);
    }
    if let Some(v) = last(&["APP__SEARCH_DEBOUNCE_MS"]) {
        match v.parse::<u64>() {
            Ok(parsed) => settings.search_debounce_ms = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__SEARCH_DEBOUNCE_MS"),
        }
    }
    if let Some(v) = last(&["CINETRACKR_SESSION", "APP__SESSION_COOKIE"]) {
        settings.session_cookie = Some(v);
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
