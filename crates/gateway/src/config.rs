use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use shared::protocol::DEFAULT_UPSTREAM_URL;
use url::Url;

const SETTINGS_FILE: &str = "gateway.toml";

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub upstream_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".into(),
            upstream_url: DEFAULT_UPSTREAM_URL.into(),
        }
    }
}

/// Defaults, then `gateway.toml`, then environment variables.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    apply_file(&mut settings, Path::new(SETTINGS_FILE));
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    match toml::from_str::<HashMap<String, String>>(&raw) {
        Ok(file_cfg) => {
            if let Some(v) = file_cfg.get("bind_addr") {
                settings.bind_addr = v.clone();
            }
            if let Some(v) = file_cfg.get("upstream_url") {
                settings.upstream_url = v.clone();
            }
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "ignoring unreadable settings file");
        }
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("GATEWAY_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = lookup("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }

    if let Some(v) = lookup("UPSTREAM_URL") {
        settings.upstream_url = v;
    }
    if let Some(v) = lookup("APP__UPSTREAM_URL") {
        settings.upstream_url = v;
    }
}

/// Parses the upstream base. Any query already on it is dropped since the
/// relayed query replaces it wholesale.
pub fn parse_upstream_url(raw: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(raw.trim())
        .with_context(|| format!("invalid upstream url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("upstream url '{raw}' must use http or https");
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
