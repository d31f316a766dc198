use std::{collections::HashMap, fs, path::Path, path::PathBuf};

use gallery_core::PAGE_SIZE;
use tracing::warn;

pub const SETTINGS_FILE: &str = "gallery.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub data_base_url: Option<String>,
    pub page_size: usize,
    pub default_tab: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            data_base_url: None,
            page_size: PAGE_SIZE,
            default_tab: "collection".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

/// Defaults, then the flat `key = "value"` table in `path` if it exists,
/// then environment overrides (`APP__*` aliases win).
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("data_dir") {
                    settings.data_dir = PathBuf::from(v);
                }
                if let Some(v) = file_cfg.get("data_base_url") {
                    settings.data_base_url = Some(v.clone());
                }
                if let Some(v) = file_cfg.get("page_size") {
                    set_page_size(&mut settings, v);
                }
                if let Some(v) = file_cfg.get("default_tab") {
                    settings.default_tab = v.clone();
                }
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "ignoring unreadable settings file")
            }
        }
    }

    for name in ["GALLERY_DATA_DIR", "APP__DATA_DIR"] {
        if let Some(v) = env(name) {
            settings.data_dir = PathBuf::from(v);
        }
    }
    for name in ["GALLERY_DATA_BASE_URL", "APP__DATA_BASE_URL"] {
        if let Some(v) = env(name) {
            settings.data_base_url = Some(v).filter(|url| !url.trim().is_empty());
        }
    }
    for name in ["GALLERY_PAGE_SIZE", "APP__PAGE_SIZE"] {
        if let Some(v) = env(name) {
            set_page_size(&mut settings, &v);
        }
    }
    if let Some(v) = env("APP__DEFAULT_TAB") {
        settings.default_tab = v;
    }

    settings
}

fn set_page_size(settings: &mut Settings, raw: &str) {
    match raw.trim().parse::<usize>() {
        Ok(parsed) if parsed > 0 => settings.page_size = parsed,
        _ => warn!(value = raw, "ignoring invalid page size"),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
