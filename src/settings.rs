use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::locales::LocaleSet;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");
const SETTINGS_FILE: &str = "i18n-add-or-update.toml";
const LOCAL_SETTINGS_FILE: &str = "i18n-add-or-update.local.toml";

#[derive(Debug, Clone)]
pub struct Settings {
    pub locales: LocaleSet,
    pub locales_dir: PathBuf,
    pub editor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    locales: Option<LocaleSettings>,
    editor: Option<EditorSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct LocaleSettings {
    supported: Option<Vec<String>>,
    directory: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct EditorSettings {
    command: Option<String>,
}

/// Collected layers before the locale list is validated.
#[derive(Debug)]
struct RawSettings {
    supported: Vec<String>,
    locales_dir: PathBuf,
    editor: Option<String>,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            supported: Vec::new(),
            locales_dir: PathBuf::from("config/locales"),
            editor: None,
        }
    }
}

/// Loads the compiled-in defaults, then the working-directory files, then
/// `extra_path`. Later layers win.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    load_settings_from(Path::new("."), extra_path)
}

pub(crate) fn load_settings_from(base_dir: &Path, extra_path: Option<&Path>) -> Result<Settings> {
    let mut raw = RawSettings::default();
    let defaults: SettingsFile =
        toml::from_str(DEFAULT_SETTINGS_TOML).with_context(|| "failed to parse default settings")?;
    raw.merge(defaults);

    let mut ordered_paths = vec![base_dir.join(SETTINGS_FILE), base_dir.join(LOCAL_SETTINGS_FILE)];

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            raw.merge(parsed);
        }
    }

    raw.finish()
}

impl RawSettings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(locales) = incoming.locales {
            if let Some(supported) = locales.supported {
                if !supported.is_empty() {
                    self.supported = supported;
                }
            }
            if let Some(directory) = locales.directory {
                if !directory.trim().is_empty() {
                    self.locales_dir = PathBuf::from(directory.trim());
                }
            }
        }
        if let Some(editor) = incoming.editor {
            if let Some(command) = editor.command {
                if !command.trim().is_empty() {
                    self.editor = Some(command.trim().to_string());
                }
            }
        }
    }

    fn finish(self) -> Result<Settings> {
        let locales = LocaleSet::new(&self.supported)
            .with_context(|| "invalid [locales] supported setting")?;
        Ok(Settings {
            locales,
            locales_dir: self.locales_dir,
            editor: self.editor,
        })
    }
}
