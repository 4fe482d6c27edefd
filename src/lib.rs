use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

pub mod editor;
pub mod locales;
pub mod logging;
pub mod report;
pub mod settings;
pub mod store;
pub mod translations;

#[cfg(test)]
mod test_util;

pub use editor::{fetch_translations, CommandEditor, Editor, Interaction};
pub use locales::{Locale, LocaleSet};
pub use report::ReportFormat;
pub use settings::Settings;
pub use store::{LocaleFileOutcome, LocaleStore};
pub use translations::{
    clean_translations, parse_user_input, render_template, TranslationRecord,
    DEFAULT_EXPECTED_TRANSLATIONS,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub count: usize,
    pub editor: Option<String>,
    pub locales_dir: Option<String>,
    pub settings_path: Option<String>,
    pub print_json: bool,
    pub report_format: ReportFormat,
    pub interactive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            count: DEFAULT_EXPECTED_TRANSLATIONS,
            editor: None,
            locales_dir: None,
            settings_path: None,
            print_json: false,
            report_format: ReportFormat::Text,
            interactive: true,
        }
    }
}

pub fn run(config: Config) -> Result<String> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let settings = settings::load_settings(settings_path)?;
    let editor = CommandEditor::resolve(config.editor.as_deref().or(settings.editor.as_deref()));
    run_with_settings(config, settings, &editor)
}

/// Runs one session with already loaded settings and a caller-chosen editor.
pub fn run_with_settings<E: Editor + ?Sized>(
    config: Config,
    settings: Settings,
    editor: &E,
) -> Result<String> {
    if config.count == 0 {
        return Err(anyhow!("expected translation count must be at least 1"));
    }
    let interaction = if config.interactive {
        Interaction::Interactive
    } else {
        Interaction::Quiet
    };

    let batch = fetch_translations(editor, &settings.locales, config.count, interaction)?;
    if config.print_json {
        return report::render_batch(&batch);
    }

    let outcomes = if batch.is_empty() {
        Vec::new()
    } else {
        let dir = config
            .locales_dir
            .map(PathBuf::from)
            .unwrap_or(settings.locales_dir);
        LocaleStore::new(dir).merge(&settings.locales, &batch)?
    };

    let report = report::build_report(&batch, &outcomes);
    report::render_report(&report, config.report_format)
}
