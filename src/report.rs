use anyhow::{Context, Result};
use serde::Serialize;

use crate::store::LocaleFileOutcome;
use crate::translations::TranslationRecord;

const NOTHING_ENTERED: &str = "no translations entered";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub totals: Totals,
    pub files: Vec<FileRow>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Totals {
    pub keys: usize,
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileRow {
    pub locale: String,
    pub path: String,
    pub written: bool,
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
}

pub fn build_report(batch: &[TranslationRecord], outcomes: &[LocaleFileOutcome]) -> ReportData {
    let mut totals = Totals {
        keys: batch.len(),
        ..Totals::default()
    };
    let files = outcomes
        .iter()
        .map(|outcome| {
            totals.added += outcome.added.len();
            totals.updated += outcome.updated.len();
            totals.unchanged += outcome.unchanged.len();
            FileRow {
                locale: outcome.locale.code().to_string(),
                path: outcome.path.to_string_lossy().to_string(),
                written: outcome.is_modified(),
                added: outcome.added.clone(),
                updated: outcome.updated.clone(),
                unchanged: outcome.unchanged.clone(),
            }
        })
        .collect();
    ReportData { totals, files }
}

pub fn render_report(report: &ReportData, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(report)),
        ReportFormat::Json => {
            serde_json::to_string_pretty(report).with_context(|| "failed to render JSON report")
        }
    }
}

/// Renders the cleaned batch itself, one object per record.
pub fn render_batch(batch: &[TranslationRecord]) -> Result<String> {
    serde_json::to_string_pretty(batch).with_context(|| "failed to render translations as JSON")
}

fn render_text(report: &ReportData) -> String {
    if report.totals.keys == 0 {
        return NOTHING_ENTERED.to_string();
    }
    let mut lines = Vec::new();
    for file in &report.files {
        if !file.written {
            lines.push(format!("{} ({}): unchanged", file.locale, file.path));
            continue;
        }
        lines.push(format!(
            "{} ({}): {} added, {} updated",
            file.locale,
            file.path,
            file.added.len(),
            file.updated.len()
        ));
        lines.extend(file.added.iter().map(|key| format!("  + {}", key)));
        lines.extend(file.updated.iter().map(|key| format!("  ~ {}", key)));
    }
    lines.join("\n")
}
