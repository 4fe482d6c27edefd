use anyhow::{anyhow, Context, Result};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::locales::{Locale, LocaleSet};
use crate::translations::TranslationRecord;

const DOCUMENT_MARKER: &str = "---\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Added,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleFileOutcome {
    pub locale: Locale,
    pub path: PathBuf,
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
}

impl LocaleFileOutcome {
    fn new(locale: Locale, path: PathBuf) -> Self {
        Self {
            locale,
            path,
            added: Vec::new(),
            updated: Vec::new(),
            unchanged: Vec::new(),
        }
    }

    pub fn is_modified(&self) -> bool {
        !self.added.is_empty() || !self.updated.is_empty()
    }

    fn record(&mut self, key: &str, change: Change) {
        let bucket = match change {
            Change::Added => &mut self.added,
            Change::Updated => &mut self.updated,
            Change::Unchanged => &mut self.unchanged,
        };
        bucket.push(key.to_string());
    }
}

/// Directory of `<locale>.yml` files, each rooted at a mapping named after
/// its locale.
#[derive(Debug, Clone)]
pub struct LocaleStore {
    dir: PathBuf,
}

impl LocaleStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, locale: &Locale) -> PathBuf {
        self.dir.join(locale.file_name())
    }

    /// Writes every locale value of `batch` into its locale file.
    ///
    /// Locales that no record mentions are not touched. Files are only
    /// rewritten when a value changed, and only once every locale merged
    /// cleanly: a failing locale leaves all files as they were.
    ///
    /// Values are written verbatim. The last value of a filled template
    /// block usually ends in `\n` (the blank line separating blocks belongs
    /// to it) and that newline is stored as is.
    pub fn merge(
        &self,
        locales: &LocaleSet,
        batch: &[TranslationRecord],
    ) -> Result<Vec<LocaleFileOutcome>> {
        let mut staged = Vec::new();
        for locale in locales {
            let entries = batch
                .iter()
                .filter_map(|record| {
                    record
                        .get(locale.code())
                        .filter(|value| !value.is_empty())
                        .map(|value| (record.key.as_str(), value))
                })
                .collect::<Vec<_>>();
            if entries.is_empty() {
                continue;
            }

            let path = self.path_for(locale);
            let mut document = load_document(&path, locale)?;
            let root = locale_root(&mut document, locale, &path)?;
            let mut outcome = LocaleFileOutcome::new(locale.clone(), path.clone());
            for (key, value) in entries {
                let change = set_nested(root, key, value)
                    .with_context(|| format!("failed to update {}", path.display()))?;
                debug!(locale = %locale, key, ?change, "merged translation");
                outcome.record(key, change);
            }
            staged.push((document, outcome));
        }

        for (document, outcome) in &staged {
            if !outcome.is_modified() {
                continue;
            }
            save_document(&outcome.path, document)?;
            info!(
                path = %outcome.path.display(),
                added = outcome.added.len(),
                updated = outcome.updated.len(),
                "wrote locale file"
            );
        }
        Ok(staged.into_iter().map(|(_, outcome)| outcome).collect())
    }
}

fn load_document(path: &Path, locale: &Locale) -> Result<Value> {
    if !path.exists() {
        return Ok(empty_document(locale));
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read locale file: {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(empty_document(locale));
    }
    serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse locale file: {}", path.display()))
}

fn empty_document(locale: &Locale) -> Value {
    let mut root = Mapping::new();
    root.insert(
        Value::String(locale.code().to_string()),
        Value::Mapping(Mapping::new()),
    );
    Value::Mapping(root)
}

fn locale_root<'d>(document: &'d mut Value, locale: &Locale, path: &Path) -> Result<&'d mut Mapping> {
    let Value::Mapping(top) = document else {
        return Err(anyhow!(
            "locale file {} does not contain a mapping",
            path.display()
        ));
    };
    let slot = top
        .entry(Value::String(locale.code().to_string()))
        .or_insert(Value::Null);
    if slot.is_null() {
        *slot = Value::Mapping(Mapping::new());
    }
    match slot {
        Value::Mapping(root) => Ok(root),
        _ => Err(anyhow!(
            "locale file {} has a non-mapping '{}' root",
            path.display(),
            locale
        )),
    }
}

/// Sets `a.b.c` to `value` under `root`, creating `a` and `a.b` as needed.
pub(crate) fn set_nested(root: &mut Mapping, key: &str, value: &str) -> Result<Change> {
    let segments = key.split('.').collect::<Vec<_>>();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(anyhow!("invalid translation key '{}' (empty segment)", key));
    }
    let (leaf, parents) = segments
        .split_last()
        .ok_or_else(|| anyhow!("translation key is empty"))?;

    let mut current = root;
    for (depth, segment) in parents.iter().enumerate() {
        let slot = key_for(current, segment);
        match current.get(&slot) {
            Some(Value::Mapping(_)) => {}
            None | Some(Value::Null) => {
                current.insert(slot.clone(), Value::Mapping(Mapping::new()));
            }
            Some(_) => {
                return Err(anyhow!(
                    "cannot add '{}': '{}' already holds a value",
                    key,
                    segments[..=depth].join(".")
                ));
            }
        }
        current = match current.get_mut(&slot) {
            Some(Value::Mapping(child)) => child,
            _ => return Err(anyhow!("failed to descend into '{}'", segment)),
        };
    }

    let slot = key_for(current, leaf);
    let new_value = Value::String(value.to_string());
    let change = match current.get(&slot) {
        Some(existing) if *existing == new_value => return Ok(Change::Unchanged),
        Some(Value::Mapping(_)) => {
            return Err(anyhow!(
                "cannot set '{}': it already holds nested keys",
                key
            ));
        }
        Some(_) => Change::Updated,
        None => Change::Added,
    };
    current.insert(slot, new_value);
    Ok(change)
}

/// Existing key of `map` spelled `segment`, or a new string key.
///
/// YAML loads `404:` or `true:` as non-string keys; they still match the
/// dotted segment that spells them.
fn key_for(map: &Mapping, segment: &str) -> Value {
    if map.contains_key(segment) {
        return Value::String(segment.to_string());
    }
    map.keys()
        .find(|key| match key {
            Value::Number(number) => number.to_string() == segment,
            Value::Bool(flag) => flag.to_string() == segment,
            _ => false,
        })
        .cloned()
        .unwrap_or_else(|| Value::String(segment.to_string()))
}

fn save_document(path: &Path, document: &Value) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create locale dir: {}", dir.display()))?;
    }
    let body = serde_yaml::to_string(document)
        .with_context(|| format!("failed to serialize locale file: {}", path.display()))?;
    let mut content = String::from(DOCUMENT_MARKER);
    content.push_str(body.strip_prefix(DOCUMENT_MARKER).unwrap_or(&body));
    fs::write(path, content)
        .with_context(|| format!("failed to write locale file: {}", path.display()))
}
