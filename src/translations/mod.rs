use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::locales::Locale;

mod parser;
mod template;

pub use parser::{parse_user_input, UserInputParser};
pub use template::{render_template, DEFAULT_EXPECTED_TRANSLATIONS};

/// Field name that opens a block in the scratch file.
pub const KEY_FIELD: &str = "key";

/// One `key:` block from the scratch file.
///
/// Locale values keep the position of their first occurrence. A value of
/// `None` means the locale label was present but nothing was typed after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationRecord {
    pub key: String,
    values: Vec<(Locale, Option<String>)>,
}

impl TranslationRecord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: Vec::new(),
        }
    }

    pub fn with_value(mut self, locale: Locale, value: &str) -> Self {
        self.set(locale, Some(value.to_string()));
        self
    }

    pub fn set(&mut self, locale: Locale, value: Option<String>) {
        if let Some(slot) = self.values.iter_mut().find(|(code, _)| *code == locale) {
            slot.1 = value;
        } else {
            self.values.push((locale, value));
        }
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(locale, _)| locale.code() == code)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn contains_locale(&self, code: &str) -> bool {
        self.values.iter().any(|(locale, _)| locale.code() == code)
    }

    pub fn values(&self) -> impl Iterator<Item = (&Locale, Option<&str>)> {
        self.values
            .iter()
            .map(|(locale, value)| (locale, value.as_deref()))
    }

    pub fn locale_count(&self) -> usize {
        self.values.len()
    }

    fn drop_empty_values(&mut self) {
        self.values
            .retain(|(_, value)| value.as_deref().is_some_and(|text| !text.is_empty()));
    }
}

impl Serialize for TranslationRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry(KEY_FIELD, &self.key)?;
        for (locale, value) in &self.values {
            map.serialize_entry(locale.code(), value)?;
        }
        map.end()
    }
}

/// Drops records without a key, then locales without a value.
pub fn clean_translations(mut translations: Vec<TranslationRecord>) -> Vec<TranslationRecord> {
    translations.retain(|record| !record.key.is_empty());
    for record in &mut translations {
        record.drop_empty_values();
    }
    translations
}
