use anyhow::{anyhow, Result};
use std::collections::HashSet;
use std::fmt;

use crate::translations::KEY_FIELD;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale(String);

impl Locale {
    pub fn new(code: &str) -> Result<Self> {
        let code = normalize_code(code);
        if code.is_empty() {
            return Err(anyhow!("locale code is empty"));
        }
        if code == KEY_FIELD {
            return Err(anyhow!("'{}' is reserved and cannot be a locale code", KEY_FIELD));
        }
        if code.chars().any(|ch| ch == ':' || ch.is_whitespace()) {
            return Err(anyhow!(
                "invalid locale code '{}' (must not contain ':' or whitespace)",
                code
            ));
        }
        Ok(Self(code))
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// Label that opens this locale's field in the scratch file, e.g. `en:`.
    pub fn prefix(&self) -> String {
        format!("{}:", self.0)
    }

    pub fn file_name(&self) -> String {
        format!("{}.yml", self.0)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, duplicate-free set of supported locales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSet {
    locales: Vec<Locale>,
}

impl LocaleSet {
    pub fn new<I, S>(codes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut locales = Vec::new();
        for code in codes {
            let locale = Locale::new(code.as_ref())?;
            if !seen.insert(locale.code().to_string()) {
                return Err(anyhow!("duplicate locale code '{}'", locale));
            }
            locales.push(locale);
        }
        if locales.is_empty() {
            return Err(anyhow!("no supported locales configured"));
        }
        Ok(Self { locales })
    }

    pub fn codes(&self) -> Vec<&str> {
        self.locales.iter().map(Locale::code).collect()
    }

    /// Returns the locale whose `<code>:` label opens `line`.
    pub fn match_line(&self, line: &str) -> Option<&Locale> {
        self.locales.iter().find(|locale| {
            line.strip_prefix(locale.code())
                .is_some_and(|rest| rest.starts_with(':'))
        })
    }
}

impl<'a> IntoIterator for &'a LocaleSet {
    type Item = &'a Locale;
    type IntoIter = std::slice::Iter<'a, Locale>;

    fn into_iter(self) -> Self::IntoIter {
        self.locales.iter()
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_string()
}
