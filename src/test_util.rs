use std::fs;
use std::path::Path;

use crate::locales::Locale;

pub(crate) fn locale(code: &str) -> Locale {
    Locale::new(code).expect("locale")
}

pub(crate) fn write_locale_file(dir: &Path, code: &str, content: &str) {
    fs::create_dir_all(dir).expect("create locale dir");
    fs::write(dir.join(format!("{}.yml", code)), content).expect("write locale file");
}
