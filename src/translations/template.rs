use super::KEY_FIELD;
use crate::locales::LocaleSet;

pub const DEFAULT_EXPECTED_TRANSLATIONS: usize = 1;

/// Builds the scratch file content: `count` blocks of `key:` plus one label
/// per locale, separated by a blank line.
pub fn render_template(locales: &LocaleSet, count: usize) -> String {
    let block = render_block(locales);
    vec![block; count].join("\n")
}

fn render_block(locales: &LocaleSet) -> String {
    let mut block = String::new();
    block.push_str(KEY_FIELD);
    block.push_str(":\n");
    for locale in locales {
        block.push_str(&locale.prefix());
        block.push('\n');
    }
    block
}
