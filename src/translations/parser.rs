use std::mem;

use tracing::debug;

use super::{TranslationRecord, KEY_FIELD};
use crate::locales::{Locale, LocaleSet};

/// Parses the edited scratch file into records, in `key:` order.
///
/// Never fails: lines that fit nowhere are skipped. The result still holds
/// keyless blocks and empty locales, see [`super::clean_translations`].
pub fn parse_user_input(content: &str, locales: &LocaleSet) -> Vec<TranslationRecord> {
    let mut parser = UserInputParser::new(locales);
    for line in content.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}

#[derive(Debug)]
struct LocaleField {
    locale: Locale,
    value: Option<String>,
}

impl LocaleField {
    fn append(&mut self, line: &str) {
        match self.value.as_mut() {
            Some(value) => {
                value.push('\n');
                value.push_str(line);
            }
            None => self.value = Some(line.to_string()),
        }
    }
}

#[derive(Debug, Default)]
enum ParserState {
    #[default]
    Idle,
    Block(TranslationRecord),
    Locale {
        block: TranslationRecord,
        field: LocaleField,
    },
}

enum Line<'l> {
    Key(&'l str),
    Locale(Locale, Option<&'l str>),
    Text(&'l str),
}

/// Line-at-a-time state machine behind [`parse_user_input`].
#[derive(Debug)]
pub struct UserInputParser<'a> {
    locales: &'a LocaleSet,
    state: ParserState,
    records: Vec<TranslationRecord>,
}

impl<'a> UserInputParser<'a> {
    pub fn new(locales: &'a LocaleSet) -> Self {
        Self {
            locales,
            state: ParserState::Idle,
            records: Vec::new(),
        }
    }

    pub fn feed_line(&mut self, line: &str) {
        let state = mem::take(&mut self.state);
        self.state = match (state, self.classify(line)) {
            (state, Line::Key(key)) => {
                self.flush(state);
                ParserState::Block(TranslationRecord::new(key))
            }
            (ParserState::Idle, Line::Locale(locale, _)) => {
                debug!(locale = %locale, "ignoring locale line outside of a key block");
                ParserState::Idle
            }
            (ParserState::Block(block), Line::Locale(locale, seed)) => ParserState::Locale {
                block,
                field: LocaleField {
                    locale,
                    value: seed.map(str::to_string),
                },
            },
            (ParserState::Locale { mut block, field }, Line::Locale(locale, seed)) => {
                block.set(field.locale, field.value);
                ParserState::Locale {
                    block,
                    field: LocaleField {
                        locale,
                        value: seed.map(str::to_string),
                    },
                }
            }
            (ParserState::Locale { block, mut field }, Line::Text(text)) => {
                field.append(text);
                ParserState::Locale { block, field }
            }
            (state, Line::Text(text)) => {
                if !text.is_empty() {
                    debug!(line = text, "ignoring text outside of a locale field");
                }
                state
            }
        };
    }

    pub fn finish(mut self) -> Vec<TranslationRecord> {
        let state = mem::take(&mut self.state);
        self.flush(state);
        debug!(records = self.records.len(), "parsed user input");
        self.records
    }

    fn flush(&mut self, state: ParserState) {
        match state {
            ParserState::Idle => {}
            ParserState::Block(block) => self.records.push(block),
            ParserState::Locale { mut block, field } => {
                block.set(field.locale, field.value);
                self.records.push(block);
            }
        }
    }

    fn classify<'l>(&self, line: &'l str) -> Line<'l> {
        if let Some(rest) = line
            .strip_prefix(KEY_FIELD)
            .and_then(|rest| rest.strip_prefix(':'))
        {
            return Line::Key(rest.trim());
        }
        if let Some(locale) = self.locales.match_line(line) {
            let seed = line[locale.code().len() + 1..].trim();
            let seed = (!seed.is_empty()).then_some(seed);
            return Line::Locale(locale.clone(), seed);
        }
        Line::Text(line.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translations::{clean_translations, render_template};

    fn locales() -> LocaleSet {
        LocaleSet::new(["en", "nl", "fr"]).expect("locales")
    }

    fn parse(content: &str) -> Vec<TranslationRecord> {
        parse_user_input(content, &locales())
    }

    #[test]
    fn parses_single_line_values() {
        let records = parse("key: test.key\nen: Copy en\nfr: Copy fr\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "test.key");
        assert_eq!(records[0].get("en"), Some("Copy en"));
        assert_eq!(records[0].get("fr"), Some("Copy fr"));
        assert!(!records[0].contains_locale("nl"));
    }

    #[test]
    fn folds_continuation_lines_into_seeded_value() {
        let records = parse("key: key1.value\nen: Line 1\nLine 2\nfr: French\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "key1.value");
        assert_eq!(records[0].get("en"), Some("Line 1\nLine 2"));
        assert_eq!(records[0].get("fr"), Some("French"));
    }

    #[test]
    fn seedless_locale_takes_first_continuation_line() {
        let records = parse("key: key2.value\nen:\nLine 1\nLine 2\nfr: French\n");
        assert_eq!(records[0].get("en"), Some("Line 1\nLine 2"));
        assert_eq!(records[0].get("fr"), Some("French"));
    }

    #[test]
    fn new_key_commits_trailing_locale_of_previous_block() {
        let records = parse(
            "key: key1.value\nen: English1\nfr: French1\nkey: key2.value\nen: English2\nfr: French2\n",
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key, "key1.value");
        assert_eq!(records[0].get("en"), Some("English1"));
        assert_eq!(records[0].get("fr"), Some("French1"));
        assert_eq!(records[1].key, "key2.value");
        assert_eq!(records[1].get("en"), Some("English2"));
        assert_eq!(records[1].get("fr"), Some("French2"));
    }

    #[test]
    fn only_first_colon_splits_label_from_value() {
        let records = parse("key: key1.value\nen: Warning: Keep right\n");
        assert_eq!(records[0].get("en"), Some("Warning: Keep right"));
    }

    #[test]
    fn key_keeps_text_after_first_colon() {
        let records = parse("key: odd:key\n");
        assert_eq!(records[0].key, "odd:key");
    }

    #[test]
    fn blank_lines_inside_value_are_kept() {
        let records = parse("key: a\nen: Para 1\n\nPara 2\n");
        assert_eq!(records[0].get("en"), Some("Para 1\n\nPara 2"));
    }

    #[test]
    fn blank_line_between_blocks_sticks_to_last_value() {
        let records = parse("key: a\nfr: French\n\nkey: b\nen: B\n");
        assert_eq!(records[0].get("fr"), Some("French\n"));
        assert_eq!(records[1].get("en"), Some("B"));
        assert!(!records[1].contains_locale("fr"));
    }

    #[test]
    fn text_before_any_block_is_ignored() {
        let records = parse("hello\n\nen: orphan\nmore orphan\nkey: a\nen: A\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "a");
        assert_eq!(records[0].get("en"), Some("A"));
    }

    #[test]
    fn text_between_key_and_first_locale_is_ignored() {
        let records = parse("key: a\nstray\nen: A\n");
        assert_eq!(records[0].get("en"), Some("A"));
        assert_eq!(records[0].locale_count(), 1);
    }

    #[test]
    fn unsupported_locale_label_continues_current_value() {
        let records = parse("key: a\nen: A\nde: Deutsch\n");
        assert_eq!(records[0].get("en"), Some("A\nde: Deutsch"));
    }

    #[test]
    fn continuation_that_looks_like_a_label_starts_new_locale() {
        let records = parse("key: a\nfr: Bonjour\nen: is a label, not text\n");
        assert_eq!(records[0].get("fr"), Some("Bonjour"));
        assert_eq!(records[0].get("en"), Some("is a label, not text"));
    }

    #[test]
    fn labelled_but_empty_locale_is_none() {
        let records = parse("key: a\nen:\nfr: F\n");
        assert!(records[0].contains_locale("en"));
        assert_eq!(records[0].get("en"), None);
    }

    #[test]
    fn repeated_locale_overwrites_value() {
        let records = parse("key: a\nen: first\nen: second\n");
        assert_eq!(records[0].get("en"), Some("second"));
        assert_eq!(records[0].locale_count(), 1);
    }

    #[test]
    fn accepts_crlf_line_endings() {
        let records = parse("key: a\r\nen: A\r\nB\r\n");
        assert_eq!(records[0].key, "a");
        assert_eq!(records[0].get("en"), Some("A\nB"));
    }

    #[test]
    fn unedited_template_parses_to_empty_records() {
        let template = render_template(&locales(), 3);
        let records = parse(&template);
        assert_eq!(records.len(), 3);
        for record in &records {
            assert!(record.key.is_empty());
            assert!(record
                .values()
                .all(|(_, value)| value.unwrap_or_default().is_empty()));
        }
        assert!(clean_translations(records).is_empty());
    }

    #[test]
    fn dangling_key_never_survives_cleanup() {
        let records = parse("key: a\nen: A\nkey:\nen: lost\nnl: lost\nfr: lost\n");
        let cleaned = clean_translations(records);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].key, "a");
    }

    #[test]
    fn idle_state_ignores_text() {
        let set = locales();
        let mut parser = UserInputParser::new(&set);
        parser.feed_line("");
        parser.feed_line("some text");
        assert!(matches!(parser.state, ParserState::Idle));
        assert!(parser.finish().is_empty());
    }

    #[test]
    fn key_line_moves_to_block_state() {
        let set = locales();
        let mut parser = UserInputParser::new(&set);
        parser.feed_line("key: a.b");
        assert!(matches!(&parser.state, ParserState::Block(block) if block.key == "a.b"));
    }

    #[test]
    fn locale_line_moves_block_to_locale_state() {
        let set = locales();
        let mut parser = UserInputParser::new(&set);
        parser.feed_line("key: a.b");
        parser.feed_line("nl: Hallo");
        match &parser.state {
            ParserState::Locale { block, field } => {
                assert_eq!(block.key, "a.b");
                assert_eq!(block.locale_count(), 0);
                assert_eq!(field.locale.code(), "nl");
                assert_eq!(field.value.as_deref(), Some("Hallo"));
            }
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[test]
    fn second_locale_line_commits_first_field() {
        let set = locales();
        let mut parser = UserInputParser::new(&set);
        parser.feed_line("key: a.b");
        parser.feed_line("en:");
        parser.feed_line("fr: Salut");
        match &parser.state {
            ParserState::Locale { block, field } => {
                assert!(block.contains_locale("en"));
                assert_eq!(block.get("en"), None);
                assert_eq!(field.locale.code(), "fr");
            }
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[test]
    fn key_line_flushes_open_locale_into_records() {
        let set = locales();
        let mut parser = UserInputParser::new(&set);
        parser.feed_line("key: first");
        parser.feed_line("en: One");
        parser.feed_line("key: second");
        assert_eq!(parser.records.len(), 1);
        assert_eq!(parser.records[0].get("en"), Some("One"));
        assert!(matches!(&parser.state, ParserState::Block(block) if block.key == "second"));
    }
}
