//! Declarative field rules shared by the model schemas and the per-route request schemas.
//!
//! A schema is a plain function that runs a [`FieldChecks`] over its fields and returns the
//! aggregated [`SchemaError`]. Each field stops at its first failed rule.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::SchemaError;

/// `http(s)://` URL with a dotted host.
pub static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b(?:[-a-zA-Z0-9()@:%_+.~#?&/=]*)$",
    )
    .expect("URL pattern compiles")
});

/// Person name: letters (latin and cyrillic), whitespace and hyphens.
pub static PERSON_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Zа-яА-ЯёЁ\s-]+$").expect("name pattern compiles"));

/// Card title: like a person name, digits allowed.
pub static CARD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Zа-яА-ЯёЁ0-9\s-]+$").expect("card name pattern compiles"));

/// Mailbox address with a dotted domain.
pub static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .expect("email pattern compiles")
});

pub fn is_url(value: &str) -> bool {
    URL.is_match(value)
}

pub fn is_email(value: &str) -> bool {
    value.len() <= 254 && EMAIL.is_match(value)
}

/// Accumulates per-field rule failures.
#[derive(Debug, Default)]
pub struct FieldChecks {
    errors: SchemaError,
}

impl FieldChecks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start checking one field. `None` means the field was not supplied.
    pub fn field<'c, 'v>(&'c mut self, name: &'static str, value: Option<&'v str>) -> Field<'c, 'v> {
        Field {
            sink: &mut self.errors,
            name,
            value,
            settled: false,
        }
    }

    pub fn finish(self) -> Result<(), SchemaError> {
        self.errors.into_result()
    }
}

/// Rule chain for a single field.
///
/// Rules other than [`Field::required`] are skipped for absent fields.
pub struct Field<'c, 'v> {
    sink: &'c mut SchemaError,
    name: &'static str,
    value: Option<&'v str>,
    settled: bool,
}

impl Field<'_, '_> {
    /// Absent and empty values both fail.
    pub fn required(mut self, message: impl Into<String>) -> Self {
        if !self.settled && self.value.is_none_or(str::is_empty) {
            self.fail(message);
        }
        self
    }

    pub fn min_chars(self, min: usize, message: impl Into<String>) -> Self {
        self.check(|v| v.chars().count() >= min, message)
    }

    pub fn max_chars(self, max: usize, message: impl Into<String>) -> Self {
        self.check(|v| v.chars().count() <= max, message)
    }

    pub fn matches(self, pattern: &Regex, message: impl Into<String>) -> Self {
        self.check(|v| pattern.is_match(v), message)
    }

    pub fn check(mut self, rule: impl FnOnce(&str) -> bool, message: impl Into<String>) -> Self {
        if let (false, Some(value)) = (self.settled, self.value) {
            if !rule(value) {
                self.fail(message);
            }
        }
        self
    }

    fn fail(&mut self, message: impl Into<String>) {
        self.sink.push(self.name, message);
        self.settled = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_pattern() {
        assert!(is_url("https://example.com/a.png"));
        assert!(is_url("http://www.example.com"));
        assert!(is_url("https://pictures.s3.yandex.net/resources/jacques-cousteau_1604399756.png"));
        assert!(!is_url("ftp://example.com/a.png"));
        assert!(!is_url("https://localhost"));
        assert!(!is_url("not a url"));
    }

    #[test]
    fn name_patterns() {
        assert!(PERSON_NAME.is_match("Жак-Ив Кусто"));
        assert!(PERSON_NAME.is_match("Anne Marie"));
        assert!(!PERSON_NAME.is_match("R2D2"));
        assert!(CARD_NAME.is_match("Bridge 42"));
        assert!(!CARD_NAME.is_match("Bridge!"));
    }

    #[test]
    fn email_pattern() {
        assert!(is_email("jacques@example.com"));
        assert!(is_email("first.last+tag@mail.example.org"));
        assert!(!is_email("jacques@example"));
        assert!(!is_email("jacques.example.com"));
        assert!(!is_email(""));
    }

    #[test]
    fn first_failed_rule_wins_per_field() {
        let mut checks = FieldChecks::new();
        checks
            .field("name", Some("1"))
            .min_chars(2, "short")
            .matches(&PERSON_NAME, "pattern");
        checks.field("about", None).required("about required").min_chars(2, "short");
        checks.field("avatar", None).check(|_| false, "never checked");

        let err = checks.finish().unwrap_err();
        assert_eq!(err.messages(), vec!["short", "about required"]);
        assert!(!err.has_field("avatar"));
    }

    #[test]
    fn empty_string_fails_required() {
        let mut checks = FieldChecks::new();
        checks.field("email", Some("")).required("required").check(|_| false, "format");
        assert_eq!(checks.finish().unwrap_err().messages(), vec!["required"]);
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let mut checks = FieldChecks::new();
        // 30 cyrillic characters, 60 bytes.
        let name = "ж".repeat(30);
        checks.field("name", Some(name.as_str())).max_chars(30, "long");
        assert!(checks.finish().is_ok());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 128,
                ..ProptestConfig::default()
            })]

            /// Property: a name passes the length rules exactly when its character count is
            /// within bounds, whatever the script.
            #[test]
            fn length_bounds_follow_character_count(name in "[a-zа-яё -]{0,40}") {
                let mut checks = FieldChecks::new();
                checks
                    .field("name", Some(name.as_str()))
                    .min_chars(2, "short")
                    .max_chars(30, "long");

                let count = name.chars().count();
                prop_assert_eq!(checks.finish().is_ok(), (2..=30).contains(&count));
            }
        }
    }
}
