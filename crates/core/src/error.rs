//! Domain error model.

use thiserror::Error;

/// A single failed schema rule, tied to the field it was checked on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Aggregated schema failure: every field that broke a rule, in declaration order.
///
/// At most one message is recorded per field (the first rule that failed).
#[derive(Debug, Error, Clone, PartialEq, Eq, Default)]
#[error("schema validation failed: {}", describe(.errors))]
pub struct SchemaError {
    errors: Vec<FieldError>,
}

impl SchemaError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shortcut for a failure on a single field.
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut err = Self::new();
        err.push(field, message);
        err
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// The human-readable messages, one per failed field.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }

    /// Merge another set of failures into this one.
    pub fn extend(&mut self, other: SchemaError) {
        self.errors.extend(other.errors);
    }

    /// `Ok(())` when nothing failed.
    pub fn into_result(self) -> Result<(), SchemaError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// A value could not be interpreted as an identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cast to identifier failed for value \"{value}\" at path \"{path}\"")]
pub struct CastError {
    pub path: &'static str,
    pub value: String,
}

impl CastError {
    pub fn new(path: &'static str, value: impl Into<String>) -> Self {
        Self {
            path,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_schema_error_is_ok() {
        assert_eq!(SchemaError::new().into_result(), Ok(()));
    }

    #[test]
    fn display_lists_each_field() {
        let mut err = SchemaError::single("name", "too short");
        err.push("link", "bad url");
        assert_eq!(
            err.to_string(),
            "schema validation failed: name: too short; link: bad url"
        );
        assert_eq!(err.messages(), vec!["too short", "bad url"]);
    }
}
