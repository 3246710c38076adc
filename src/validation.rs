// Field validation shared by request bodies

use std::ops::RangeInclusive;

use crate::error::{ApiError, ApiResult};

#[derive(Debug)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(ValidationError {
            field,
            message: message.into(),
        });
    }

    /// Length in characters, not bytes.
    pub fn check_len(&mut self, field: &'static str, value: &str, range: RangeInclusive<usize>) {
        let len = value.trim().chars().count();
        if !range.contains(&len) {
            self.add_error(
                field,
                format!(
                    "must be between {} and {} characters",
                    range.start(),
                    range.end()
                ),
            );
        }
    }

    pub fn check_range<T>(&mut self, field: &'static str, value: T, range: RangeInclusive<T>)
    where
        T: PartialOrd + std::fmt::Display,
    {
        if !range.contains(&value) {
            self.add_error(
                field,
                format!("must be between {} and {}", range.start(), range.end()),
            );
        }
    }

    pub fn into_result(self) -> ApiResult<()> {
        if self.is_valid() {
            return Ok(());
        }
        let message = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        Err(ApiError::Validation(message))
    }
}
