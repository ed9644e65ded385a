// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;
use std::fmt;

/// Validation messages keyed by form field name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl FromIterator<(String, String)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut errors = Self::new();
        for (field, message) in iter {
            errors.push(field, message);
        }
        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut written: Vec<&str> = Vec::new();
        for (_, messages) in self.iter() {
            for message in messages {
                if written.contains(&message.as_str()) {
                    continue;
                }
                if !written.is_empty() {
                    f.write_str("; ")?;
                }
                f.write_str(message)?;
                written.push(message);
            }
        }
        Ok(())
    }
}

/// Result of a server call that may be rejected with field or general errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome<T> {
    Success(T),
    FieldErrors(FieldErrors),
    GeneralError(String),
}

impl<T> ApiOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiOutcome<U> {
        match self {
            Self::Success(value) => ApiOutcome::Success(f(value)),
            Self::FieldErrors(errors) => ApiOutcome::FieldErrors(errors),
            Self::GeneralError(message) => ApiOutcome::GeneralError(message),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::FieldErrors(_) | Self::GeneralError(_) => None,
        }
    }

    /// One line suitable for a status bar.
    pub fn summary(&self) -> Option<String> {
        match self {
            Self::Success(_) => None,
            Self::FieldErrors(errors) => Some(errors.to_string()),
            Self::GeneralError(message) => Some(message.clone()),
        }
    }
}

impl<T> From<FieldErrors> for ApiOutcome<T> {
    fn from(errors: FieldErrors) -> Self {
        Self::FieldErrors(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiOutcome, FieldErrors};

    #[test]
    fn field_errors_group_messages_per_field() {
        let mut errors = FieldErrors::new();
        errors.push("username", "The username has already been taken.");
        errors.push("password", "Too short.");
        errors.push("password", "Needs a digit.");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("password"), ["Too short.", "Needs a digit."]);
        assert_eq!(errors.first("username"), Some("The username has already been taken."));
        assert!(errors.get("contact").is_empty());
        assert_eq!(
            errors.to_string(),
            "Too short.; Needs a digit.; The username has already been taken."
        );
    }

    #[test]
    fn empty_errors_become_ok() {
        assert_eq!(FieldErrors::new().into_result(), Ok(()));
        let errors: FieldErrors = [("doctitle".to_owned(), "Required.".to_owned())]
            .into_iter()
            .collect();
        assert!(errors.clone().into_result().is_err());

        let mut repeated = FieldErrors::new();
        repeated.push("amount", "Please fill all the fields.");
        repeated.push("for_month_year", "Please fill all the fields.");
        assert_eq!(repeated.to_string(), "Please fill all the fields.");

        let outcome: ApiOutcome<()> = errors.into();
        assert_eq!(outcome.summary().as_deref(), Some("Required."));
    }

    #[test]
    fn outcome_map_and_success() {
        let outcome = ApiOutcome::Success(2).map(|n| n * 10);
        assert!(outcome.is_success());
        assert_eq!(outcome.success(), Some(20));

        let failed: ApiOutcome<i32> = ApiOutcome::GeneralError("nope".to_owned());
        assert_eq!(failed.summary().as_deref(), Some("nope"));
        assert_eq!(failed.map(|n| n + 1).success(), None);
    }
}
