// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use dts_app::{ApiOutcome, FieldErrors};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Turns a rejected response body into a tagged outcome.
///
/// Keyed `errors`/`error` objects become field errors, an `errors` list or a
/// `message` becomes a general error, and short plain-text bodies are shown
/// as they are.
pub fn error_outcome<T>(status: u16, body: &str) -> ApiOutcome<T> {
    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(body) {
        if let Some(errors) = keyed_errors(&object) {
            return ApiOutcome::FieldErrors(errors);
        }
        if let Some(Value::Array(items)) = object.get("errors") {
            let messages: Vec<String> = items.iter().map(message_text).collect();
            if !messages.is_empty() {
                return ApiOutcome::GeneralError(messages.join("\n"));
            }
        }
        for key in ["message", "error"] {
            if let Some(Value::String(message)) = object.get(key)
                && !message.trim().is_empty()
            {
                return ApiOutcome::GeneralError(message.trim().to_owned());
            }
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return ApiOutcome::GeneralError(trimmed.to_owned());
    }
    ApiOutcome::GeneralError(format!("server returned {status}"))
}

/// Field errors a successful response may still carry.
pub fn embedded_field_errors(body: &str) -> Option<FieldErrors> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(object)) => keyed_errors(&object),
        _ => None,
    }
}

/// Collapses a non-success response into an error for read-only endpoints.
pub fn server_error(status: u16, body: &str) -> ApiError {
    let outcome: ApiOutcome<()> = error_outcome(status, body);
    ApiError::Server {
        status,
        message: outcome
            .summary()
            .unwrap_or_else(|| format!("server returned {status}")),
    }
}

fn keyed_errors(object: &Map<String, Value>) -> Option<FieldErrors> {
    for key in ["errors", "error"] {
        let Some(Value::Object(fields)) = object.get(key) else {
            continue;
        };
        let mut errors = FieldErrors::new();
        for (field, messages) in fields {
            match messages {
                Value::Array(items) => {
                    for item in items {
                        errors.push(field.as_str(), message_text(item));
                    }
                }
                Value::Null => {}
                other => errors.push(field.as_str(), message_text(other)),
            }
        }
        if !errors.is_empty() {
            return Some(errors);
        }
    }
    None
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
