// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

/// Failures at the HTTP boundary. Rejections the server explains in its body
/// surface as `ApiOutcome` values instead.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not signed in -- run `dts --login <username>` first")]
    MissingToken,

    #[error("session expired -- sign in again with `dts --login <username>`")]
    Unauthorized,

    #[error("cannot reach {base_url} -- check [server].base_url and your network ({detail})")]
    Connection { base_url: String, detail: String },

    #[error("{base_url} cannot be used as a base URL")]
    InvalidBaseUrl { base_url: String },

    #[error("unexpected payload from {path}: {detail}")]
    UnexpectedPayload { path: String, detail: String },

    #[error("decode response from {path}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("token store: {0}")]
    TokenStore(String),
}

impl ApiError {
    pub fn unexpected(path: impl ToString, detail: impl Into<String>) -> Self {
        Self::UnexpectedPayload {
            path: path.to_string(),
            detail: detail.into(),
        }
    }

    /// Whether signing in again would fix this.
    pub fn needs_login(&self) -> bool {
        matches!(self, Self::MissingToken | Self::Unauthorized)
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
