// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod client;
pub mod error;
pub mod normalize;
pub mod token;
pub mod transport;

pub use client::{Api, UserPage};
pub use error::{ApiError, ApiResult};
pub use token::{FileTokenStore, MemoryTokenStore, TOKEN_PATH_ENV, TokenStore};
pub use transport::{ApiPath, HttpTransport, RawResponse, Transport};

/// Production host of the San Juan City Document Tracking System.
pub const DEFAULT_BASE_URL: &str = "http://dts.sanjuancity.gov.ph";
