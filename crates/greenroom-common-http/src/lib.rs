// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client with consistent User-Agent header.
//!
//! Every Greenroom component that talks to the identity provider builds its
//! client here so requests are attributable in provider-side logs.

use reqwest::{Client, ClientBuilder};

/// Creates a new HTTP client with the standard Greenroom User-Agent header.
///
/// The User-Agent format is: `greenroom/{version}`
/// Example: `greenroom/0.1.0`
pub fn new_client() -> Client {
	builder().build().expect("failed to build HTTP client")
}

/// Creates a new HTTP client builder with the standard Greenroom User-Agent
/// header.
///
/// Use this when you need to customize the client (e.g., set timeout).
///
/// # Example
/// ```ignore
/// let client = greenroom_common_http::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Returns the standard Greenroom User-Agent string.
///
/// Format: `greenroom/{version}`
pub fn user_agent() -> String {
	format!("greenroom/{}", env!("CARGO_PKG_VERSION"))
}
