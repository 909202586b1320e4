// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error taxonomy for the auth pipeline.

use serde_json::Value;

/// Errors that can occur during the OAuth flow and identity enrichment.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
	/// The provider returned an error envelope; code and message are
	/// surfaced verbatim.
	#[error("provider error ({code}): {message}")]
	Provider { code: String, message: String },

	/// The HTTP request to the provider failed (network error, timeout).
	#[error("transport error: {0}")]
	Transport(#[from] reqwest::Error),

	/// The token endpoint answered with something that was neither a
	/// token set nor a recognizable error envelope.
	#[error("token exchange failed: {0}")]
	TokenExchange(String),

	/// Catch-all for unexpected faults inside the callback pipeline.
	/// No caller of the orchestrator ever sees an unclassified fault.
	#[error("callback error: {0}")]
	Callback(String),
}

impl AuthError {
	/// Stable machine-readable code for logs and callers.
	///
	/// Provider errors keep the provider's own code verbatim.
	pub fn code(&self) -> String {
		match self {
			AuthError::Provider { code, .. } => code.clone(),
			AuthError::Transport(_) => "TRANSPORT_ERROR".to_string(),
			AuthError::TokenExchange(_) => "TOKEN_EXCHANGE_ERROR".to_string(),
			AuthError::Callback(_) => "CALLBACK_ERROR".to_string(),
		}
	}
}

/// Parse a provider error body into its code and message.
///
/// Two envelope shapes exist at this boundary: the resource APIs wrap
/// errors as `{"error": {"code", "message"}}`, while the token endpoint
/// uses the flat OAuth shape `{"error", "error_description"}`. Returns
/// `None` when the body matches neither.
pub(crate) fn parse_provider_error(body: &str) -> Option<(String, String)> {
	let value: Value = serde_json::from_str(body).ok()?;

	match value.get("error")? {
		Value::Object(inner) => {
			let code = inner.get("code")?.as_str()?.to_string();
			let message = inner
				.get("message")
				.and_then(Value::as_str)
				.unwrap_or_default()
				.to_string();
			Some((code, message))
		}
		Value::String(code) => {
			let message = value
				.get("error_description")
				.and_then(Value::as_str)
				.unwrap_or(code)
				.to_string();
			Some((code.clone(), message))
		}
		_ => None,
	}
}
