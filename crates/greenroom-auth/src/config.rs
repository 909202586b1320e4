// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Provider configuration.

use greenroom_common_secret::SecretString;
use std::env;

/// Default authority base for building authorize/token endpoints.
pub const DEFAULT_AUTHORITY_BASE: &str = "https://login.microsoftonline.com";

/// Default resource API base.
pub const DEFAULT_API_BASE: &str = "https://graph.microsoft.com/v1.0";

/// Default authority tenant segment (multi-tenant work accounts).
pub const DEFAULT_AUTHORITY_TENANT: &str = "organizations";

/// Scopes every sign-in requests regardless of caller additions.
pub const REQUIRED_SCOPES: &[&str] = &[
	"openid",
	"profile",
	"offline_access",
	"User.ReadWrite.All",
	"Directory.ReadWrite.All",
];

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// A required environment variable was not set.
	#[error("missing environment variable: {0}")]
	MissingEnvVar(String),

	/// A configuration value was empty or invalid.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),
}

/// Configuration for the identity-provider OAuth client.
///
/// The `client_secret` is wrapped in [`SecretString`] to prevent
/// accidental logging or exposure. Endpoint bases are configurable so
/// tests and non-production deployments can point at a stand-in
/// provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
	/// The OAuth application client ID.
	pub client_id: String,
	/// The OAuth application client secret (wrapped to prevent logging).
	pub client_secret: SecretString,
	/// The callback URL the provider redirects to after authorization.
	pub redirect_uri: String,
	/// Authority tenant segment in the authorize/token endpoint paths.
	pub authority_tenant: String,
	/// Base URL for the authorization and token endpoints.
	pub authority_base: String,
	/// Base URL for the resource read/delete APIs.
	pub api_base: String,
}

impl ProviderConfig {
	/// Load configuration from environment variables.
	///
	/// # Required Environment Variables
	///
	/// - `GREENROOM_CLIENT_ID`: the OAuth application's client ID.
	/// - `GREENROOM_CLIENT_SECRET`: the OAuth application's client secret.
	/// - `GREENROOM_REDIRECT_URI`: the callback URL for OAuth redirects.
	///
	/// # Optional Environment Variables
	///
	/// - `GREENROOM_AUTHORITY_TENANT` (default `organizations`)
	/// - `GREENROOM_AUTHORITY_BASE` (default Microsoft login)
	/// - `GREENROOM_API_BASE` (default Microsoft Graph v1.0)
	///
	/// # Errors
	///
	/// Returns [`ConfigError::MissingEnvVar`] if any required variable is
	/// not set.
	pub fn from_env() -> Result<Self, ConfigError> {
		let client_id = env::var("GREENROOM_CLIENT_ID")
			.map_err(|_| ConfigError::MissingEnvVar("GREENROOM_CLIENT_ID".to_string()))?;

		let client_secret = env::var("GREENROOM_CLIENT_SECRET")
			.map_err(|_| ConfigError::MissingEnvVar("GREENROOM_CLIENT_SECRET".to_string()))?;

		let redirect_uri = env::var("GREENROOM_REDIRECT_URI")
			.map_err(|_| ConfigError::MissingEnvVar("GREENROOM_REDIRECT_URI".to_string()))?;

		Ok(Self {
			client_id,
			client_secret: SecretString::new(client_secret),
			redirect_uri,
			authority_tenant: env::var("GREENROOM_AUTHORITY_TENANT")
				.unwrap_or_else(|_| DEFAULT_AUTHORITY_TENANT.to_string()),
			authority_base: env::var("GREENROOM_AUTHORITY_BASE")
				.unwrap_or_else(|_| DEFAULT_AUTHORITY_BASE.to_string()),
			api_base: env::var("GREENROOM_API_BASE")
				.unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
		})
	}

	/// Validate that all configuration fields are non-empty.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::InvalidConfig`] if any field is empty.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.client_id.is_empty() {
			return Err(ConfigError::InvalidConfig(
				"client_id cannot be empty".to_string(),
			));
		}
		if self.client_secret.is_empty() {
			return Err(ConfigError::InvalidConfig(
				"client_secret cannot be empty".to_string(),
			));
		}
		if self.redirect_uri.is_empty() {
			return Err(ConfigError::InvalidConfig(
				"redirect_uri cannot be empty".to_string(),
			));
		}
		Ok(())
	}

	/// Provider authorization endpoint.
	pub fn authorize_endpoint(&self) -> String {
		format!(
			"{}/{}/oauth2/v2.0/authorize",
			self.authority_base.trim_end_matches('/'),
			self.authority_tenant
		)
	}

	/// Provider token endpoint.
	pub fn token_endpoint(&self) -> String {
		format!(
			"{}/{}/oauth2/v2.0/token",
			self.authority_base.trim_end_matches('/'),
			self.authority_tenant
		)
	}

	/// The union of the fixed required scopes and caller extras, in
	/// order, deduplicated.
	pub fn scopes_with(&self, extra_scopes: &[String]) -> Vec<String> {
		let mut scopes: Vec<String> = REQUIRED_SCOPES.iter().map(|s| s.to_string()).collect();
		for scope in extra_scopes {
			if !scopes.iter().any(|s| s == scope) {
				scopes.push(scope.clone());
			}
		}
		scopes
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config() -> ProviderConfig {
		ProviderConfig {
			client_id: "test_client_id".to_string(),
			client_secret: SecretString::new("test_secret".to_string()),
			redirect_uri: "https://example.com/callback".to_string(),
			authority_tenant: DEFAULT_AUTHORITY_TENANT.to_string(),
			authority_base: DEFAULT_AUTHORITY_BASE.to_string(),
			api_base: DEFAULT_API_BASE.to_string(),
		}
	}

	#[test]
	fn endpoints_include_authority_tenant() {
		let config = config();
		assert_eq!(
			config.authorize_endpoint(),
			"https://login.microsoftonline.com/organizations/oauth2/v2.0/authorize"
		);
		assert_eq!(
			config.token_endpoint(),
			"https://login.microsoftonline.com/organizations/oauth2/v2.0/token"
		);
	}

	#[test]
	fn scopes_with_unions_and_dedupes() {
		let config = config();
		let scopes = config.scopes_with(&["Mail.Send".to_string(), "openid".to_string()]);

		assert_eq!(scopes.len(), REQUIRED_SCOPES.len() + 1);
		assert_eq!(scopes.last().map(String::as_str), Some("Mail.Send"));
		assert_eq!(scopes.iter().filter(|s| *s == "openid").count(), 1);
	}

	#[test]
	fn scopes_with_no_extras_is_required_set() {
		let config = config();
		assert_eq!(config.scopes_with(&[]), REQUIRED_SCOPES.to_vec());
	}

	#[test]
	fn validation_rejects_empty_fields() {
		let mut c = config();
		c.client_id = String::new();
		assert!(c.validate().is_err());

		let mut c = config();
		c.client_secret = SecretString::new(String::new());
		assert!(c.validate().is_err());

		let mut c = config();
		c.redirect_uri = String::new();
		assert!(c.validate().is_err());
	}

	#[test]
	fn validation_accepts_valid_config() {
		assert!(config().validate().is_ok());
	}

	#[test]
	fn client_secret_is_not_logged() {
		let debug = format!("{:?}", config());
		assert!(!debug.contains("test_secret"));
		assert!(debug.contains("[REDACTED]"));
	}
}
