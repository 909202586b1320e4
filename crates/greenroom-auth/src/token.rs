// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Token exchange client.
//!
//! Exchanges an authorization code plus PKCE verifier for a
//! [`TokenSet`] at the provider's token endpoint. A single request, no
//! retry at this layer; retries, if any, are the caller's
//! responsibility.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use greenroom_common_secret::SecretString;
use serde::Deserialize;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{parse_provider_error, AuthError};
use crate::types::TokenSet;

/// Exchanges authorization codes for token sets.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
	async fn exchange(&self, code: &str, code_verifier: &str) -> Result<TokenSet, AuthError>;
}

/// Successful response from the provider's token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
	access_token: String,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	id_token: Option<String>,
	expires_in: i64,
	#[serde(default)]
	scope: String,
}

/// Build a [`TokenSet`] from the provider's response.
///
/// `expires_at` is computed as `now + expires_in`; a provider-supplied
/// absolute timestamp would never be trusted here.
pub(crate) fn token_set_from_response(response: TokenResponse, now: DateTime<Utc>) -> TokenSet {
	TokenSet {
		access_token: SecretString::new(response.access_token),
		refresh_token: response.refresh_token.map(SecretString::new),
		id_token: response.id_token,
		expires_at: now + Duration::seconds(response.expires_in),
		scopes: response
			.scope
			.split_whitespace()
			.map(str::to_string)
			.collect(),
	}
}

/// Token exchange over the provider's HTTP token endpoint.
pub struct HttpTokenExchanger {
	config: ProviderConfig,
	client: reqwest::Client,
}

impl HttpTokenExchanger {
	pub fn new(config: ProviderConfig) -> Self {
		Self {
			config,
			client: greenroom_common_http::new_client(),
		}
	}
}

#[async_trait]
impl TokenExchanger for HttpTokenExchanger {
	#[tracing::instrument(skip_all, name = "HttpTokenExchanger::exchange")]
	async fn exchange(&self, code: &str, code_verifier: &str) -> Result<TokenSet, AuthError> {
		debug!("exchanging authorization code for token set");

		let response = self
			.client
			.post(self.config.token_endpoint())
			.form(&[
				("client_id", self.config.client_id.as_str()),
				("client_secret", self.config.client_secret.expose()),
				("code", code),
				("redirect_uri", self.config.redirect_uri.as_str()),
				("grant_type", "authorization_code"),
				("code_verifier", code_verifier),
			])
			.send()
			.await?;

		let status = response.status();
		let body = response.text().await?;

		if !status.is_success() {
			// Surface the provider's own code and message verbatim when
			// the envelope parses; otherwise a generic exchange error.
			return Err(match parse_provider_error(&body) {
				Some((code, message)) => AuthError::Provider { code, message },
				None => AuthError::TokenExchange(format!(
					"token endpoint returned {status} with unrecognized body"
				)),
			});
		}

		let token_response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
			AuthError::TokenExchange(format!("failed to parse token response: {e}"))
		})?;

		Ok(token_set_from_response(token_response, Utc::now()))
	}
}
