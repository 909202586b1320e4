// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Probing the backing resource endpoint.
//!
//! A probe performs a single read of the per-principal backing resource
//! and classifies the response. The read itself is what nudges the
//! provider into provisioning the resource; the probe has no explicit
//! create call.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Errors a probe can surface to the retrier.
///
/// These never escape the retrier; they are folded into the run's
/// [`ProvisioningOutcome`](crate::ProvisioningOutcome).
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
	/// Network-level failure reaching the provider.
	#[error("transport error: {0}")]
	Transport(String),

	/// The provider answered with an error other than the expected
	/// "not provisioned yet" signature.
	#[error("provider error ({code}): {message}")]
	Provider { code: String, message: String },
}

/// Classified result of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
	/// The resource exists.
	Ready {
		/// URL of the provisioned resource.
		resource_url: String,
	},
	/// The provider reported the expected "not provisioned yet" case.
	NotProvisioned,
}

/// A single read of the backing resource endpoint for one principal.
#[async_trait]
pub trait BackingResourceProbe: Send + Sync {
	async fn probe(&self, principal_id: &str, access_token: &str)
		-> Result<ProbeStatus, ProbeError>;
}

/// Whether a provider error matches the "not provisioned yet" signature.
///
/// Brand-new principals get a not-found whose code or message indicates
/// the resource is still being set up, as opposed to a genuine missing
/// principal or a permission failure.
pub fn is_not_provisioned_signature(code: &str, message: &str) -> bool {
	let message = message.to_ascii_lowercase();
	code.eq_ignore_ascii_case("ResourceNotFound")
		|| message.contains("not provisioned")
		|| message.contains("provisioning")
		|| message.contains("mysite not found")
}

#[derive(Debug, Deserialize)]
struct ResourceResponse {
	#[serde(rename = "webUrl")]
	web_url: Option<String>,
	id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorEnvelope {
	error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
	#[serde(default)]
	code: String,
	#[serde(default)]
	message: String,
}

/// Probe backed by the provider's resource read endpoint.
pub struct HttpBackingResourceProbe {
	api_base: String,
	client: reqwest::Client,
}

impl HttpBackingResourceProbe {
	pub fn new(api_base: impl Into<String>) -> Self {
		Self {
			api_base: api_base.into(),
			client: greenroom_common_http::new_client(),
		}
	}

	fn resource_url(&self, principal_id: &str) -> String {
		format!(
			"{}/users/{}/drive",
			self.api_base.trim_end_matches('/'),
			principal_id
		)
	}
}

#[async_trait]
impl BackingResourceProbe for HttpBackingResourceProbe {
	async fn probe(
		&self,
		principal_id: &str,
		access_token: &str,
	) -> Result<ProbeStatus, ProbeError> {
		let url = self.resource_url(principal_id);
		debug!(principal_id = %principal_id, "probing backing resource");

		let response = self
			.client
			.get(&url)
			.header("Authorization", format!("Bearer {access_token}"))
			.send()
			.await
			.map_err(|e| ProbeError::Transport(e.to_string()))?;

		let status = response.status();

		if status.is_success() {
			let body: ResourceResponse = response
				.json()
				.await
				.map_err(|e| ProbeError::Transport(format!("failed to parse resource: {e}")))?;
			let resource_url = body.web_url.or(body.id).unwrap_or_default();
			return Ok(ProbeStatus::Ready { resource_url });
		}

		let body = response.text().await.unwrap_or_default();
		let (code, message) = match serde_json::from_str::<ProviderErrorEnvelope>(&body) {
			Ok(envelope) => (envelope.error.code, envelope.error.message),
			Err(_) => (status.as_u16().to_string(), body),
		};

		if status == reqwest::StatusCode::NOT_FOUND && is_not_provisioned_signature(&code, &message)
		{
			return Ok(ProbeStatus::NotProvisioned);
		}

		Err(ProbeError::Provider { code, message })
	}
}
