// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Identity enrichment.
//!
//! Given a fresh access token, resolves the authenticated principal,
//! its tenant, and the tenant's license inventory with three reads
//! against the provider. No retry, no caching; each call is a fresh
//! read.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{parse_provider_error, AuthError};
use crate::types::{AuthenticatedPrincipal, LicenseInfo, TenantContext};

/// Resolves an access token into an [`AuthenticatedPrincipal`].
#[async_trait]
pub trait IdentityResolver: Send + Sync {
	async fn resolve(&self, access_token: &str) -> Result<AuthenticatedPrincipal, AuthError>;
}

// =============================================================================
// Provider payload shapes
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct ProfilePayload {
	pub id: String,
	#[serde(rename = "userPrincipalName", default)]
	pub user_principal_name: String,
	#[serde(rename = "displayName", default)]
	pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrganizationPayload {
	#[serde(default)]
	pub value: Vec<OrganizationEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrganizationEntry {
	pub id: String,
	#[serde(rename = "displayName", default)]
	pub display_name: String,
	#[serde(rename = "verifiedDomains", default)]
	pub verified_domains: Vec<VerifiedDomain>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifiedDomain {
	#[serde(default)]
	pub name: String,
	#[serde(rename = "isDefault", default)]
	pub is_default: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LicensePayload {
	#[serde(default)]
	pub value: Vec<LicenseEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LicenseEntry {
	#[serde(rename = "skuId", default)]
	pub sku_id: String,
	#[serde(rename = "skuPartNumber", default)]
	pub sku_part_number: String,
	#[serde(rename = "prepaidUnits", default)]
	pub prepaid_units: PrepaidUnits,
	#[serde(rename = "consumedUnits", default)]
	pub consumed_units: u32,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct PrepaidUnits {
	#[serde(default)]
	pub enabled: u32,
}

/// Build a [`TenantContext`] from the organization and license reads.
///
/// The default domain is the verified domain flagged default, or the
/// empty string when none carries the flag.
pub(crate) fn tenant_from_payloads(
	org: OrganizationPayload,
	licenses: LicensePayload,
) -> TenantContext {
	let entry = org.value.into_iter().next();

	let (tenant_id, display_name, default_domain) = match entry {
		Some(entry) => {
			let default_domain = entry
				.verified_domains
				.into_iter()
				.find(|d| d.is_default)
				.map(|d| d.name)
				.unwrap_or_default();
			(entry.id, entry.display_name, default_domain)
		}
		None => (String::new(), String::new(), String::new()),
	};

	TenantContext {
		tenant_id,
		display_name,
		default_domain,
		available_licenses: licenses
			.value
			.into_iter()
			.map(|l| LicenseInfo {
				sku_id: l.sku_id,
				display_name: l.sku_part_number,
				total_units: l.prepaid_units.enabled,
				consumed_units: l.consumed_units,
			})
			.collect(),
	}
}

// =============================================================================
// HTTP resolver
// =============================================================================

/// Identity enrichment over the provider's resource APIs.
pub struct HttpIdentityResolver {
	config: ProviderConfig,
	client: reqwest::Client,
}

impl HttpIdentityResolver {
	pub fn new(config: ProviderConfig) -> Self {
		Self {
			config,
			client: greenroom_common_http::new_client(),
		}
	}

	async fn get_json<T: serde::de::DeserializeOwned>(
		&self,
		path: &str,
		access_token: &str,
	) -> Result<T, AuthError> {
		let url = format!("{}{}", self.config.api_base.trim_end_matches('/'), path);

		let response = self
			.client
			.get(&url)
			.header("Authorization", format!("Bearer {access_token}"))
			.send()
			.await?;

		let status = response.status();
		let body = response.text().await?;

		if !status.is_success() {
			return Err(match parse_provider_error(&body) {
				Some((code, message)) => AuthError::Provider { code, message },
				None => AuthError::Callback(format!("{path} returned {status}")),
			});
		}

		serde_json::from_str(&body)
			.map_err(|e| AuthError::Callback(format!("unexpected {path} response shape: {e}")))
	}
}

#[async_trait]
impl IdentityResolver for HttpIdentityResolver {
	#[tracing::instrument(skip_all, name = "HttpIdentityResolver::resolve")]
	async fn resolve(&self, access_token: &str) -> Result<AuthenticatedPrincipal, AuthError> {
		// The profile read gates the rest: its failure aborts with the
		// provider's own error before any further enrichment.
		let profile: ProfilePayload = self.get_json("/me", access_token).await?;
		debug!(principal_id = %profile.id, "resolved principal profile");

		let org: OrganizationPayload = self.get_json("/organization", access_token).await?;
		let licenses: LicensePayload = self.get_json("/subscribedSkus", access_token).await?;

		Ok(AuthenticatedPrincipal {
			id: profile.id,
			principal_name: profile.user_principal_name,
			display_name: profile.display_name,
			tenant: tenant_from_payloads(org, licenses),
			// Token-claim extraction is a downstream concern.
			roles: Vec::new(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn org_payload(json: &str) -> OrganizationPayload {
		serde_json::from_str(json).unwrap()
	}

	fn license_payload(json: &str) -> LicensePayload {
		serde_json::from_str(json).unwrap()
	}

	#[test]
	fn default_domain_comes_from_flagged_entry() {
		let org = org_payload(
			r#"{"value": [{
				"id": "tenant-1",
				"displayName": "Contoso",
				"verifiedDomains": [
					{"name": "contoso.example", "isDefault": false},
					{"name": "contoso.onmicrosoft.example", "isDefault": true}
				]
			}]}"#,
		);
		let tenant = tenant_from_payloads(org, license_payload(r#"{"value": []}"#));

		assert_eq!(tenant.tenant_id, "tenant-1");
		assert_eq!(tenant.display_name, "Contoso");
		assert_eq!(tenant.default_domain, "contoso.onmicrosoft.example");
	}

	#[test]
	fn default_domain_is_empty_string_when_unflagged() {
		let org = org_payload(
			r#"{"value": [{
				"id": "tenant-1",
				"displayName": "Contoso",
				"verifiedDomains": [{"name": "contoso.example", "isDefault": false}]
			}]}"#,
		);
		let tenant = tenant_from_payloads(org, license_payload(r#"{"value": []}"#));

		assert_eq!(tenant.default_domain, "");
	}

	#[test]
	fn default_domain_is_empty_string_when_no_domains() {
		let org = org_payload(r#"{"value": [{"id": "tenant-1"}]}"#);
		let tenant = tenant_from_payloads(org, license_payload(r#"{"value": []}"#));
		assert_eq!(tenant.default_domain, "");
	}

	#[test]
	fn licenses_map_in_provider_order() {
		let org = org_payload(r#"{"value": [{"id": "t"}]}"#);
		let licenses = license_payload(
			r#"{"value": [
				{"skuId": "sku-a", "skuPartNumber": "SPE_E5", "prepaidUnits": {"enabled": 25}, "consumedUnits": 10},
				{"skuId": "sku-b", "skuPartNumber": "SPE_E3", "prepaidUnits": {"enabled": 5}, "consumedUnits": 5}
			]}"#,
		);

		let tenant = tenant_from_payloads(org, licenses);
		assert_eq!(tenant.available_licenses.len(), 2);
		assert_eq!(tenant.available_licenses[0].sku_id, "sku-a");
		assert_eq!(tenant.available_licenses[0].display_name, "SPE_E5");
		assert_eq!(tenant.available_licenses[0].total_units, 25);
		assert_eq!(tenant.available_licenses[1].consumed_units, 5);
	}

	#[test]
	fn profile_payload_deserializes_with_missing_fields() {
		let profile: ProfilePayload = serde_json::from_str(r#"{"id": "u1"}"#).unwrap();
		assert_eq!(profile.id, "u1");
		assert!(profile.user_principal_name.is_empty());
		assert!(profile.display_name.is_empty());
	}
}
