// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Data model for sign-in results.

use chrono::{DateTime, Utc};
use greenroom_common_secret::SecretString;
use serde::{Deserialize, Serialize};

/// Tokens issued by the provider for one sign-in.
///
/// Immutable once issued; a refresh produces a new `TokenSet` rather
/// than mutating this one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
	/// Bearer token for resource API calls (wrapped to prevent logging).
	pub access_token: SecretString,
	/// Token used to obtain a successor `TokenSet`, when granted.
	pub refresh_token: Option<SecretString>,
	/// OpenID Connect identity token, when granted.
	pub id_token: Option<String>,
	/// Absolute expiry instant, computed locally from the provider's
	/// reported lifetime. Provider-supplied absolute timestamps are
	/// never trusted.
	pub expires_at: DateTime<Utc>,
	/// Scopes the provider actually granted.
	pub scopes: Vec<String>,
}

impl TokenSet {
	/// Whether the access token has expired as of `now`.
	pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
		now >= self.expires_at
	}
}

/// The authenticated principal resolved after a successful callback.
///
/// Produced once per sign-in and read-only afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedPrincipal {
	/// Provider-assigned stable identifier.
	pub id: String,
	/// Sign-in name (e.g. `admin@contoso.example`).
	pub principal_name: String,
	/// Human-readable display name.
	pub display_name: String,
	/// The tenant the principal belongs to.
	pub tenant: TenantContext,
	/// Directory roles. Left empty at enrichment time; token-claim
	/// extraction is a downstream concern.
	pub roles: Vec<String>,
}

/// Tenant (organization) context for a principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantContext {
	pub tenant_id: String,
	pub display_name: String,
	/// The verified domain flagged as default. Empty string, never
	/// absent, when no domain carries the flag.
	pub default_domain: String,
	/// License SKUs available in the tenant, in provider order.
	pub available_licenses: Vec<LicenseInfo>,
}

/// One license SKU in the tenant's inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseInfo {
	pub sku_id: String,
	pub display_name: String,
	pub total_units: u32,
	pub consumed_units: u32,
}

impl LicenseInfo {
	/// Units still assignable from this SKU.
	pub fn remaining_units(&self) -> u32 {
		self.total_units.saturating_sub(self.consumed_units)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Duration;

	#[test]
	fn token_set_expiry_comparison() {
		let now = Utc::now();
		let tokens = TokenSet {
			access_token: SecretString::new("at".to_string()),
			refresh_token: None,
			id_token: None,
			expires_at: now + Duration::seconds(3600),
			scopes: vec![],
		};

		assert!(!tokens.is_expired_at(now));
		assert!(tokens.is_expired_at(now + Duration::seconds(3600)));
		assert!(tokens.is_expired_at(now + Duration::seconds(7200)));
	}

	#[test]
	fn access_token_is_not_logged() {
		let tokens = TokenSet {
			access_token: SecretString::new("eyJ_supersecret".to_string()),
			refresh_token: Some(SecretString::new("refresh_supersecret".to_string())),
			id_token: None,
			expires_at: Utc::now(),
			scopes: vec![],
		};

		let debug = format!("{tokens:?}");
		assert!(!debug.contains("eyJ_supersecret"));
		assert!(!debug.contains("refresh_supersecret"));
		assert!(debug.contains("[REDACTED]"));
	}

	#[test]
	fn remaining_units_saturates() {
		let license = LicenseInfo {
			sku_id: "sku".to_string(),
			display_name: "E5".to_string(),
			total_units: 5,
			consumed_units: 7,
		};
		assert_eq!(license.remaining_units(), 0);
	}
}
