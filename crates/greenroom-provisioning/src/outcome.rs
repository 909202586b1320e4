// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

/// Result of one forced-provisioning run.
///
/// Exactly one variant is produced per invocation of the retrier; the
/// variants are never partially populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProvisioningOutcome {
	/// The backing resource is available.
	Ready {
		/// URL of the provisioned resource.
		resource_url: String,
		/// Wall-clock seconds spent in the retrier.
		elapsed_secs: u64,
		/// Number of probe attempts performed, including the last.
		attempts: u32,
	},
	/// The provider reported the resource does not exist yet.
	///
	/// Returned from the first attempt only, as fast feedback for the
	/// common brand-new-principal case; later matches fall through to
	/// the retry path instead.
	NotYetAvailable {
		elapsed_secs: u64,
		/// Whether the "not provisioned yet" signature suggests the
		/// principal was created very recently.
		new_principal_likely: bool,
	},
	/// Attempts or the wall-clock budget ran out before the resource
	/// became available.
	TimedOut { elapsed_secs: u64 },
	/// The final allowed attempt failed with a non-retryable or
	/// exhausted error.
	Failed { elapsed_secs: u64, cause: String },
}

impl ProvisioningOutcome {
	/// Whether the resource ended up available.
	pub fn is_ready(&self) -> bool {
		matches!(self, ProvisioningOutcome::Ready { .. })
	}

	/// Short machine-readable label for logs and audit metadata.
	pub fn label(&self) -> &'static str {
		match self {
			ProvisioningOutcome::Ready { .. } => "ready",
			ProvisioningOutcome::NotYetAvailable { .. } => "not_yet_available",
			ProvisioningOutcome::TimedOut { .. } => "timed_out",
			ProvisioningOutcome::Failed { .. } => "failed",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn serializes_with_status_tag() {
		let outcome = ProvisioningOutcome::Ready {
			resource_url: "https://example.com/drive".to_string(),
			elapsed_secs: 12,
			attempts: 2,
		};
		let json = serde_json::to_value(&outcome).unwrap();
		assert_eq!(json["status"], "ready");
		assert_eq!(json["attempts"], 2);
	}

	#[test]
	fn label_matches_variant() {
		assert_eq!(
			ProvisioningOutcome::TimedOut { elapsed_secs: 1 }.label(),
			"timed_out"
		);
		assert_eq!(
			ProvisioningOutcome::NotYetAvailable {
				elapsed_secs: 0,
				new_principal_likely: true
			}
			.label(),
			"not_yet_available"
		);
	}

	#[test]
	fn only_ready_is_ready() {
		assert!(ProvisioningOutcome::Ready {
			resource_url: String::new(),
			elapsed_secs: 0,
			attempts: 1
		}
		.is_ready());
		assert!(!ProvisioningOutcome::TimedOut { elapsed_secs: 0 }.is_ready());
	}
}
