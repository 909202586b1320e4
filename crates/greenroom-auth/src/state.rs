// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The OAuth `state` value.
//!
//! `state` is an unguessable token bound to one authorization attempt.
//! Greenroom additionally embeds the caller's forced-provisioning
//! preference inside it, because the value is the only piece of the
//! request guaranteed to survive the redirect round-trip through an
//! external browser. Verifying that the callback's `state` matches the
//! one issued remains the caller's responsibility.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Decoded contents of a Greenroom `state` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
	/// Random token making the state unguessable.
	pub nonce: String,
	/// The forced-provisioning preference recorded at request time,
	/// when the caller expressed one.
	pub force_provision: Option<bool>,
}

impl AuthState {
	/// Create a state with a fresh random nonce.
	pub fn new(force_provision: Option<bool>) -> Self {
		let mut nonce_bytes = [0u8; 24];
		getrandom::getrandom(&mut nonce_bytes).expect("failed to generate random bytes");

		Self {
			nonce: URL_SAFE_NO_PAD.encode(nonce_bytes),
			force_provision,
		}
	}

	/// Encode for use as the `state` query parameter.
	pub fn encode(&self) -> String {
		let json = serde_json::to_vec(self).expect("state serialization cannot fail");
		URL_SAFE_NO_PAD.encode(json)
	}

	/// Decode a callback's `state` parameter.
	///
	/// Returns `None` for values this process did not mint (foreign or
	/// corrupted states); callers fall back to their default
	/// provisioning preference in that case.
	pub fn decode(encoded: &str) -> Option<Self> {
		let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
		match serde_json::from_slice(&bytes) {
			Ok(state) => Some(state),
			Err(e) => {
				debug!(error = %e, "state value did not decode");
				None
			}
		}
	}
}
