// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Secret wrapper type for Greenroom.
//!
//! [`SecretString`] wraps sensitive values (OAuth client secrets, access
//! tokens) so they cannot leak through `Debug`/`Display` formatting or
//! tracing output. The inner value is zeroed on drop.
//!
//! # Example
//!
//! ```
//! use greenroom_common_secret::SecretString;
//!
//! let secret = SecretString::new("hunter2".to_string());
//! assert_eq!(format!("{secret:?}"), "SecretString([REDACTED])");
//! assert_eq!(secret.expose(), "hunter2");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroize;

/// A string whose value is redacted in all formatted output.
///
/// Access the underlying value explicitly via [`SecretString::expose`].
/// Serde support is transparent so secrets can live inside persisted
/// structures; callers are responsible for where those documents land.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
	/// Wrap a sensitive value.
	pub fn new(value: String) -> Self {
		Self(value)
	}

	/// Expose the underlying value.
	///
	/// Call sites should be the only places the raw value appears, which
	/// makes accidental logging easy to spot in review.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Whether the wrapped value is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretString([REDACTED])")
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[REDACTED]")
	}
}

impl Drop for SecretString {
	fn drop(&mut self) {
		self.0.zeroize();
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value.to_string())
	}
}

impl Serialize for SecretString {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.0)
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		String::deserialize(deserializer).map(Self::new)
	}
}
