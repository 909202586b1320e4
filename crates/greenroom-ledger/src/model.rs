// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Ledger data model.
//!
//! Sessions own an append-only list of [`ResourceRecord`]s. Records are
//! created exactly once and never mutated; successful cleanup removes
//! the live backing resource but the record stays for audit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ===== Identifiers =====

/// Opaque handle for a demo session. The only external key into the
/// ledger.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
	pub fn generate() -> Self {
		Self(Uuid::new_v4())
	}
}

impl std::fmt::Display for SessionId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::str::FromStr for SessionId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

// ===== Sessions =====

/// Lifecycle of a demo session.
///
/// `active -> cleaning -> {active | cleaned}`: a dry run returns to
/// `active`, a live run lands on `cleaned`. `active -> completed` is a
/// separate terminal transition that stops further tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
	Active,
	Cleaning,
	Cleaned,
	Completed,
}

impl std::fmt::Display for SessionStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let label = match self {
			SessionStatus::Active => "active",
			SessionStatus::Cleaning => "cleaning",
			SessionStatus::Cleaned => "cleaned",
			SessionStatus::Completed => "completed",
		};
		write!(f, "{label}")
	}
}

/// One onboarding/demo run for a tenant and everything it created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoSession {
	pub id: SessionId,
	pub tenant_id: String,
	pub started_at: DateTime<Utc>,
	pub status: SessionStatus,
	pub total_resources: u32,
	pub cleaned_resources: u32,
	pub resources: Vec<ResourceRecord>,
}

impl DemoSession {
	pub fn open(tenant_id: impl Into<String>) -> Self {
		Self {
			id: SessionId::generate(),
			tenant_id: tenant_id.into(),
			started_at: Utc::now(),
			status: SessionStatus::Active,
			total_resources: 0,
			cleaned_resources: 0,
			resources: Vec::new(),
		}
	}
}

// ===== Resources =====

/// Every provider resource the coordinator knows how to create and
/// delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
	User,
	File,
	Email,
	Chat,
	Team,
	License,
}

impl ResourceType {
	pub fn as_str(&self) -> &'static str {
		match self {
			ResourceType::User => "user",
			ResourceType::File => "file",
			ResourceType::Email => "email",
			ResourceType::Chat => "chat",
			ResourceType::Team => "team",
			ResourceType::License => "license",
		}
	}
}

impl std::fmt::Display for ResourceType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Append-only record of one created resource.
///
/// `parent_resource_id` is a relation, not ownership: it points at
/// another record's `resource_id` within the same session and may
/// dangle if that record was never tracked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
	/// Unique within the session; derived from type, provider id and
	/// creation instant so repeated provider ids stay distinct.
	pub id: String,
	pub tenant_id: String,
	pub session_id: SessionId,
	pub resource_type: ResourceType,
	pub resource_id: String,
	pub parent_resource_id: Option<String>,
	/// Provider URL the cleanup executor issues the delete against.
	pub endpoint_hint: String,
	pub display_name: String,
	pub created_at: DateTime<Utc>,
	#[serde(default)]
	pub metadata: serde_json::Value,
}

impl ResourceRecord {
	pub(crate) fn derive_id(
		resource_type: ResourceType,
		resource_id: &str,
		created_at: DateTime<Utc>,
	) -> String {
		format!(
			"{}:{}:{}",
			resource_type,
			resource_id,
			created_at.timestamp_nanos_opt().unwrap_or_default()
		)
	}
}

/// What the caller supplies when tracking a resource.
#[derive(Debug, Clone)]
pub struct TrackRequest {
	pub resource_type: ResourceType,
	pub resource_id: String,
	pub display_name: String,
	pub endpoint_hint: String,
	pub parent_resource_id: Option<String>,
	pub metadata: Option<serde_json::Value>,
}

impl TrackRequest {
	pub fn new(
		resource_type: ResourceType,
		resource_id: impl Into<String>,
		display_name: impl Into<String>,
		endpoint_hint: impl Into<String>,
	) -> Self {
		Self {
			resource_type,
			resource_id: resource_id.into(),
			display_name: display_name.into(),
			endpoint_hint: endpoint_hint.into(),
			parent_resource_id: None,
			metadata: None,
		}
	}

	pub fn parent(mut self, parent_resource_id: impl Into<String>) -> Self {
		self.parent_resource_id = Some(parent_resource_id.into());
		self
	}

	pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
		self.metadata = Some(metadata);
		self
	}
}
