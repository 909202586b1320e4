// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Core event types for the audit trail.
//!
//! - [`AuditEventKind`]: enumeration of all auditable lifecycle events
//! - [`AuditEvent`]: complete audit record
//! - [`AuditEventBuilder`]: fluent API for constructing events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Types of events that can be recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventKind {
	// Authentication events
	SignIn,
	SignInFailed,

	// Session events
	SessionOpened,
	SessionCompleted,

	// Resource events
	ResourceTracked,
	ResourceDeleted,
	ResourceDeleteFailed,

	// Cleanup events
	CleanupStarted,
	CleanupCompleted,
}

impl fmt::Display for AuditEventKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			AuditEventKind::SignIn => "sign_in",
			AuditEventKind::SignInFailed => "sign_in_failed",
			AuditEventKind::SessionOpened => "session_opened",
			AuditEventKind::SessionCompleted => "session_completed",
			AuditEventKind::ResourceTracked => "resource_tracked",
			AuditEventKind::ResourceDeleted => "resource_deleted",
			AuditEventKind::ResourceDeleteFailed => "resource_delete_failed",
			AuditEventKind::CleanupStarted => "cleanup_started",
			AuditEventKind::CleanupCompleted => "cleanup_completed",
		};
		write!(f, "{s}")
	}
}

/// A record in the audit trail.
///
/// Events are append-only: once emitted they are never mutated or
/// deleted. The optional correlation fields identify the acting
/// principal, the tenant it belongs to, and the demo session the action
/// was scoped to, when known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
	/// Unique identifier for this event.
	pub id: Uuid,
	/// When the event occurred.
	pub timestamp: DateTime<Utc>,
	/// The type of event.
	pub kind: AuditEventKind,
	/// Whether the audited action succeeded.
	pub succeeded: bool,

	/// The principal the action was performed as (if known).
	pub principal_id: Option<String>,
	/// The tenant the action was scoped to (if known).
	pub tenant_id: Option<String>,
	/// The demo session the action was scoped to (if known).
	pub session_id: Option<String>,

	/// Additional event-specific details.
	pub metadata: serde_json::Value,
}

impl AuditEvent {
	/// Create a new builder for the given event kind.
	pub fn builder(kind: AuditEventKind) -> AuditEventBuilder {
		AuditEventBuilder::new(kind)
	}
}

/// Builder for constructing audit events with a fluent API.
#[derive(Debug, Clone)]
pub struct AuditEventBuilder {
	kind: AuditEventKind,
	succeeded: bool,
	principal_id: Option<String>,
	tenant_id: Option<String>,
	session_id: Option<String>,
	metadata: serde_json::Value,
}

impl AuditEventBuilder {
	pub fn new(kind: AuditEventKind) -> Self {
		Self {
			kind,
			succeeded: true,
			principal_id: None,
			tenant_id: None,
			session_id: None,
			metadata: serde_json::Value::Null,
		}
	}

	pub fn succeeded(mut self, succeeded: bool) -> Self {
		self.succeeded = succeeded;
		self
	}

	pub fn principal_id(mut self, id: impl Into<String>) -> Self {
		self.principal_id = Some(id.into());
		self
	}

	pub fn tenant_id(mut self, id: impl Into<String>) -> Self {
		self.tenant_id = Some(id.into());
		self
	}

	pub fn session_id(mut self, id: impl Into<String>) -> Self {
		self.session_id = Some(id.into());
		self
	}

	pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
		self.metadata = metadata;
		self
	}

	/// Finalize the event, assigning its id and timestamp.
	pub fn build(self) -> AuditEvent {
		AuditEvent {
			id: Uuid::new_v4(),
			timestamp: Utc::now(),
			kind: self.kind,
			succeeded: self.succeeded,
			principal_id: self.principal_id,
			tenant_id: self.tenant_id,
			session_id: self.session_id,
			metadata: self.metadata,
		}
	}
}
