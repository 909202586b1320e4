// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Dependency-ordered cleanup planning.
//!
//! Deletion order is fixed, most-dependent-first, mirroring the
//! provider's dependency direction: files hang off users, licenses bind
//! users to SKUs, teams own their members. Deleting in this order never
//! hits a "still referenced" rejection.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::error::LedgerError;
use crate::model::{DemoSession, ResourceRecord, ResourceType, SessionId};
use crate::store::ResourceLedger;

/// Fixed deletion order, most-dependent-first.
pub const DELETION_ORDER: [ResourceType; 6] = [
	ResourceType::File,
	ResourceType::Email,
	ResourceType::Chat,
	ResourceType::License,
	ResourceType::User,
	ResourceType::Team,
];

/// A session's resources grouped and ordered for deletion.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupPlan {
	pub session_id: SessionId,
	/// Deletion order restricted to the types this session actually
	/// holds.
	pub order: Vec<ResourceType>,
	/// Records per type, in ledger insertion order (oldest first).
	pub groups: BTreeMap<ResourceType, Vec<ResourceRecord>>,
	/// Advisory only; never blocks execution.
	pub warnings: Vec<String>,
}

impl CleanupPlan {
	pub fn total_resources(&self) -> usize {
		self.groups.values().map(Vec::len).sum()
	}
}

/// Derive a plan from a session snapshot.
pub fn plan_session(session: &DemoSession) -> CleanupPlan {
	let mut groups: BTreeMap<ResourceType, Vec<ResourceRecord>> = BTreeMap::new();
	for record in &session.resources {
		groups
			.entry(record.resource_type)
			.or_default()
			.push(record.clone());
	}

	let order: Vec<ResourceType> = DELETION_ORDER
		.into_iter()
		.filter(|t| groups.contains_key(t))
		.collect();

	let mut warnings = Vec::new();
	// Users without any license record usually mean a license was
	// assigned outside the tracked session and will outlive cleanup.
	if groups.contains_key(&ResourceType::User) && !groups.contains_key(&ResourceType::License) {
		warnings.push(format!(
			"session {} tracks user resources but no license resources; \
			 license assignments may be orphaned after cleanup",
			session.id
		));
	}

	CleanupPlan {
		session_id: session.id.clone(),
		order,
		groups,
		warnings,
	}
}

/// Ledger-backed planner.
pub struct CleanupPlanner {
	ledger: Arc<ResourceLedger>,
}

impl CleanupPlanner {
	pub fn new(ledger: Arc<ResourceLedger>) -> Self {
		Self { ledger }
	}

	#[instrument(skip(self), fields(session_id = %session_id))]
	pub async fn plan(&self, session_id: &SessionId) -> Result<CleanupPlan, LedgerError> {
		let session = self
			.ledger
			.session(session_id)
			.await
			.ok_or_else(|| LedgerError::SessionNotFound(session_id.clone()))?;
		Ok(plan_session(&session))
	}
}
