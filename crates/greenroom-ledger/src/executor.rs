// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Cleanup execution.
//!
//! Walks a [`CleanupPlan`] in dependency order and deletes each
//! resource, or only records intent when dry-running. Cleanup is
//! best-effort over the whole set: one resource failing never aborts
//! the rest of the plan.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, instrument, warn};

use greenroom_audit::{AuditEvent, AuditEventKind, AuditLog};

use crate::error::LedgerError;
use crate::model::{ResourceRecord, ResourceType, SessionId, SessionStatus};
use crate::planner::{plan_session, CleanupPlan};
use crate::store::ResourceLedger;

// ===== Deletion seam =====

#[derive(Debug, Error)]
pub enum DeleteError {
	#[error("transport error: {0}")]
	Transport(String),

	#[error("provider rejected delete ({status}): {message}")]
	Provider { status: u16, message: String },
}

/// Performs the provider delete call for one tracked resource.
#[async_trait]
pub trait ResourceDeleter: Send + Sync {
	async fn delete(&self, record: &ResourceRecord, credential: &str) -> Result<(), DeleteError>;
}

/// Deletes against the resource's stored endpoint hint with a bearer
/// credential.
pub struct HttpResourceDeleter {
	client: reqwest::Client,
}

impl HttpResourceDeleter {
	pub fn new() -> Self {
		Self {
			client: greenroom_common_http::new_client(),
		}
	}
}

impl Default for HttpResourceDeleter {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl ResourceDeleter for HttpResourceDeleter {
	async fn delete(&self, record: &ResourceRecord, credential: &str) -> Result<(), DeleteError> {
		let response = self
			.client
			.delete(&record.endpoint_hint)
			.bearer_auth(credential)
			.send()
			.await
			.map_err(|e| DeleteError::Transport(e.to_string()))?;

		let status = response.status();
		// 404 means the resource is already gone, which is the state
		// cleanup is converging toward.
		if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
			return Ok(());
		}
		let message = response.text().await.unwrap_or_default();
		Err(DeleteError::Provider {
			status: status.as_u16(),
			message,
		})
	}
}

// ===== Reports =====

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ItemOutcome {
	Deleted,
	DryRun,
	Failed { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanupItem {
	pub record_id: String,
	pub resource_type: ResourceType,
	pub resource_id: String,
	pub outcome: ItemOutcome,
}

/// Per-item account of one cleanup run.
///
/// `attempted` counts every processed resource regardless of fate; the
/// persisted session's `cleaned_resources` carries the same number.
/// Per-item success and failure live here and in the audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupReport {
	pub session_id: SessionId,
	pub dry_run: bool,
	pub attempted: u32,
	pub succeeded: u32,
	pub failed: u32,
	pub items: Vec<CleanupItem>,
	pub warnings: Vec<String>,
}

// ===== Executor =====

/// Walks cleanup plans against the live provider (or dry-runs them).
pub struct CleanupExecutor {
	ledger: Arc<ResourceLedger>,
	deleter: Arc<dyn ResourceDeleter>,
	audit: AuditLog,
}

impl CleanupExecutor {
	pub fn new(ledger: Arc<ResourceLedger>, deleter: Arc<dyn ResourceDeleter>, audit: AuditLog) -> Self {
		Self {
			ledger,
			deleter,
			audit,
		}
	}

	/// Execute cleanup for a session.
	///
	/// Transitions the session to `cleaning` (persisted before any
	/// deletion attempt), walks the plan strictly sequentially, then
	/// lands on `active` for a dry run or `cleaned` for a live run.
	#[instrument(skip(self, credential), fields(session_id = %session_id, dry_run))]
	pub async fn execute(
		&self,
		session_id: &SessionId,
		credential: &str,
		dry_run: bool,
	) -> Result<CleanupReport, LedgerError> {
		let session = self
			.ledger
			.session(session_id)
			.await
			.ok_or_else(|| LedgerError::SessionNotFound(session_id.clone()))?;
		let plan = plan_session(&session);
		for warning in &plan.warnings {
			warn!(%session_id, warning, "cleanup plan warning");
		}

		self.ledger
			.update_session(session_id, |s| s.status = SessionStatus::Cleaning)
			.await?;
		self.audit
			.record(
				AuditEvent::builder(AuditEventKind::CleanupStarted)
					.tenant_id(&session.tenant_id)
					.session_id(session_id.to_string())
					.metadata(json!({
						"dry_run": dry_run,
						"total_resources": plan.total_resources(),
					}))
					.build(),
			)
			.await;

		let report = self.walk_plan(&plan, &session.tenant_id, credential, dry_run).await;

		self.ledger
			.update_session(session_id, |s| {
				s.cleaned_resources = report.attempted;
				s.status = if dry_run {
					SessionStatus::Active
				} else {
					SessionStatus::Cleaned
				};
			})
			.await?;
		self.audit
			.record(
				AuditEvent::builder(AuditEventKind::CleanupCompleted)
					.tenant_id(&session.tenant_id)
					.session_id(session_id.to_string())
					.metadata(json!({
						"dry_run": dry_run,
						"attempted": report.attempted,
						"succeeded": report.succeeded,
						"failed": report.failed,
					}))
					.build(),
			)
			.await;

		Ok(report)
	}

	async fn walk_plan(
		&self,
		plan: &CleanupPlan,
		tenant_id: &str,
		credential: &str,
		dry_run: bool,
	) -> CleanupReport {
		let mut report = CleanupReport {
			session_id: plan.session_id.clone(),
			dry_run,
			attempted: 0,
			succeeded: 0,
			failed: 0,
			items: Vec::new(),
			warnings: plan.warnings.clone(),
		};

		for resource_type in &plan.order {
			let Some(records) = plan.groups.get(resource_type) else {
				continue;
			};
			for record in records {
				report.attempted += 1;
				let outcome = if dry_run {
					info!(
						resource_type = %record.resource_type,
						resource_id = %record.resource_id,
						endpoint = %record.endpoint_hint,
						"dry run: would delete resource"
					);
					ItemOutcome::DryRun
				} else {
					match self.deleter.delete(record, credential).await {
						Ok(()) => {
							report.succeeded += 1;
							self.record_deletion(record, tenant_id, None).await;
							ItemOutcome::Deleted
						}
						Err(e) => {
							report.failed += 1;
							warn!(
								resource_type = %record.resource_type,
								resource_id = %record.resource_id,
								error = %e,
								"resource delete failed; continuing"
							);
							self.record_deletion(record, tenant_id, Some(e.to_string())).await;
							ItemOutcome::Failed {
								message: e.to_string(),
							}
						}
					}
				};
				report.items.push(CleanupItem {
					record_id: record.id.clone(),
					resource_type: record.resource_type,
					resource_id: record.resource_id.clone(),
					outcome,
				});
			}
		}

		report
	}

	async fn record_deletion(&self, record: &ResourceRecord, tenant_id: &str, error: Option<String>) {
		let kind = if error.is_none() {
			AuditEventKind::ResourceDeleted
		} else {
			AuditEventKind::ResourceDeleteFailed
		};
		self.audit
			.record(
				AuditEvent::builder(kind)
					.succeeded(error.is_none())
					.tenant_id(tenant_id)
					.session_id(record.session_id.to_string())
					.metadata(json!({
						"resource_type": record.resource_type,
						"resource_id": record.resource_id,
						"error": error,
					}))
					.build(),
			)
			.await;
	}
}
