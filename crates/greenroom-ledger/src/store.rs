// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Durable, file-backed resource ledger.
//!
//! The whole ledger is one JSON document keyed by session id, loaded at
//! construction and fully rewritten on every mutation. Writes go to a
//! temp file first and land with a rename, so a crash mid-save leaves
//! the previous document intact. A single [`tokio::sync::Mutex`]
//! serializes writers; write volume is operator-triggered and low.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use greenroom_audit::{AuditEvent, AuditEventKind, AuditLog};

use crate::error::LedgerError;
use crate::model::{DemoSession, ResourceRecord, SessionId, SessionStatus, TrackRequest};

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerDocument {
	#[serde(default)]
	sessions: BTreeMap<SessionId, DemoSession>,
}

/// The single writer for all session state.
pub struct ResourceLedger {
	path: PathBuf,
	audit: AuditLog,
	inner: Mutex<LedgerDocument>,
}

impl ResourceLedger {
	/// Default ledger location under the platform data directory.
	pub fn default_path() -> PathBuf {
		dirs::data_dir()
			.unwrap_or_else(|| PathBuf::from("."))
			.join("greenroom")
			.join("ledger.json")
	}

	/// Load the ledger document from `path`, starting empty when the
	/// file does not exist yet.
	pub async fn load(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
		let path = path.into();
		let document = match tokio::fs::read_to_string(&path).await {
			Ok(raw) => serde_json::from_str(&raw)?,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => LedgerDocument::default(),
			Err(e) => return Err(e.into()),
		};
		debug!(
			path = %path.display(),
			sessions = document.sessions.len(),
			"loaded resource ledger"
		);
		Ok(Self {
			path,
			audit: AuditLog::disabled(),
			inner: Mutex::new(document),
		})
	}

	/// Attach an audit log; session and tracking mutations publish
	/// events through it.
	pub fn with_audit(mut self, audit: AuditLog) -> Self {
		self.audit = audit;
		self
	}

	/// Open a fresh `active` session for a tenant and persist it.
	#[instrument(skip(self))]
	pub async fn open(&self, tenant_id: &str) -> Result<SessionId, LedgerError> {
		let session = DemoSession::open(tenant_id);
		let session_id = session.id.clone();
		{
			let mut doc = self.inner.lock().await;
			doc.sessions.insert(session_id.clone(), session);
			self.save(&doc).await?;
		}
		self.audit
			.record(
				AuditEvent::builder(AuditEventKind::SessionOpened)
					.tenant_id(tenant_id)
					.session_id(session_id.to_string())
					.build(),
			)
			.await;
		Ok(session_id)
	}

	/// Append a resource record to a session and persist.
	///
	/// Fails with [`LedgerError::SessionNotFound`] when the session is
	/// unknown and [`LedgerError::SessionNotActive`] when it is no
	/// longer `active`; neither path mutates anything.
	#[instrument(skip(self, request), fields(session_id = %session_id, resource_type = %request.resource_type))]
	pub async fn track(
		&self,
		session_id: &SessionId,
		request: TrackRequest,
	) -> Result<ResourceRecord, LedgerError> {
		let record = {
			let mut doc = self.inner.lock().await;
			let session = doc
				.sessions
				.get_mut(session_id)
				.ok_or_else(|| LedgerError::SessionNotFound(session_id.clone()))?;
			if session.status != SessionStatus::Active {
				return Err(LedgerError::SessionNotActive {
					session_id: session_id.clone(),
					status: session.status,
				});
			}

			let created_at = Utc::now();
			let record = ResourceRecord {
				id: ResourceRecord::derive_id(request.resource_type, &request.resource_id, created_at),
				tenant_id: session.tenant_id.clone(),
				session_id: session_id.clone(),
				resource_type: request.resource_type,
				resource_id: request.resource_id,
				parent_resource_id: request.parent_resource_id,
				endpoint_hint: request.endpoint_hint,
				display_name: request.display_name,
				created_at,
				metadata: request.metadata.unwrap_or(serde_json::Value::Null),
			};
			session.resources.push(record.clone());
			session.total_resources = session.resources.len() as u32;
			self.save(&doc).await?;
			record
		};
		self.audit
			.record(
				AuditEvent::builder(AuditEventKind::ResourceTracked)
					.tenant_id(&record.tenant_id)
					.session_id(session_id.to_string())
					.metadata(json!({
						"resource_type": record.resource_type,
						"resource_id": record.resource_id,
					}))
					.build(),
			)
			.await;
		Ok(record)
	}

	/// Resources of a session in tracking order. Empty when the session
	/// is unknown; callers who need to distinguish check existence via
	/// [`Self::session`].
	pub async fn resources_of(&self, session_id: &SessionId) -> Vec<ResourceRecord> {
		let doc = self.inner.lock().await;
		doc.sessions
			.get(session_id)
			.map(|s| s.resources.clone())
			.unwrap_or_default()
	}

	pub async fn session(&self, session_id: &SessionId) -> Option<DemoSession> {
		let doc = self.inner.lock().await;
		doc.sessions.get(session_id).cloned()
	}

	pub async fn sessions(&self) -> Vec<DemoSession> {
		let doc = self.inner.lock().await;
		doc.sessions.values().cloned().collect()
	}

	/// Mark a session `completed`. Terminal; no further tracking is
	/// expected against it.
	#[instrument(skip(self))]
	pub async fn complete(&self, session_id: &SessionId) -> Result<(), LedgerError> {
		let tenant_id = {
			let mut doc = self.inner.lock().await;
			let session = doc
				.sessions
				.get_mut(session_id)
				.ok_or_else(|| LedgerError::SessionNotFound(session_id.clone()))?;
			session.status = SessionStatus::Completed;
			let tenant_id = session.tenant_id.clone();
			self.save(&doc).await?;
			tenant_id
		};
		self.audit
			.record(
				AuditEvent::builder(AuditEventKind::SessionCompleted)
					.tenant_id(tenant_id)
					.session_id(session_id.to_string())
					.build(),
			)
			.await;
		Ok(())
	}

	/// Apply `update` to a session and persist. The cleanup executor
	/// drives status and counter transitions through this.
	pub(crate) async fn update_session(
		&self,
		session_id: &SessionId,
		update: impl FnOnce(&mut DemoSession),
	) -> Result<(), LedgerError> {
		let mut doc = self.inner.lock().await;
		let session = doc
			.sessions
			.get_mut(session_id)
			.ok_or_else(|| LedgerError::SessionNotFound(session_id.clone()))?;
		update(session);
		self.save(&doc).await
	}

	/// Atomic full-document save: write a temp file, then rename over
	/// the target.
	async fn save(&self, document: &LedgerDocument) -> Result<(), LedgerError> {
		if let Some(parent) = self.path.parent() {
			tokio::fs::create_dir_all(parent).await?;
		}
		let json = serde_json::to_string_pretty(document)?;
		let tmp_path = tmp_path_for(&self.path);
		tokio::fs::write(&tmp_path, &json).await?;
		tokio::fs::rename(&tmp_path, &self.path).await?;
		debug!(path = %self.path.display(), "saved resource ledger");
		Ok(())
	}
}

fn tmp_path_for(path: &Path) -> PathBuf {
	let mut name = path
		.file_name()
		.map(|n| n.to_os_string())
		.unwrap_or_default();
	name.push(".tmp");
	path.with_file_name(name)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::ResourceType;
	use tempfile::TempDir;

	async fn create_test_ledger() -> (ResourceLedger, TempDir) {
		let tmp = TempDir::new().unwrap();
		let ledger = ResourceLedger::load(tmp.path().join("ledger.json"))
			.await
			.unwrap();
		(ledger, tmp)
	}

	fn user_request(id: &str) -> TrackRequest {
		TrackRequest::new(
			ResourceType::User,
			id,
			format!("User {id}"),
			format!("https://graph.example.com/v1.0/users/{id}"),
		)
	}

	#[tokio::test]
	async fn open_creates_active_session() {
		let (ledger, _tmp) = create_test_ledger().await;
		let id = ledger.open("tenant-1").await.unwrap();

		let session = ledger.session(&id).await.unwrap();
		assert_eq!(session.tenant_id, "tenant-1");
		assert_eq!(session.status, SessionStatus::Active);
		assert_eq!(session.total_resources, 0);
	}

	#[tokio::test]
	async fn track_appends_and_recounts() {
		let (ledger, _tmp) = create_test_ledger().await;
		let id = ledger.open("tenant-1").await.unwrap();

		ledger.track(&id, user_request("u1")).await.unwrap();
		let record = ledger.track(&id, user_request("u2")).await.unwrap();

		assert_eq!(record.tenant_id, "tenant-1");
		let session = ledger.session(&id).await.unwrap();
		assert_eq!(session.total_resources, 2);
		assert_eq!(session.resources.len(), 2);
		assert_eq!(session.resources[0].resource_id, "u1");
		assert_eq!(session.resources[1].resource_id, "u2");
	}

	#[tokio::test]
	async fn track_unknown_session_fails_without_mutation() {
		let (ledger, _tmp) = create_test_ledger().await;
		let known = ledger.open("tenant-1").await.unwrap();
		let unknown = SessionId::generate();

		let err = ledger.track(&unknown, user_request("u1")).await.unwrap_err();
		assert!(matches!(err, LedgerError::SessionNotFound(_)));

		// Nothing changed anywhere in the ledger.
		assert!(ledger.session(&unknown).await.is_none());
		assert!(ledger.resources_of(&known).await.is_empty());
		assert_eq!(ledger.sessions().await.len(), 1);
	}

	#[tokio::test]
	async fn resources_of_unknown_session_is_empty() {
		let (ledger, _tmp) = create_test_ledger().await;
		assert!(ledger.resources_of(&SessionId::generate()).await.is_empty());
	}

	#[tokio::test]
	async fn mutations_survive_a_reload() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("ledger.json");

		let id = {
			let ledger = ResourceLedger::load(&path).await.unwrap();
			let id = ledger.open("tenant-1").await.unwrap();
			ledger.track(&id, user_request("u1")).await.unwrap();
			id
		};

		let reloaded = ResourceLedger::load(&path).await.unwrap();
		let session = reloaded.session(&id).await.unwrap();
		assert_eq!(session.total_resources, 1);
		assert_eq!(session.resources[0].resource_id, "u1");
	}

	#[tokio::test]
	async fn complete_is_terminal_status() {
		let (ledger, _tmp) = create_test_ledger().await;
		let id = ledger.open("tenant-1").await.unwrap();

		ledger.complete(&id).await.unwrap();
		let session = ledger.session(&id).await.unwrap();
		assert_eq!(session.status, SessionStatus::Completed);
	}

	#[tokio::test]
	async fn track_after_complete_is_rejected() {
		let (ledger, _tmp) = create_test_ledger().await;
		let id = ledger.open("tenant-1").await.unwrap();
		ledger.complete(&id).await.unwrap();

		let err = ledger.track(&id, user_request("u1")).await.unwrap_err();
		assert!(matches!(
			err,
			LedgerError::SessionNotActive {
				status: SessionStatus::Completed,
				..
			}
		));

		// Terminal means terminal: the session stayed untouched.
		let session = ledger.session(&id).await.unwrap();
		assert_eq!(session.status, SessionStatus::Completed);
		assert_eq!(session.total_resources, 0);
		assert!(session.resources.is_empty());
	}

	#[tokio::test]
	async fn track_into_cleaned_session_is_rejected() {
		let (ledger, _tmp) = create_test_ledger().await;
		let id = ledger.open("tenant-1").await.unwrap();
		ledger
			.update_session(&id, |s| s.status = SessionStatus::Cleaned)
			.await
			.unwrap();

		let err = ledger.track(&id, user_request("u1")).await.unwrap_err();
		assert!(matches!(
			err,
			LedgerError::SessionNotActive {
				status: SessionStatus::Cleaned,
				..
			}
		));
	}

	#[tokio::test]
	async fn complete_unknown_session_fails() {
		let (ledger, _tmp) = create_test_ledger().await;
		let err = ledger.complete(&SessionId::generate()).await.unwrap_err();
		assert!(matches!(err, LedgerError::SessionNotFound(_)));
	}

	#[tokio::test]
	async fn save_leaves_no_temp_file_behind() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("ledger.json");
		let ledger = ResourceLedger::load(&path).await.unwrap();
		ledger.open("tenant-1").await.unwrap();

		assert!(path.exists());
		assert!(!tmp_path_for(&path).exists());
	}

	#[tokio::test]
	async fn repeated_resource_ids_get_distinct_record_ids() {
		let (ledger, _tmp) = create_test_ledger().await;
		let id = ledger.open("tenant-1").await.unwrap();

		let a = ledger.track(&id, user_request("u1")).await.unwrap();
		let b = ledger.track(&id, user_request("u1")).await.unwrap();
		assert_ne!(a.id, b.id);
	}
}
