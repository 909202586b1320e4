// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::AuditSinkError;
use crate::event::AuditEvent;
use crate::sink::AuditSink;

/// Appends audit events to a JSONL file, one event per line.
///
/// The file handle is opened lazily on first publish and kept open for
/// the life of the sink. Writes are flushed before `publish` returns so
/// a crash never loses an acknowledged event.
pub struct FileAuditSink {
	path: PathBuf,
	handle: Mutex<Option<File>>,
}

impl FileAuditSink {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			handle: Mutex::new(None),
		}
	}

	async fn write_line(&self, line: &str) -> Result<(), AuditSinkError> {
		let mut guard = self.handle.lock().await;

		if guard.is_none() {
			let file = OpenOptions::new()
				.create(true)
				.append(true)
				.open(&self.path)
				.await
				.map_err(|e| AuditSinkError::Transient(format!("failed to open file: {e}")))?;
			*guard = Some(file);
		}

		let file = guard
			.as_mut()
			.ok_or_else(|| AuditSinkError::Permanent("file handle not initialized".to_string()))?;

		file.write_all(line.as_bytes())
			.await
			.map_err(|e| AuditSinkError::Transient(format!("failed to write to file: {e}")))?;
		file.write_all(b"\n")
			.await
			.map_err(|e| AuditSinkError::Transient(format!("failed to write to file: {e}")))?;
		file.flush()
			.await
			.map_err(|e| AuditSinkError::Transient(format!("failed to flush file: {e}")))?;

		Ok(())
	}
}

#[async_trait]
impl AuditSink for FileAuditSink {
	fn name(&self) -> &str {
		"file"
	}

	async fn publish(&self, event: Arc<AuditEvent>) -> Result<(), AuditSinkError> {
		let line = serde_json::to_string(event.as_ref())
			.map_err(|e| AuditSinkError::Permanent(format!("failed to serialize event: {e}")))?;
		self.write_line(&line).await
	}
}
