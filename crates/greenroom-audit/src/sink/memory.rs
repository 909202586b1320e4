// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::AuditSinkError;
use crate::event::AuditEvent;
use crate::sink::AuditSink;

/// Buffers audit events in memory.
///
/// Intended for tests that need to assert on the emitted event stream.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
	events: Mutex<Vec<Arc<AuditEvent>>>,
}

impl MemoryAuditSink {
	pub fn new() -> Self {
		Self::default()
	}

	/// Snapshot of the events published so far, in publish order.
	pub async fn events(&self) -> Vec<Arc<AuditEvent>> {
		self.events.lock().await.clone()
	}
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
	fn name(&self) -> &str {
		"memory"
	}

	async fn publish(&self, event: Arc<AuditEvent>) -> Result<(), AuditSinkError> {
		self.events.lock().await.push(event);
		Ok(())
	}
}
