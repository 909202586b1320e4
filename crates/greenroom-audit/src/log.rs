// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use tracing::warn;

use crate::event::AuditEvent;
use crate::sink::AuditSink;

/// Fans audit events out to every configured sink.
///
/// Publishing is best-effort: a sink failure is logged with the sink's
/// name and never surfaces to the component that recorded the event.
/// The audit trail must not be able to fail a sign-in or a cleanup.
#[derive(Clone)]
pub struct AuditLog {
	sinks: Vec<Arc<dyn AuditSink>>,
}

impl AuditLog {
	pub fn new(sinks: Vec<Arc<dyn AuditSink>>) -> Self {
		Self { sinks }
	}

	/// An audit log with no sinks; events are dropped.
	pub fn disabled() -> Self {
		Self { sinks: Vec::new() }
	}

	/// Record one event across all sinks.
	pub async fn record(&self, event: AuditEvent) {
		let event = Arc::new(event);
		for sink in &self.sinks {
			if let Err(e) = sink.publish(Arc::clone(&event)).await {
				warn!(sink = sink.name(), error = %e, "audit sink publish failed");
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::AuditSinkError;
	use crate::event::AuditEventKind;
	use crate::sink::MemoryAuditSink;
	use async_trait::async_trait;

	struct FailingSink;

	#[async_trait]
	impl AuditSink for FailingSink {
		fn name(&self) -> &str {
			"failing"
		}

		async fn publish(&self, _event: Arc<AuditEvent>) -> Result<(), AuditSinkError> {
			Err(AuditSinkError::Transient("boom".to_string()))
		}
	}

	#[tokio::test]
	async fn failing_sink_does_not_block_others() {
		let memory = Arc::new(MemoryAuditSink::new());
		let log = AuditLog::new(vec![Arc::new(FailingSink), Arc::clone(&memory) as _]);

		log.record(AuditEvent::builder(AuditEventKind::SignIn).build())
			.await;

		assert_eq!(memory.events().await.len(), 1);
	}

	#[tokio::test]
	async fn disabled_log_drops_events() {
		let log = AuditLog::disabled();
		log.record(AuditEvent::builder(AuditEventKind::SignIn).build())
			.await;
	}
}
