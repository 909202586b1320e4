// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::error::AuditSinkError;
use crate::event::AuditEvent;
use crate::sink::AuditSink;

/// Emits each audit event as a structured `tracing` log line.
///
/// This is the default sink: it costs nothing to configure and the
/// events land wherever the process's subscriber sends them.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl AuditSink for TracingAuditSink {
	fn name(&self) -> &str {
		"tracing"
	}

	async fn publish(&self, event: Arc<AuditEvent>) -> Result<(), AuditSinkError> {
		info!(
			target: "greenroom::audit",
			event_id = %event.id,
			kind = %event.kind,
			succeeded = event.succeeded,
			principal_id = event.principal_id.as_deref().unwrap_or(""),
			tenant_id = event.tenant_id.as_deref().unwrap_or(""),
			session_id = event.session_id.as_deref().unwrap_or(""),
			metadata = %event.metadata,
			"audit event"
		);
		Ok(())
	}
}
