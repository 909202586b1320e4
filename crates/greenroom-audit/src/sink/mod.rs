// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Audit sinks.
//!
//! A sink is a destination for audit events. The deployment chooses the
//! backend: structured log output, an append-only JSONL file, or (in
//! tests) an in-memory buffer.

mod file;
mod memory;
mod tracing;

pub use file::FileAuditSink;
pub use memory::MemoryAuditSink;
pub use tracing::TracingAuditSink;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AuditSinkError;
use crate::event::AuditEvent;

/// A destination for audit events.
#[async_trait]
pub trait AuditSink: Send + Sync {
	/// Short identifier used in diagnostics when publishing fails.
	fn name(&self) -> &str;

	/// Publish one event to the sink.
	async fn publish(&self, event: Arc<AuditEvent>) -> Result<(), AuditSinkError>;
}
