// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;
use std::sync::Arc;

use greenroom_audit::{AuditLog, TracingAuditSink};
use greenroom_ledger::ResourceLedger;

pub mod cleanup;
pub mod login;
pub mod plan;
pub mod sessions;

pub(crate) fn ledger_path(arg: Option<PathBuf>) -> PathBuf {
	arg.unwrap_or_else(ResourceLedger::default_path)
}

/// Audit log used by all commands: structured events on the tracing
/// pipeline, plus a JSONL file when one is configured.
pub(crate) fn audit_log(file: Option<PathBuf>) -> AuditLog {
	let mut sinks: Vec<Arc<dyn greenroom_audit::AuditSink>> = vec![Arc::new(TracingAuditSink::new())];
	if let Some(path) = file {
		sinks.push(Arc::new(greenroom_audit::FileAuditSink::new(path)));
	}
	AuditLog::new(sinks)
}
