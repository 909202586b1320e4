// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Append-only audit trail for tenant lifecycle events.
//!
//! Components record one [`AuditEvent`] per security- or
//! lifecycle-relevant action (sign-in, resource tracking, cleanup).
//! Events fan out through [`AuditLog`] to every configured
//! [`AuditSink`]; a failing sink is logged and never fails the caller.

pub mod error;
pub mod event;
pub mod log;
pub mod sink;

pub use error::AuditSinkError;
pub use event::{AuditEvent, AuditEventBuilder, AuditEventKind};
pub use log::AuditLog;
pub use sink::{AuditSink, FileAuditSink, MemoryAuditSink, TracingAuditSink};
