// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Session-scoped resource ledger with dependency-ordered cleanup.
//!
//! Every resource created during a demo session is tracked in a durable
//! ledger so tenant state can be converged back to empty afterwards.
//! Three pieces cooperate:
//!
//! - [`ResourceLedger`]: file-backed store of sessions and their
//!   append-only resource records. Every mutation persists the full
//!   document before returning.
//! - [`CleanupPlanner`]: derives a most-dependent-first deletion plan
//!   from a session.
//! - [`CleanupExecutor`]: walks the plan with dry-run/live semantics
//!   and per-item failure tolerance.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use greenroom_audit::AuditLog;
//! use greenroom_ledger::{
//! 	CleanupExecutor, HttpResourceDeleter, ResourceLedger, ResourceType, TrackRequest,
//! };
//!
//! # async fn example() -> Result<(), greenroom_ledger::LedgerError> {
//! let ledger = Arc::new(ResourceLedger::load(ResourceLedger::default_path()).await?);
//! let session = ledger.open("tenant-id").await?;
//! ledger
//! 	.track(
//! 		&session,
//! 		TrackRequest::new(
//! 			ResourceType::User,
//! 			"user-object-id",
//! 			"Demo User",
//! 			"https://graph.microsoft.com/v1.0/users/user-object-id",
//! 		),
//! 	)
//! 	.await?;
//!
//! let executor = CleanupExecutor::new(
//! 	Arc::clone(&ledger),
//! 	Arc::new(HttpResourceDeleter::new()),
//! 	AuditLog::disabled(),
//! );
//! let report = executor.execute(&session, "access-token", true).await?;
//! println!("would delete {} resources", report.attempted);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod executor;
pub mod model;
pub mod planner;
pub mod store;

pub use error::LedgerError;
pub use executor::{
	CleanupExecutor, CleanupItem, CleanupReport, DeleteError, HttpResourceDeleter, ItemOutcome,
	ResourceDeleter,
};
pub use model::{
	DemoSession, ResourceRecord, ResourceType, SessionId, SessionStatus, TrackRequest,
};
pub use planner::{plan_session, CleanupPlan, CleanupPlanner, DELETION_ORDER};
pub use store::ResourceLedger;
