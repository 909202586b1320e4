// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

use crate::model::{SessionId, SessionStatus};

/// Errors from the resource ledger and its cleanup machinery.
#[derive(Debug, Error)]
pub enum LedgerError {
	/// The caller referenced a session the ledger has never seen.
	#[error("session not found: {0}")]
	SessionNotFound(SessionId),

	/// The session exists but its lifecycle state forbids the
	/// operation; `completed` is terminal and accepts no further
	/// tracking.
	#[error("session {session_id} is {status}, not active")]
	SessionNotActive {
		session_id: SessionId,
		status: SessionStatus,
	},

	#[error("ledger io error: {0}")]
	Io(#[from] std::io::Error),

	#[error("ledger serialization error: {0}")]
	Serde(#[from] serde_json::Error),
}
