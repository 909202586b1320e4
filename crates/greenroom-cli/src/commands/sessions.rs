// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use colored::Colorize;

use greenroom_ledger::{ResourceLedger, SessionStatus};

#[derive(Debug, Clone, clap::Args)]
pub struct SessionsArgs {
	/// Ledger file (defaults to the platform data directory)
	#[arg(long)]
	pub ledger: Option<PathBuf>,

	/// Output raw JSON
	#[arg(long)]
	pub json: bool,
}

pub async fn run(args: SessionsArgs) -> anyhow::Result<()> {
	let ledger = ResourceLedger::load(super::ledger_path(args.ledger)).await?;
	let sessions = ledger.sessions().await;

	if args.json {
		println!("{}", serde_json::to_string_pretty(&sessions)?);
		return Ok(());
	}

	if sessions.is_empty() {
		println!("{}", "no demo sessions".dimmed());
		return Ok(());
	}

	for session in sessions {
		let status = match session.status {
			SessionStatus::Active => "active".green(),
			SessionStatus::Cleaning => "cleaning".yellow(),
			SessionStatus::Cleaned => "cleaned".blue(),
			SessionStatus::Completed => "completed".dimmed(),
		};
		println!(
			"{}  {}  {}  {} resources ({} cleaned)  started {}",
			session.id.to_string().yellow(),
			session.tenant_id,
			status,
			session.total_resources,
			session.cleaned_resources,
			session.started_at.format("%Y-%m-%d %H:%M:%S %Z")
		);
	}
	Ok(())
}
