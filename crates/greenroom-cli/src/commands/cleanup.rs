// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;

use greenroom_ledger::{
	CleanupExecutor, HttpResourceDeleter, ItemOutcome, ResourceLedger, SessionId,
};

#[derive(Debug, Clone, clap::Args)]
pub struct CleanupArgs {
	/// Session to clean up
	pub session: SessionId,

	/// Actually delete resources; without this flag the run is a dry
	/// run that only reports what would happen
	#[arg(long)]
	pub live: bool,

	/// Bearer credential for the provider delete calls
	#[arg(long, env = "GREENROOM_ACCESS_TOKEN", hide_env_values = true)]
	pub token: Option<String>,

	/// Ledger file (defaults to the platform data directory)
	#[arg(long)]
	pub ledger: Option<PathBuf>,

	/// Append audit events to this JSONL file
	#[arg(long, env = "GREENROOM_AUDIT_LOG")]
	pub audit_log: Option<PathBuf>,
}

pub async fn run(args: CleanupArgs) -> anyhow::Result<()> {
	let token = match (&args.token, args.live) {
		(Some(token), _) => token.clone(),
		(None, false) => String::new(),
		(None, true) => {
			anyhow::bail!("--live requires a credential (--token or GREENROOM_ACCESS_TOKEN)")
		}
	};

	let audit = super::audit_log(args.audit_log.clone());
	let ledger = Arc::new(
		ResourceLedger::load(super::ledger_path(args.ledger))
			.await?
			.with_audit(audit.clone()),
	);
	let executor = CleanupExecutor::new(
		Arc::clone(&ledger),
		Arc::new(HttpResourceDeleter::new()),
		audit,
	);

	let report = executor.execute(&args.session, &token, !args.live).await?;

	if report.dry_run {
		println!(
			"{} would delete {} resource(s)",
			"Dry run:".bold(),
			report.attempted
		);
	} else {
		println!(
			"{} {} deleted, {} failed, {} attempted",
			"Cleanup complete:".bold(),
			report.succeeded.to_string().green(),
			report.failed.to_string().red(),
			report.attempted
		);
	}

	for item in &report.items {
		match &item.outcome {
			ItemOutcome::Deleted => {
				println!("  {} {} {}", "deleted".green(), item.resource_type, item.resource_id);
			}
			ItemOutcome::DryRun => {
				println!(
					"  {} {} {}",
					"would delete".dimmed(),
					item.resource_type,
					item.resource_id
				);
			}
			ItemOutcome::Failed { message } => {
				println!(
					"  {} {} {}: {}",
					"failed".red(),
					item.resource_type,
					item.resource_id,
					message
				);
			}
		}
	}
	for warning in &report.warnings {
		println!("{} {}", "warning:".yellow().bold(), warning);
	}
	Ok(())
}
