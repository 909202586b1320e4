// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;

use greenroom_ledger::{CleanupPlanner, ResourceLedger, SessionId};

#[derive(Debug, Clone, clap::Args)]
pub struct PlanArgs {
	/// Session to plan cleanup for
	pub session: SessionId,

	/// Ledger file (defaults to the platform data directory)
	#[arg(long)]
	pub ledger: Option<PathBuf>,

	/// Output raw JSON
	#[arg(long)]
	pub json: bool,
}

pub async fn run(args: PlanArgs) -> anyhow::Result<()> {
	let ledger = Arc::new(ResourceLedger::load(super::ledger_path(args.ledger)).await?);
	let planner = CleanupPlanner::new(ledger);
	let plan = planner.plan(&args.session).await?;

	if args.json {
		println!("{}", serde_json::to_string_pretty(&plan)?);
		return Ok(());
	}

	if plan.order.is_empty() {
		println!("{}", "nothing to clean up".dimmed());
		return Ok(());
	}

	println!(
		"{} {} resources in {} deletion group(s)",
		"Cleanup plan:".bold(),
		plan.total_resources(),
		plan.order.len()
	);
	for resource_type in &plan.order {
		let records = &plan.groups[resource_type];
		println!("  {} ({})", resource_type.to_string().bold(), records.len());
		for record in records {
			println!(
				"    {}  {}  {}",
				record.resource_id.yellow(),
				record.display_name,
				record.endpoint_hint.dimmed()
			);
		}
	}
	for warning in &plan.warnings {
		println!("{} {}", "warning:".yellow().bold(), warning);
	}
	Ok(())
}
