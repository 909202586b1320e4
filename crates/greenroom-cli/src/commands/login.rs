// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;

use greenroom_auth::{AuthOrchestrator, AuthorizeOptions, CallbackOptions, ProviderConfig};
use greenroom_ledger::ResourceLedger;
use greenroom_provisioning::ProvisioningOutcome;

#[derive(Debug, Clone, clap::Args)]
pub struct LoginArgs {
	/// Force provisioning of the backing resource instead of waiting
	/// for the provider's lazy creation
	#[arg(long)]
	pub force_provision: bool,

	/// Skip the provisioning step entirely
	#[arg(long, conflicts_with = "force_provision")]
	pub skip_provisioning: bool,

	/// Ledger file (defaults to the platform data directory)
	#[arg(long)]
	pub ledger: Option<PathBuf>,

	/// Append audit events to this JSONL file
	#[arg(long, env = "GREENROOM_AUDIT_LOG")]
	pub audit_log: Option<PathBuf>,
}

pub async fn run(args: LoginArgs) -> anyhow::Result<()> {
	let config = ProviderConfig::from_env()?;
	let audit = super::audit_log(args.audit_log.clone());
	let orchestrator = AuthOrchestrator::new(config, audit.clone());

	let request = orchestrator.build_authorization_request(&AuthorizeOptions {
		force_backing_resource: args.force_provision.then_some(true),
		extra_scopes: Vec::new(),
	});

	println!("{}", "Open this URL in a browser and sign in:".bold());
	println!();
	println!("  {}", request.authorization_url.cyan());
	println!();
	print!("{} ", "Paste the authorization code:".bold());
	io::stdout().flush()?;

	let mut code = String::new();
	io::stdin().read_line(&mut code)?;
	let code = code.trim();
	if code.is_empty() {
		anyhow::bail!("no authorization code provided");
	}

	let sign_in = orchestrator
		.handle_callback(
			code,
			&request.state,
			&request.code_verifier,
			CallbackOptions {
				skip_provisioning: args.skip_provisioning,
				..CallbackOptions::default()
			},
		)
		.await?;

	println!();
	println!(
		"{} {} <{}>",
		"Signed in as".bold(),
		sign_in.principal.display_name.green(),
		sign_in.principal.principal_name
	);
	println!(
		"{} {} ({})",
		"Tenant:".bold(),
		sign_in.principal.tenant.display_name,
		sign_in.principal.tenant.default_domain
	);
	for license in &sign_in.principal.tenant.available_licenses {
		println!(
			"  {} {} ({} of {} available)",
			"License".dimmed(),
			license.display_name,
			license.remaining_units(),
			license.total_units
		);
	}

	match &sign_in.provisioning {
		Some(ProvisioningOutcome::Ready { elapsed_secs, attempts, .. }) => {
			println!(
				"{} ready after {attempts} attempt(s) in {elapsed_secs}s",
				"Backing resource:".bold()
			);
		}
		Some(ProvisioningOutcome::NotYetAvailable { .. }) => {
			println!(
				"{} not yet available (new account; the provider will create it lazily)",
				"Backing resource:".bold()
			);
		}
		Some(outcome) => {
			println!("{} {}", "Backing resource:".bold(), outcome.label().yellow());
		}
		None => {}
	}

	// Everything created from here on is tracked against this session.
	let ledger = Arc::new(
		ResourceLedger::load(super::ledger_path(args.ledger))
			.await?
			.with_audit(audit),
	);
	let session = ledger.open(&sign_in.principal.tenant.tenant_id).await?;

	println!();
	println!("{} {}", "Opened demo session".bold(), session.to_string().green());
	Ok(())
}
