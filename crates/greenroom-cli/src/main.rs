// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Greenroom operator CLI.
//!
//! Signs an administrator into a demo tenant, tracks the resources a
//! session creates, and plans/executes dependency-ordered cleanup.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// Greenroom - tenant onboarding and resource lifecycle coordinator
#[derive(Parser, Debug)]
#[command(name = "greenroom", version, about, long_about = None)]
struct Args {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Sign an administrator in and open a tracked demo session
	Login(commands::login::LoginArgs),
	/// List demo sessions in the ledger
	Sessions(commands::sessions::SessionsArgs),
	/// Show the cleanup plan for a session
	Plan(commands::plan::PlanArgs),
	/// Run cleanup for a session (dry run unless --live)
	Cleanup(commands::cleanup::CleanupArgs),
}

fn init_tracing() {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("greenroom=info"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.init();
}

#[tokio::main]
async fn main() -> Result<()> {
	init_tracing();

	let args = Args::parse();
	match args.command {
		Command::Login(args) => commands::login::run(args).await,
		Command::Sessions(args) => commands::sessions::run(args).await,
		Command::Plan(args) => commands::plan::run(args).await,
		Command::Cleanup(args) => commands::cleanup::run(args).await,
	}
}
