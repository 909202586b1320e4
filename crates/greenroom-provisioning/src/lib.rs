// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Forced provisioning of the delayed backing resource.
//!
//! The identity provider creates a per-user backing resource (the
//! user's drive) asynchronously, some unpredictable time after the
//! account itself exists. Reading the resource endpoint nudges the
//! provider into provisioning it, so the retrier here polls that
//! endpoint with a capped backoff until the resource is ready or a
//! budget runs out.
//!
//! # Outcome, not error
//!
//! [`force_ready`](ProvisioningRetrier::force_ready) never raises past
//! its own boundary: every transport and provider fault is folded into
//! exactly one [`ProvisioningOutcome`] per invocation. A sign-in that
//! triggers forced provisioning treats the outcome as informational.

pub mod outcome;
pub mod probe;
pub mod retrier;

pub use outcome::ProvisioningOutcome;
pub use probe::{BackingResourceProbe, HttpBackingResourceProbe, ProbeError, ProbeStatus};
pub use retrier::{ForceReadyOptions, ProvisioningRetrier};
