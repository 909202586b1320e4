// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The bounded-retry loop that forces eager provisioning.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::outcome::ProvisioningOutcome;
use crate::probe::{BackingResourceProbe, ProbeStatus};

/// Default wall-clock budget for one forced-provisioning run.
pub const DEFAULT_MAX_WAIT_SECS: u64 = 300;

/// Default number of probe attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// Cap on the backoff between attempts, in seconds.
const BACKOFF_CAP_SECS: u64 = 30;

/// Backoff before the attempt after `attempt`: `min(attempt * 10, 30)`
/// seconds. Monotonically non-decreasing; for attempts 1..5 the
/// sequence is exactly 10, 20, 30, 30, 30.
pub fn backoff_delay(attempt: u32) -> Duration {
	Duration::from_secs((u64::from(attempt) * 10).min(BACKOFF_CAP_SECS))
}

/// Knobs for one [`ProvisioningRetrier::force_ready`] run.
#[derive(Debug, Clone)]
pub struct ForceReadyOptions {
	/// Total wall-clock budget; checked before each backoff sleep.
	pub max_wait_secs: u64,
	/// Maximum number of probe attempts.
	pub max_attempts: u32,
	/// Cancelling this token aborts a pending backoff sleep; the run
	/// resolves to `TimedOut` with the elapsed time attached.
	pub cancel: CancellationToken,
}

impl Default for ForceReadyOptions {
	fn default() -> Self {
		Self {
			max_wait_secs: DEFAULT_MAX_WAIT_SECS,
			max_attempts: DEFAULT_MAX_ATTEMPTS,
			cancel: CancellationToken::new(),
		}
	}
}

/// Drives the backing resource from "not yet created" to "ready".
///
/// Safe to invoke repeatedly for the same principal: the probe only
/// performs reads, and an already-provisioned resource resolves to
/// `Ready` on the first attempt.
pub struct ProvisioningRetrier {
	probe: Arc<dyn BackingResourceProbe>,
}

impl ProvisioningRetrier {
	pub fn new(probe: Arc<dyn BackingResourceProbe>) -> Self {
		Self { probe }
	}

	/// Poll the backing resource endpoint until it is ready or a budget
	/// runs out.
	///
	/// Every transport and provider fault is converted into an outcome;
	/// this function does not return errors.
	#[instrument(skip(self, access_token), fields(principal_id = %principal_id))]
	pub async fn force_ready(
		&self,
		principal_id: &str,
		access_token: &str,
		options: ForceReadyOptions,
	) -> ProvisioningOutcome {
		let started = Instant::now();
		let max_attempts = options.max_attempts.max(1);

		for attempt in 1..=max_attempts {
			match self.probe.probe(principal_id, access_token).await {
				Ok(ProbeStatus::Ready { resource_url }) => {
					debug!(attempt, "backing resource ready");
					return ProvisioningOutcome::Ready {
						resource_url,
						elapsed_secs: started.elapsed().as_secs(),
						attempts: attempt,
					};
				}
				Ok(ProbeStatus::NotProvisioned) => {
					// Fast feedback for the common brand-new-principal
					// case; only the first attempt short-circuits.
					if attempt == 1 {
						debug!("backing resource not yet available for new principal");
						return ProvisioningOutcome::NotYetAvailable {
							elapsed_secs: started.elapsed().as_secs(),
							new_principal_likely: true,
						};
					}
					debug!(attempt, "backing resource still not provisioned");
				}
				Err(e) => {
					warn!(attempt, error = %e, "backing resource probe failed");
					if attempt == max_attempts {
						return ProvisioningOutcome::Failed {
							elapsed_secs: started.elapsed().as_secs(),
							cause: e.to_string(),
						};
					}
				}
			}

			if attempt == max_attempts {
				break;
			}

			if started.elapsed().as_secs() > options.max_wait_secs {
				debug!(attempt, "wall-clock budget exhausted before backoff");
				break;
			}

			let delay = backoff_delay(attempt);
			tokio::select! {
				_ = options.cancel.cancelled() => {
					debug!(attempt, "forced-provisioning wait cancelled");
					return ProvisioningOutcome::TimedOut {
						elapsed_secs: started.elapsed().as_secs(),
					};
				}
				_ = sleep(delay) => {}
			}
		}

		ProvisioningOutcome::TimedOut {
			elapsed_secs: started.elapsed().as_secs(),
		}
	}
}


#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		/// Backoff is always between 10 and 30 seconds for positive
		/// attempt numbers.
		#[test]
		fn backoff_within_bounds(attempt in 1u32..10_000) {
			let delay = backoff_delay(attempt).as_secs();
			prop_assert!((10..=30).contains(&delay));
		}

		/// Backoff is exactly attempt * 10 until the cap.
		#[test]
		fn backoff_linear_below_cap(attempt in 1u32..=3) {
			prop_assert_eq!(backoff_delay(attempt).as_secs(), u64::from(attempt) * 10);
		}
	}
}
