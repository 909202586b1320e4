// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The end-to-end callback pipeline.
//!
//! [`AuthOrchestrator`] owns authorization-request construction and the
//! ordered callback stages: state decoding, token exchange, identity
//! enrichment, optional forced provisioning, and the audit record. Each
//! stage that can fail returns a typed error; only genuinely unexpected
//! faults surface as `CALLBACK_ERROR`.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, instrument, warn};
use url::Url;

use greenroom_audit::{AuditEvent, AuditEventKind, AuditLog};
use greenroom_provisioning::{
	BackingResourceProbe, ForceReadyOptions, HttpBackingResourceProbe, ProvisioningOutcome,
	ProvisioningRetrier,
};

use crate::config::ProviderConfig;
use crate::error::AuthError;
use crate::identity::{HttpIdentityResolver, IdentityResolver};
use crate::pkce::Pkce;
use crate::state::AuthState;
use crate::token::{HttpTokenExchanger, TokenExchanger};
use crate::types::{AuthenticatedPrincipal, TokenSet};

/// Options for [`AuthOrchestrator::build_authorization_request`].
#[derive(Debug, Clone, Default)]
pub struct AuthorizeOptions {
	/// Forced-provisioning preference to embed in the state value.
	pub force_backing_resource: Option<bool>,
	/// Scopes to request beyond the fixed required set.
	pub extra_scopes: Vec<String>,
}

/// A prepared authorization request.
///
/// The caller stores `state` and `code_verifier` for the attempt and
/// redirects the administrator to `authorization_url`.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
	pub authorization_url: String,
	pub state: String,
	pub code_verifier: String,
}

/// Options for [`AuthOrchestrator::handle_callback`].
#[derive(Debug, Clone)]
pub struct CallbackOptions {
	/// Caller override for the forced-provisioning preference. Takes
	/// precedence over the preference recovered from `state`.
	pub force_backing_resource: Option<bool>,
	/// Skip forced provisioning even when the resolved preference is
	/// true.
	pub skip_provisioning: bool,
	/// Budget for the forced-provisioning run, when one happens.
	pub provisioning: ForceReadyOptions,
}

impl Default for CallbackOptions {
	fn default() -> Self {
		Self {
			force_backing_resource: None,
			skip_provisioning: false,
			provisioning: ForceReadyOptions::default(),
		}
	}
}

/// A successful sign-in.
#[derive(Debug)]
pub struct SignIn {
	pub principal: AuthenticatedPrincipal,
	pub tokens: TokenSet,
	/// Outcome of the forced-provisioning run, when one happened.
	/// Best-effort: never the reason a sign-in fails.
	pub provisioning: Option<ProvisioningOutcome>,
}

/// Composes token exchange, identity enrichment, forced provisioning
/// and the audit trail into the sign-in state machine.
pub struct AuthOrchestrator {
	config: ProviderConfig,
	tokens: Arc<dyn TokenExchanger>,
	identity: Arc<dyn IdentityResolver>,
	retrier: ProvisioningRetrier,
	audit: AuditLog,
	/// Process-wide default when neither the caller nor the state value
	/// expresses a forced-provisioning preference.
	default_force_provision: bool,
}

impl AuthOrchestrator {
	/// Orchestrator wired to the real provider endpoints.
	pub fn new(config: ProviderConfig, audit: AuditLog) -> Self {
		let probe: Arc<dyn BackingResourceProbe> =
			Arc::new(HttpBackingResourceProbe::new(config.api_base.clone()));
		Self {
			tokens: Arc::new(HttpTokenExchanger::new(config.clone())),
			identity: Arc::new(HttpIdentityResolver::new(config.clone())),
			retrier: ProvisioningRetrier::new(probe),
			audit,
			default_force_provision: false,
			config,
		}
	}

	/// Orchestrator with injected stage implementations.
	pub fn with_parts(
		config: ProviderConfig,
		tokens: Arc<dyn TokenExchanger>,
		identity: Arc<dyn IdentityResolver>,
		probe: Arc<dyn BackingResourceProbe>,
		audit: AuditLog,
		default_force_provision: bool,
	) -> Self {
		Self {
			config,
			tokens,
			identity,
			retrier: ProvisioningRetrier::new(probe),
			audit,
			default_force_provision,
		}
	}

	/// Build a provider authorization URL with a fresh state value and
	/// PKCE pair.
	///
	/// No side effects beyond randomness; this never touches the
	/// network. The forced-provisioning preference rides inside the
	/// state value so it survives the browser round-trip.
	pub fn build_authorization_request(&self, options: &AuthorizeOptions) -> AuthorizationRequest {
		let state = AuthState::new(options.force_backing_resource);
		let encoded_state = state.encode();
		let pkce = Pkce::generate();
		let scopes = self.config.scopes_with(&options.extra_scopes);

		let mut url =
			Url::parse(&self.config.authorize_endpoint()).expect("invalid authorize endpoint");
		{
			let mut params = url.query_pairs_mut();
			params.append_pair("client_id", &self.config.client_id);
			params.append_pair("response_type", "code");
			params.append_pair("redirect_uri", &self.config.redirect_uri);
			params.append_pair("scope", &scopes.join(" "));
			params.append_pair("state", &encoded_state);
			params.append_pair("code_challenge", &pkce.challenge);
			params.append_pair("code_challenge_method", "S256");
			params.append_pair("prompt", "consent");
		}

		AuthorizationRequest {
			authorization_url: url.to_string(),
			state: encoded_state,
			code_verifier: pkce.verifier,
		}
	}

	/// Handle the provider's redirect back with an authorization code.
	///
	/// Pipeline order: recover the forced-provisioning preference from
	/// `state`, exchange the code, enrich the principal, optionally
	/// force provisioning (best-effort), record the audit event, return
	/// the sign-in. Stage failures abort with that stage's error as-is.
	#[instrument(skip_all, name = "AuthOrchestrator::handle_callback")]
	pub async fn handle_callback(
		&self,
		code: &str,
		state: &str,
		code_verifier: &str,
		options: CallbackOptions,
	) -> Result<SignIn, AuthError> {
		match self.run_callback(code, state, code_verifier, options).await {
			Ok(sign_in) => Ok(sign_in),
			Err(e) => {
				warn!(code = %e.code(), error = %e, "sign-in failed");
				self.audit
					.record(
						AuditEvent::builder(AuditEventKind::SignInFailed)
							.succeeded(false)
							.metadata(json!({
								"code": e.code(),
								"message": e.to_string(),
							}))
							.build(),
					)
					.await;
				Err(e)
			}
		}
	}

	async fn run_callback(
		&self,
		code: &str,
		state: &str,
		code_verifier: &str,
		options: CallbackOptions,
	) -> Result<SignIn, AuthError> {
		// Caller override beats the preference recovered from state,
		// which beats the process-wide default.
		let recovered = AuthState::decode(state).and_then(|s| s.force_provision);
		let force_provision = options
			.force_backing_resource
			.or(recovered)
			.unwrap_or(self.default_force_provision);
		debug!(force_provision, "resolved provisioning preference");

		let tokens = self.tokens.exchange(code, code_verifier).await?;
		let principal = self.identity.resolve(tokens.access_token.expose()).await?;

		let provisioning = if force_provision && !options.skip_provisioning {
			Some(
				self.retrier
					.force_ready(
						&principal.id,
						tokens.access_token.expose(),
						options.provisioning,
					)
					.await,
			)
		} else {
			None
		};

		self.audit
			.record(
				AuditEvent::builder(AuditEventKind::SignIn)
					.principal_id(&principal.id)
					.tenant_id(&principal.tenant.tenant_id)
					.metadata(json!({
						"forced_provisioning": force_provision,
						"provisioning": &provisioning,
					}))
					.build(),
			)
			.await;

		Ok(SignIn {
			principal,
			tokens,
			provisioning,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use chrono::{Duration, Utc};
	use greenroom_audit::MemoryAuditSink;
	use greenroom_common_secret::SecretString;
	use greenroom_provisioning::{ProbeError, ProbeStatus};
	use std::collections::HashMap;
	use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
	use tokio_util::sync::CancellationToken;

	use crate::types::TenantContext;

	fn config() -> ProviderConfig {
		ProviderConfig {
			client_id: "client-1".to_string(),
			client_secret: SecretString::new("secret".to_string()),
			redirect_uri: "https://example.com/callback".to_string(),
			authority_tenant: "organizations".to_string(),
			authority_base: "https://login.example.com".to_string(),
			api_base: "https://graph.example.com/v1.0".to_string(),
		}
	}

	fn token_set() -> TokenSet {
		TokenSet {
			access_token: SecretString::new("at".to_string()),
			refresh_token: None,
			id_token: None,
			expires_at: Utc::now() + Duration::seconds(3600),
			scopes: vec![],
		}
	}

	fn principal() -> AuthenticatedPrincipal {
		AuthenticatedPrincipal {
			id: "user-1".to_string(),
			principal_name: "admin@contoso.example".to_string(),
			display_name: "Admin".to_string(),
			tenant: TenantContext {
				tenant_id: "tenant-1".to_string(),
				display_name: "Contoso".to_string(),
				default_domain: "contoso.example".to_string(),
				available_licenses: vec![],
			},
			roles: vec![],
		}
	}

	struct FakeExchanger {
		fail_with: Option<(String, String)>,
		called: AtomicBool,
	}

	impl FakeExchanger {
		fn ok() -> Self {
			Self {
				fail_with: None,
				called: AtomicBool::new(false),
			}
		}

		fn failing(code: &str, message: &str) -> Self {
			Self {
				fail_with: Some((code.to_string(), message.to_string())),
				called: AtomicBool::new(false),
			}
		}
	}

	#[async_trait]
	impl TokenExchanger for FakeExchanger {
		async fn exchange(&self, _: &str, _: &str) -> Result<TokenSet, AuthError> {
			self.called.store(true, Ordering::SeqCst);
			match &self.fail_with {
				Some((code, message)) => Err(AuthError::Provider {
					code: code.clone(),
					message: message.clone(),
				}),
				None => Ok(token_set()),
			}
		}
	}

	struct FakeResolver {
		fail: bool,
		called: AtomicBool,
	}

	impl FakeResolver {
		fn ok() -> Self {
			Self {
				fail: false,
				called: AtomicBool::new(false),
			}
		}

		fn failing() -> Self {
			Self {
				fail: true,
				called: AtomicBool::new(false),
			}
		}
	}

	#[async_trait]
	impl IdentityResolver for FakeResolver {
		async fn resolve(&self, _: &str) -> Result<AuthenticatedPrincipal, AuthError> {
			self.called.store(true, Ordering::SeqCst);
			if self.fail {
				Err(AuthError::Provider {
					code: "InvalidAuthenticationToken".to_string(),
					message: "expired".to_string(),
				})
			} else {
				Ok(principal())
			}
		}
	}

	struct CountingProbe {
		fail: bool,
		calls: AtomicU32,
	}

	impl CountingProbe {
		fn ready() -> Self {
			Self {
				fail: false,
				calls: AtomicU32::new(0),
			}
		}

		fn failing() -> Self {
			Self {
				fail: true,
				calls: AtomicU32::new(0),
			}
		}

		fn calls(&self) -> u32 {
			self.calls.load(Ordering::SeqCst)
		}
	}

	#[async_trait]
	impl BackingResourceProbe for CountingProbe {
		async fn probe(&self, _: &str, _: &str) -> Result<ProbeStatus, ProbeError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			if self.fail {
				Err(ProbeError::Transport("unreachable".to_string()))
			} else {
				Ok(ProbeStatus::Ready {
					resource_url: "https://example.com/drive".to_string(),
				})
			}
		}
	}

	struct Harness {
		orchestrator: AuthOrchestrator,
		probe: Arc<CountingProbe>,
		sink: Arc<MemoryAuditSink>,
	}

	fn harness(
		exchanger: FakeExchanger,
		resolver: FakeResolver,
		probe: CountingProbe,
	) -> Harness {
		let probe = Arc::new(probe);
		let sink = Arc::new(MemoryAuditSink::new());
		let orchestrator = AuthOrchestrator::with_parts(
			config(),
			Arc::new(exchanger),
			Arc::new(resolver),
			Arc::clone(&probe) as _,
			AuditLog::new(vec![Arc::clone(&sink) as _]),
			false,
		);
		Harness {
			orchestrator,
			probe,
			sink,
		}
	}

	fn quick_provisioning() -> ForceReadyOptions {
		ForceReadyOptions {
			max_wait_secs: 60,
			max_attempts: 1,
			cancel: CancellationToken::new(),
		}
	}

	mod authorization_request {
		use super::*;

		#[test]
		fn url_contains_required_params() {
			let h = harness(FakeExchanger::ok(), FakeResolver::ok(), CountingProbe::ready());
			let request = h
				.orchestrator
				.build_authorization_request(&AuthorizeOptions::default());

			let url = Url::parse(&request.authorization_url).unwrap();
			assert!(url
				.as_str()
				.starts_with("https://login.example.com/organizations/oauth2/v2.0/authorize"));

			let params: HashMap<_, _> = url.query_pairs().collect();
			assert_eq!(params.get("client_id").map(|s| s.as_ref()), Some("client-1"));
			assert_eq!(params.get("response_type").map(|s| s.as_ref()), Some("code"));
			assert_eq!(
				params.get("redirect_uri").map(|s| s.as_ref()),
				Some("https://example.com/callback")
			);
			assert_eq!(
				params.get("code_challenge_method").map(|s| s.as_ref()),
				Some("S256")
			);
			assert_eq!(params.get("prompt").map(|s| s.as_ref()), Some("consent"));
			assert!(params.contains_key("code_challenge"));
			assert!(params.contains_key("state"));
		}

		#[test]
		fn challenge_derives_from_returned_verifier() {
			let h = harness(FakeExchanger::ok(), FakeResolver::ok(), CountingProbe::ready());
			let request = h
				.orchestrator
				.build_authorization_request(&AuthorizeOptions::default());

			let url = Url::parse(&request.authorization_url).unwrap();
			let params: HashMap<_, _> = url.query_pairs().collect();
			let expected = Pkce::from_verifier(request.code_verifier.clone()).challenge;
			assert_eq!(
				params.get("code_challenge").map(|s| s.as_ref()),
				Some(expected.as_str())
			);
		}

		#[test]
		fn extra_scopes_are_appended() {
			let h = harness(FakeExchanger::ok(), FakeResolver::ok(), CountingProbe::ready());
			let request = h.orchestrator.build_authorization_request(&AuthorizeOptions {
				force_backing_resource: None,
				extra_scopes: vec!["Mail.Send".to_string()],
			});

			let url = Url::parse(&request.authorization_url).unwrap();
			let params: HashMap<_, _> = url.query_pairs().collect();
			let scope = params.get("scope").unwrap();
			assert!(scope.contains("openid"));
			assert!(scope.contains("Mail.Send"));
		}

		#[test]
		fn each_request_is_fresh() {
			let h = harness(FakeExchanger::ok(), FakeResolver::ok(), CountingProbe::ready());
			let a = h
				.orchestrator
				.build_authorization_request(&AuthorizeOptions::default());
			let b = h
				.orchestrator
				.build_authorization_request(&AuthorizeOptions::default());
			assert_ne!(a.state, b.state);
			assert_ne!(a.code_verifier, b.code_verifier);
		}
	}

	mod callback {
		use super::*;

		#[tokio::test]
		async fn preference_embedded_in_state_round_trips() {
			let h = harness(FakeExchanger::ok(), FakeResolver::ok(), CountingProbe::ready());
			let request = h.orchestrator.build_authorization_request(&AuthorizeOptions {
				force_backing_resource: Some(true),
				extra_scopes: vec![],
			});

			let sign_in = h
				.orchestrator
				.handle_callback(
					"code",
					&request.state,
					&request.code_verifier,
					CallbackOptions {
						provisioning: quick_provisioning(),
						..CallbackOptions::default()
					},
				)
				.await
				.unwrap();

			assert_eq!(h.probe.calls(), 1);
			assert!(sign_in.provisioning.unwrap().is_ready());
		}

		#[tokio::test]
		async fn caller_override_beats_state_preference() {
			let h = harness(FakeExchanger::ok(), FakeResolver::ok(), CountingProbe::ready());
			let state = AuthState::new(Some(true)).encode();

			h.orchestrator
				.handle_callback(
					"code",
					&state,
					"verifier",
					CallbackOptions {
						force_backing_resource: Some(false),
						provisioning: quick_provisioning(),
						..CallbackOptions::default()
					},
				)
				.await
				.unwrap();

			assert_eq!(h.probe.calls(), 0);
		}

		#[tokio::test]
		async fn default_preference_applies_when_state_is_foreign() {
			let h = harness(FakeExchanger::ok(), FakeResolver::ok(), CountingProbe::ready());

			let sign_in = h
				.orchestrator
				.handle_callback("code", "garbage-state", "verifier", CallbackOptions::default())
				.await
				.unwrap();

			assert_eq!(h.probe.calls(), 0);
			assert!(sign_in.provisioning.is_none());
		}

		#[tokio::test]
		async fn exchange_failure_aborts_before_enrichment() {
			let resolver = FakeResolver::ok();
			let h = harness(
				FakeExchanger::failing("invalid_grant", "code expired"),
				resolver,
				CountingProbe::ready(),
			);

			let err = h
				.orchestrator
				.handle_callback("code", "state", "verifier", CallbackOptions::default())
				.await
				.unwrap_err();

			assert_eq!(err.code(), "invalid_grant");
			assert_eq!(h.probe.calls(), 0);

			let events = h.sink.events().await;
			assert_eq!(events.len(), 1);
			assert_eq!(events[0].kind, AuditEventKind::SignInFailed);
			assert!(!events[0].succeeded);
		}

		#[tokio::test]
		async fn enrichment_failure_surfaces_provider_error() {
			let h = harness(
				FakeExchanger::ok(),
				FakeResolver::failing(),
				CountingProbe::ready(),
			);

			let err = h
				.orchestrator
				.handle_callback("code", "state", "verifier", CallbackOptions::default())
				.await
				.unwrap_err();

			assert_eq!(err.code(), "InvalidAuthenticationToken");
			assert_eq!(h.probe.calls(), 0);
		}

		#[tokio::test]
		async fn provisioning_failure_never_fails_sign_in() {
			let h = harness(
				FakeExchanger::ok(),
				FakeResolver::ok(),
				CountingProbe::failing(),
			);
			let state = AuthState::new(Some(true)).encode();

			let sign_in = h
				.orchestrator
				.handle_callback(
					"code",
					&state,
					"verifier",
					CallbackOptions {
						provisioning: quick_provisioning(),
						..CallbackOptions::default()
					},
				)
				.await
				.unwrap();

			match sign_in.provisioning {
				Some(ProvisioningOutcome::Failed { .. }) => {}
				other => panic!("expected Failed outcome, got {other:?}"),
			}

			// Sign-in still emits a successful audit event with the
			// outcome attached as metadata.
			let events = h.sink.events().await;
			assert_eq!(events.len(), 1);
			assert_eq!(events[0].kind, AuditEventKind::SignIn);
			assert!(events[0].succeeded);
			assert_eq!(events[0].metadata["provisioning"]["status"], "failed");
		}

		#[tokio::test]
		async fn skip_provisioning_overrides_true_preference() {
			let h = harness(FakeExchanger::ok(), FakeResolver::ok(), CountingProbe::ready());
			let state = AuthState::new(Some(true)).encode();

			let sign_in = h
				.orchestrator
				.handle_callback(
					"code",
					&state,
					"verifier",
					CallbackOptions {
						skip_provisioning: true,
						provisioning: quick_provisioning(),
						..CallbackOptions::default()
					},
				)
				.await
				.unwrap();

			assert_eq!(h.probe.calls(), 0);
			assert!(sign_in.provisioning.is_none());
		}

		#[tokio::test]
		async fn sign_in_event_carries_principal_and_tenant() {
			let h = harness(FakeExchanger::ok(), FakeResolver::ok(), CountingProbe::ready());

			h.orchestrator
				.handle_callback("code", "state", "verifier", CallbackOptions::default())
				.await
				.unwrap();

			let events = h.sink.events().await;
			assert_eq!(events.len(), 1);
			assert_eq!(events[0].principal_id.as_deref(), Some("user-1"));
			assert_eq!(events[0].tenant_id.as_deref(), Some("tenant-1"));
			assert_eq!(events[0].metadata["forced_provisioning"], false);
		}
	}
}
