// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! OAuth 2.0 authorization-code flow and identity enrichment for
//! Greenroom.
//!
//! This crate implements the sign-in half of the tenant onboarding
//! coordinator:
//!
//! 1. **Authorization URL generation**: a fresh PKCE pair and an opaque
//!    `state` value per attempt. The caller's forced-provisioning
//!    preference is embedded inside `state` so it survives the redirect
//!    round-trip through an external browser.
//!
//! 2. **Code exchange**: the authorization code plus PKCE verifier are
//!    exchanged at the provider's token endpoint for a [`TokenSet`].
//!
//! 3. **Identity enrichment**: the access token resolves the
//!    authenticated principal, its tenant (with default domain and
//!    license inventory).
//!
//! 4. **Forced provisioning** (optional): the delayed backing resource
//!    is eagerly polled; its outcome is informational and never fails
//!    the sign-in.
//!
//! The [`orchestrator::AuthOrchestrator`] composes the stages into the
//! callback pipeline and emits one `sign_in` audit event per attempt.
//!
//! # Security Considerations
//!
//! - The client secret and issued tokens are wrapped in
//!   [`SecretString`](greenroom_common_secret::SecretString).
//! - PKCE uses the S256 transform.
//! - Tracing instrumentation skips sensitive parameters.

pub mod config;
pub mod error;
pub mod identity;
pub mod orchestrator;
pub mod pkce;
pub mod state;
pub mod token;
pub mod types;

pub use config::{ConfigError, ProviderConfig};
pub use error::AuthError;
pub use identity::{HttpIdentityResolver, IdentityResolver};
pub use orchestrator::{
	AuthOrchestrator, AuthorizationRequest, AuthorizeOptions, CallbackOptions, SignIn,
};
pub use state::AuthState;
pub use token::{HttpTokenExchanger, TokenExchanger};
pub use types::{AuthenticatedPrincipal, LicenseInfo, TenantContext, TokenSet};
