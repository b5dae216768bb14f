//! # Authentication
//!
//! Static bearer tokens from the configuration map to usernames. Roles a user
//! acquires at runtime (registering as a consumer, for instance) live in
//! [`RoleGrants`] and are merged into the principal on every request.

use crate::config::AuthConfig;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use crud_framework::Principal;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Roles granted to users after start-up.
#[derive(Debug, Clone, Default)]
pub struct RoleGrants {
    grants: Arc<RwLock<HashMap<String, BTreeSet<String>>>>,
}

impl RoleGrants {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, username: &str, role: &str) {
        debug!(username, role, "Role granted");
        self.grants
            .write()
            .entry(username.to_owned())
            .or_default()
            .insert(role.to_owned());
    }

    pub fn roles_of(&self, username: &str) -> BTreeSet<String> {
        self.grants.read().get(username).cloned().unwrap_or_default()
    }
}

struct Identity {
    username: String,
    roles: Vec<String>,
}

/// Resolves `Authorization: Bearer <token>` headers to principals.
#[derive(Clone)]
pub struct TokenAuthenticator {
    identities: Arc<HashMap<String, Identity>>,
    grants: RoleGrants,
}

impl TokenAuthenticator {
    pub fn from_config(config: &AuthConfig, grants: RoleGrants) -> Self {
        let identities = config
            .tokens
            .iter()
            .map(|t| {
                let identity = Identity {
                    username: t.username.clone(),
                    roles: t.roles.clone(),
                };
                (t.token.clone(), identity)
            })
            .collect();
        Self {
            identities: Arc::new(identities),
            grants,
        }
    }

    /// Missing, malformed and unknown tokens all yield the anonymous principal.
    pub fn authenticate(&self, headers: &HeaderMap) -> Principal {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);
        let Some(identity) = token.and_then(|t| self.identities.get(t)) else {
            return Principal::anonymous();
        };

        let granted = self.grants.roles_of(&identity.username);
        Principal::authenticated(
            identity.username.clone(),
            identity.roles.iter().cloned().chain(granted),
        )
    }
}

/// Middleware storing the caller's [`Principal`] in the request extensions.
pub async fn attach_principal(
    State(authenticator): State<TokenAuthenticator>,
    mut request: Request,
    next: Next,
) -> Response {
    let principal = authenticator.authenticate(request.headers());
    request.extensions_mut().insert(principal);
    next.run(request).await
}
