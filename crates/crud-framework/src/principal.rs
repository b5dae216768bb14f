//! # Principal
//!
//! The caller behind a request. Authentication itself happens outside the
//! framework: some middleware resolves the caller and stores a [`Principal`] in the
//! request extensions. Handlers that find none treat the caller as anonymous.

use crate::role::{Anonymous, Authenticated, Role};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::Serialize;
use std::collections::BTreeSet;
use std::convert::Infallible;

/// The authenticated (or anonymous) subject of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    username: Option<String>,
    roles: BTreeSet<String>,
}

impl Principal {
    /// A caller without credentials. Carries only the `Anonymous` role.
    pub fn anonymous() -> Self {
        Self {
            username: None,
            roles: BTreeSet::from([Anonymous::NAME.to_owned()]),
        }
    }

    /// A caller with a username. The `Authenticated` role is always added and
    /// `Anonymous` is never kept.
    pub fn authenticated<I, S>(username: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut roles: BTreeSet<String> = roles.into_iter().map(Into::into).collect();
        roles.remove(Anonymous::NAME);
        roles.insert(Authenticated::NAME.to_owned());
        Self {
            username: Some(username.into()),
            roles,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.username.is_none()
    }

    pub fn has_role<R: Role>(&self) -> bool {
        self.roles.contains(R::NAME)
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }
}

impl Default for Principal {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Principal>()
            .cloned()
            .unwrap_or_default())
    }
}
