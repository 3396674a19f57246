//! Identity provider port implementation (spec §6 "Identity provider
//! contract (consumed)"). Calls out to an external auth service over HTTP
//! to verify the bearer token and, on first sight of an identity, to
//! hydrate its profile — mirrors the `local_client.rs` pattern of wrapping
//! a downstream HTTP call with `log_and_convert`-style boundary logging
//! that `kanban_tenant::TenantContextResolver` already uses internally.

use async_trait::async_trait;
use kanban_domain::DomainError;
use kanban_tenant::{IdentityClaims, IdentityProvider};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AuthResponse {
    external_user_id: Option<String>,
    #[serde(default)]
    external_org_role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserProfile {
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    username: Option<String>,
}

pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIdentityProvider {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[tracing::instrument(skip(self, bearer_token))]
    async fn authenticate(&self, bearer_token: &str) -> Result<IdentityClaims, DomainError> {
        let auth: AuthResponse = self
            .client
            .get(format!("{}/auth", self.base_url))
            .bearer_auth(bearer_token)
            .send()
            .await
            .map_err(|e| log_and_convert("auth", &e))?
            .error_for_status()
            .map_err(|e| log_and_convert("auth", &e))?
            .json()
            .await
            .map_err(|e| log_and_convert("auth.decode", &e))?;

        let Some(external_user_id) = auth.external_user_id else {
            return Err(DomainError::Unauthenticated);
        };

        let profile: UserProfile = self
            .client
            .get(format!("{}/users/{external_user_id}", self.base_url))
            .bearer_auth(bearer_token)
            .send()
            .await
            .map_err(|e| log_and_convert("users.getUser", &e))?
            .error_for_status()
            .map_err(|e| log_and_convert("users.getUser", &e))?
            .json()
            .await
            .map_err(|e| log_and_convert("users.getUser.decode", &e))?;

        let display_name = match (profile.username, profile.first_name, profile.last_name) {
            (Some(username), _, _) => username,
            (None, Some(first), Some(last)) => format!("{first} {last}"),
            (None, Some(first), None) => first,
            (None, None, _) => profile.email.clone(),
        };

        Ok(IdentityClaims {
            external_identity_id: external_user_id,
            email: profile.email,
            display_name,
            raw_role_claim: auth.external_org_role,
        })
    }
}

fn log_and_convert(op: &str, err: &reqwest::Error) -> DomainError {
    tracing::error!(operation = op, error = %err, "identity provider call failed");
    DomainError::Unauthenticated
}
