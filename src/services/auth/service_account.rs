use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::TokenProvider;
use crate::config::AppConfig;

const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";
/// Tokens are refreshed this long before the identity platform expires them.
const EXPIRY_MARGIN: Duration = Duration::from_secs(300);

/// Signs in as the service account with the resource-owner password grant and
/// caches the token until shortly before it expires.
///
/// Concurrent callers may both refresh an expired token; the last write wins.
pub struct ServiceAccountTokenProvider {
    token_url: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
    username: String,
    password: String,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    token: String,
    refresh_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

impl ServiceAccountTokenProvider {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.provider_timeout_secs))
            .build()
            .context("failed to build token HTTP client")?;

        Ok(Self {
            token_url: format!(
                "{}/{}/oauth2/v2.0/token",
                config.login_base_url.trim_end_matches('/'),
                config.azure_tenant_id
            ),
            tenant_id: config.azure_tenant_id.clone(),
            client_id: config.azure_client_id.clone(),
            client_secret: config.azure_client_secret.clone(),
            username: config.service_account_email.clone(),
            password: config.service_account_password.clone(),
            client,
            cached: Mutex::new(None),
        })
    }

    fn is_configured(&self) -> bool {
        !self.tenant_id.is_empty()
            && !self.client_id.is_empty()
            && !self.client_secret.is_empty()
            && !self.username.is_empty()
    }

    fn cached_token(&self) -> Option<String> {
        let cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        cached
            .as_ref()
            .filter(|c| Instant::now() < c.refresh_at)
            .map(|c| c.token.clone())
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> anyhow::Result<String> {
        if let Some(token) = self.cached_token() {
            tracing::debug!("using cached service account token");
            return Ok(token);
        }

        anyhow::ensure!(
            self.is_configured(),
            "Azure AD service account credentials are not configured"
        );

        tracing::info!(account = %self.username, "acquiring service account token");

        let resp = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "password"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", GRAPH_SCOPE),
                ("username", self.username.as_str()),
                ("password", self.password.as_str()),
            ])
            .send()
            .await
            .context("failed to request service account token")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!(%status, "service account token acquisition failed");
            anyhow::bail!("token endpoint returned {status}: {body}");
        }

        let body: TokenResponse = resp
            .json()
            .await
            .context("token response missing access_token or expires_in")?;

        let lifetime = Duration::from_secs(body.expires_in).saturating_sub(EXPIRY_MARGIN);
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = Some(CachedToken {
            token: body.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });

        tracing::info!(expires_in = body.expires_in, "service account token acquired");
        Ok(body.access_token)
    }
}
