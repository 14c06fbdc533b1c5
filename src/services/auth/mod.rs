pub mod service_account;

use async_trait::async_trait;

pub use service_account::ServiceAccountTokenProvider;

/// Supplies bearer tokens for the Graph API.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> anyhow::Result<String>;
}

/// A token handed in from outside, e.g. one delegated by the signed-in user.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> anyhow::Result<String> {
        anyhow::ensure!(!self.token.is_empty(), "access token is required");
        Ok(self.token.clone())
    }
}
