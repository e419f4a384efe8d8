//! Access token seam used by every resource call

use async_trait::async_trait;
use datastack_domain::Result;

/// Trait for providing access tokens
///
/// Resource clients never cache a token; they ask the provider on every call
/// so token rotation is visible to the next request. This trait allows
/// dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Current access token.
    ///
    /// # Errors
    /// Returns `DataStackError::Auth` when no token is held.
    async fn access_token(&self) -> Result<String>;
}

/// Provider holding a fixed token
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        if self.token.is_empty() {
            return Err(datastack_domain::DataStackError::auth("no access token available"));
        }
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use datastack_domain::DataStackError;

    use super::*;

    #[tokio::test]
    async fn static_provider_fails_fast_when_empty() {
        let provider = StaticTokenProvider::new("");
        assert!(matches!(provider.access_token().await, Err(DataStackError::Auth { .. })));

        let provider = StaticTokenProvider::new("abc");
        assert_eq!(provider.access_token().await.unwrap(), "abc");
    }
}
