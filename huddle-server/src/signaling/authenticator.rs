use async_trait::async_trait;
use std::collections::HashSet;

/// Verifies the opaque token a client presents before it may join rooms.
///
/// Implemented by whatever owns user accounts; the relay only needs a yes/no.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn verify(&self, token: &str) -> bool;
}

/// Accepts any token from a fixed set.
#[derive(Debug, Clone, Default)]
pub struct StaticTokens {
    tokens: HashSet<String>,
}

impl StaticTokens {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl Authenticator for StaticTokens {
    async fn verify(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }
}
