//! Bearer-token sources for backend calls.
//!
//! Token acquisition and refresh live outside this crate; the transport
//! only asks for the current token per request.

/// Supplies the bearer token attached to every chunk and finalize call.
pub trait TokenProvider: Send + Sync {
    /// Returns the current token, or `None` for unauthenticated calls.
    fn bearer_token(&self) -> Option<String>;
}

/// A fixed token, for service accounts and tests.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// No authentication.
pub struct NoAuth;

impl TokenProvider for NoAuth {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}
