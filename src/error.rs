/// Boxed error returned by consumer-provided collaborators
/// ([`IdentityProvider`](crate::IdentityProvider), [`ClientFactory`](crate::ClientFactory)).
pub type ProviderError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Client construction, redirect processing, or the post-redirect
    /// session load failed during [`initialize`](crate::SessionController::initialize).
    #[error("identity provider initialization failed during {stage}: {source}")]
    ProviderInit {
        stage: &'static str,
        #[source]
        source: ProviderError,
    },

    /// `login`/`logout` was called before a provider client exists.
    #[error("identity provider client is not initialized")]
    NotInitialized,

    /// The provider failed a login or logout request.
    #[error("identity provider {operation} failed: {source}")]
    Provider {
        operation: &'static str,
        #[source]
        source: ProviderError,
    },

    /// The provider redirected back with an OAuth error response.
    #[error("authorization redirect returned {error}: {description}")]
    RedirectError { error: String, description: String },

    /// Decoded identity token claims were not a JSON object.
    #[error("invalid claim set: {0}")]
    InvalidClaims(String),

    #[error("configuration error: {0}")]
    Config(String),
}
