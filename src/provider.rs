use std::collections::BTreeMap;
use std::future::Future;

use url::Url;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::types::{ClaimSet, Profile};

/// Identity provider client library (token exchange, caching, claim decoding).
///
/// The session controller only orchestrates these calls; it never looks
/// inside the client's token cache.
///
/// # Example
///
/// ```rust,ignore
/// impl IdentityProvider for Auth0Bridge {
///     async fn is_authenticated(&self) -> Result<bool, ProviderError> {
///         self.js.is_authenticated().await.map_err(Into::into)
///     }
///     // ...
/// }
/// ```
pub trait IdentityProvider: Send + Sync + 'static {
    /// Whether the client's cache holds a valid session.
    fn is_authenticated(&self) -> impl Future<Output = Result<bool, ProviderError>> + Send;

    /// Profile of the signed-in user, if any.
    fn get_user(&self) -> impl Future<Output = Result<Option<Profile>, ProviderError>> + Send;

    /// Decoded claims of the cached identity token, if any.
    fn get_id_token_claims(
        &self,
    ) -> impl Future<Output = Result<Option<ClaimSet>, ProviderError>> + Send;

    /// Send the browser to the provider's authorization endpoint.
    ///
    /// Completion is observed by the next `initialize` after the browser returns.
    fn login_with_redirect(
        &self,
        options: LoginOptions,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Exchange the authorization response in the current URL for tokens.
    fn handle_redirect_callback(&self) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Clear the provider session and redirect to `options.return_to`.
    fn logout(&self, options: LogoutOptions)
    -> impl Future<Output = Result<(), ProviderError>> + Send;
}

/// Builds the provider client from configuration.
pub trait ClientFactory: Send + Sync + 'static {
    type Client: IdentityProvider;

    fn create(
        &self,
        config: &ProviderConfig,
    ) -> impl Future<Output = Result<Self::Client, ProviderError>> + Send;
}

/// The browser window the application runs in.
///
/// Not having one (pre-render, server, tests) means there is no URL or
/// storage to work with.
pub trait BrowserWindow: Send + Sync + 'static {
    /// Current `window.location`.
    fn location(&self) -> Url;

    /// Replace the current history entry without navigating.
    fn replace_location(&self, url: &Url);
}

/// Parameters for [`IdentityProvider::login_with_redirect`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct LoginOptions {
    /// Upstream identity broker, e.g. `google-oauth2`.
    pub connection: String,
    pub access_type: Option<String>,
    pub prompt: Option<String>,
    /// Additional authorization parameters passed through verbatim.
    pub extra_params: BTreeMap<String, String>,
}

impl LoginOptions {
    /// Login through `connection` with no offline or consent parameters.
    #[must_use]
    pub fn new(connection: impl Into<String>) -> Self {
        Self {
            connection: connection.into(),
            access_type: None,
            prompt: None,
            extra_params: BTreeMap::new(),
        }
    }

    /// Configured connection with `access_type=offline` and `prompt=consent`,
    /// which makes the upstream issue a refresh token.
    #[must_use]
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(config.connection())
            .with_access_type("offline")
            .with_prompt("consent")
    }

    #[must_use]
    pub fn with_access_type(mut self, access_type: impl Into<String>) -> Self {
        self.access_type = Some(access_type.into());
        self
    }

    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_params.insert(key.into(), value.into());
        self
    }

    /// All authorization parameters as key/value pairs.
    #[must_use]
    pub fn authorization_params(&self) -> Vec<(&str, &str)> {
        let mut params = vec![("connection", self.connection.as_str())];
        if let Some(access_type) = &self.access_type {
            params.push(("access_type", access_type.as_str()));
        }
        if let Some(prompt) = &self.prompt {
            params.push(("prompt", prompt.as_str()));
        }
        params.extend(
            self.extra_params
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );
        params
    }
}

/// Parameters for [`IdentityProvider::logout`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct LogoutOptions {
    /// Where the provider sends the browser afterwards (the app origin).
    pub return_to: String,
}

impl LogoutOptions {
    #[must_use]
    pub fn new(return_to: impl Into<String>) -> Self {
        Self {
            return_to: return_to.into(),
        }
    }
}
