use url::Url;

use crate::error::Error;
use crate::types::ClaimNamespace;

/// Upstream connection used when none is configured.
pub const DEFAULT_CONNECTION: &str = "google-oauth2";

/// Scopes always requested; without `openid` no identity token (and no
/// delegated-token claims) is issued.
pub const REQUIRED_SCOPES: [&str; 3] = ["openid", "profile", "email"];

/// Where the provider client keeps its token cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheLocation {
    /// Lost on reload; every visit re-authenticates.
    Memory,
    /// Survives a full page reload, so a returning user skips the redirect.
    #[default]
    LocalStorage,
}

impl std::str::FromStr for CacheLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "localstorage" | "local_storage" => Ok(Self::LocalStorage),
            other => Err(Error::Config(format!("unknown cache location: {other}"))),
        }
    }
}

/// Identity provider client configuration.
///
/// Required fields are constructor parameters; everything else has a default
/// and can be overridden with the `with_*` methods.
///
/// ```rust,ignore
/// use syllabusy_session::ProviderConfig;
///
/// let config = ProviderConfig::new(
///     "dev-tenant.us.auth0.com",
///     "my-client-id",
///     "https://syllabusy.app".parse()?,
/// )
/// .with_cache_location(CacheLocation::Memory);
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ProviderConfig {
    pub(crate) domain: String,
    pub(crate) client_id: String,
    pub(crate) redirect_uri: Url,
    pub(crate) scopes: Vec<String>,
    pub(crate) cache_location: CacheLocation,
    pub(crate) connection: String,
    pub(crate) claim_namespace: ClaimNamespace,
}

impl ProviderConfig {
    /// `redirect_uri` should be the application's own origin.
    #[must_use]
    pub fn new(domain: impl Into<String>, client_id: impl Into<String>, redirect_uri: Url) -> Self {
        Self {
            domain: domain.into(),
            client_id: client_id.into(),
            redirect_uri,
            scopes: REQUIRED_SCOPES.iter().map(|s| (*s).to_string()).collect(),
            cache_location: CacheLocation::default(),
            connection: DEFAULT_CONNECTION.into(),
            claim_namespace: ClaimNamespace::default(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `AUTH_DOMAIN`: identity provider domain
    /// - `AUTH_CLIENT_ID`: OAuth2 client ID
    /// - `AUTH_REDIRECT_URI`: application origin (must be a valid URL)
    ///
    /// # Optional env vars
    /// - `AUTH_SCOPES`: Comma-separated scopes added to `openid profile email`
    /// - `AUTH_CACHE_LOCATION`: `memory` or `localstorage`
    /// - `AUTH_CONNECTION`: upstream connection name
    ///
    /// The claim namespace is deliberately not read from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if required env vars are missing or values are invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("{key} is required")))
        };

        let domain = required("AUTH_DOMAIN")?;
        let client_id = required("AUTH_CLIENT_ID")?;
        let redirect_uri: Url = required("AUTH_REDIRECT_URI")?
            .parse()
            .map_err(|e| Error::Config(format!("AUTH_REDIRECT_URI: {e}")))?;

        let mut config = Self::new(domain, client_id, redirect_uri);

        if let Some(scopes) = lookup("AUTH_SCOPES") {
            config = config.with_scopes(
                scopes
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            );
        }
        if let Some(location) = lookup("AUTH_CACHE_LOCATION") {
            config = config.with_cache_location(location.parse()?);
        }
        if let Some(connection) = lookup("AUTH_CONNECTION") {
            config = config.with_connection(connection);
        }

        Ok(config)
    }

    /// Request `scopes` in addition to [`REQUIRED_SCOPES`].
    ///
    /// Blank entries and duplicates are dropped; the required scopes come first.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        let mut merged: Vec<String> = REQUIRED_SCOPES.iter().map(|s| (*s).to_string()).collect();
        for scope in scopes {
            let scope = scope.trim();
            if !scope.is_empty() && !merged.iter().any(|s| s == scope) {
                merged.push(scope.to_string());
            }
        }
        self.scopes = merged;
        self
    }

    #[must_use]
    pub fn with_cache_location(mut self, location: CacheLocation) -> Self {
        self.cache_location = location;
        self
    }

    /// Override the upstream connection requested at login.
    #[must_use]
    pub fn with_connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = connection.into();
        self
    }

    /// Must match the namespace used by the server-side claim rule.
    #[must_use]
    pub fn with_claim_namespace(mut self, namespace: ClaimNamespace) -> Self {
        self.claim_namespace = namespace;
        self
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Scopes joined for the `scope` authorization parameter.
    #[must_use]
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }

    #[must_use]
    pub fn cache_location(&self) -> CacheLocation {
        self.cache_location
    }

    #[must_use]
    pub fn connection(&self) -> &str {
        &self.connection
    }

    #[must_use]
    pub fn claim_namespace(&self) -> &ClaimNamespace {
        &self.claim_namespace
    }

    /// Application origin (`scheme://host[:port]`), the logout return target.
    #[must_use]
    pub fn app_origin(&self) -> String {
        self.redirect_uri.origin().ascii_serialization()
    }
}
