use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claim namespace shared with the server-side claim-injection rule.
///
/// Changing this without changing the rule silently yields no delegated tokens.
pub const DEFAULT_CLAIM_NAMESPACE: &str = "https://syllabusy.app";

/// Claim suffix carrying the delegated access token.
pub const ACCESS_TOKEN_CLAIM: &str = "google_access_token";

/// Claim suffix carrying the delegated refresh token.
pub const REFRESH_TOKEN_CLAIM: &str = "google_refresh_token";

/// URI-style prefix of the custom claims in the identity token.
///
/// Compared verbatim: `https://syllabusy.app` and `https://syllabusy.app/`
/// are different namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct ClaimNamespace(pub String);

impl ClaimNamespace {
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self(namespace.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full claim key for `suffix`, e.g. `https://syllabusy.app/google_access_token`.
    #[must_use]
    pub fn claim_key(&self, suffix: &str) -> String {
        format!("{}/{suffix}", self.0)
    }
}

impl Default for ClaimNamespace {
    fn default() -> Self {
        Self::new(DEFAULT_CLAIM_NAMESPACE)
    }
}

/// Decoded identity token claims.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, From, Into)]
#[serde(transparent)]
pub struct ClaimSet(pub Map<String, Value>);

impl ClaimSet {
    /// Gets a claim value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Gets a claim only if it is a JSON string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Value> for ClaimSet {
    type Error = crate::error::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(crate::error::Error::InvalidClaims(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }
}

/// Delegated access/refresh tokens for the downstream API.
///
/// Both fields may be absent; the provider omits the refresh token unless
/// offline access was granted.
#[derive(Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct TokenPair {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl TokenPair {
    #[must_use]
    pub fn new(access_token: Option<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token,
            refresh_token,
        }
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Neither token is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

// Token values stay out of debug output.
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// User profile as returned by the identity provider.
///
/// Fields the provider sends beyond the standard ones are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Profile {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<time::OffsetDateTime>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    /// Create a new `Profile` with only the required `sub` field.
    #[must_use]
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            name: None,
            nickname: None,
            email: None,
            email_verified: None,
            picture: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_email_verified(mut self, verified: bool) -> Self {
        self.email_verified = Some(verified);
        self
    }
}
