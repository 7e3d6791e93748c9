use serde::Serialize;

use crate::types::{Profile, TokenPair};

/// Snapshot of who is signed in and which delegated tokens we hold.
///
/// The only constructors are [`Session::signed_out`] and [`Session::signed_in`],
/// so a signed-out session can never carry a profile or tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    authenticated: bool,
    profile: Option<Profile>,
    #[serde(skip)]
    delegated_tokens: Option<TokenPair>,
}

impl Session {
    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Profile and tokens become visible together.
    #[must_use]
    pub fn signed_in(profile: Profile, delegated_tokens: TokenPair) -> Self {
        Self {
            authenticated: true,
            profile: Some(profile),
            delegated_tokens: Some(delegated_tokens),
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    #[must_use]
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    #[must_use]
    pub fn delegated_tokens(&self) -> Option<&TokenPair> {
        self.delegated_tokens.as_ref()
    }

    /// Provider subject id of the signed-in user.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.profile.as_ref().map(|p| p.sub.as_str())
    }
}

/// Where the controller is in the sign-in lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// `initialize` has not completed yet.
    #[default]
    Unknown,
    /// An authorization response is being processed, or the browser was sent
    /// to the provider. Resumes in the next `initialize`.
    RedirectPending,
    Authenticated,
    Unauthenticated,
}
