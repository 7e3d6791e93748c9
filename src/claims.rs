use crate::types::{ACCESS_TOKEN_CLAIM, ClaimNamespace, ClaimSet, REFRESH_TOKEN_CLAIM, TokenPair};

/// Extracts the delegated token pair from decoded identity token claims.
///
/// Only `<namespace>/google_access_token` and `<namespace>/google_refresh_token`
/// are read. Missing keys, non-string values and a missing claim set all
/// produce absent fields rather than errors.
#[must_use]
pub fn extract_delegated_tokens(claims: Option<&ClaimSet>, namespace: &ClaimNamespace) -> TokenPair {
    let Some(claims) = claims else {
        return TokenPair::default();
    };

    let lookup = |suffix: &str| {
        claims
            .get_str(&namespace.claim_key(suffix))
            .map(str::to_owned)
    };

    TokenPair::new(lookup(ACCESS_TOKEN_CLAIM), lookup(REFRESH_TOKEN_CLAIM))
}
