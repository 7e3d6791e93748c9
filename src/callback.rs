use url::Url;

/// Authorization response carried in the URL the provider redirected back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectResponse {
    /// `?code=..&state=..`
    Authorization { code: String, state: String },
    /// `?error=..&state=..`, optionally with `error_description`.
    Error {
        error: String,
        description: Option<String>,
        state: String,
    },
}

#[derive(Default)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl CallbackParams {
    fn from_url(url: &Url) -> Self {
        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            if value.is_empty() {
                continue;
            }
            let slot = match &*key {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                _ => continue,
            };
            slot.get_or_insert_with(|| value.into_owned());
        }
        params
    }
}

/// Detect a pending authorization response.
///
/// Both `state` and one of `code`/`error` must be present; a lone `code`
/// or `state` is an ordinary page load. Empty values count as missing.
#[must_use]
pub fn detect(url: &Url) -> Option<RedirectResponse> {
    let params = CallbackParams::from_url(url);
    let state = params.state?;

    if let Some(code) = params.code {
        return Some(RedirectResponse::Authorization { code, state });
    }
    params.error.map(|error| RedirectResponse::Error {
        error,
        description: params.error_description,
        state,
    })
}

/// `url` without its query string; path and fragment are kept.
#[must_use]
pub fn strip_query(url: &Url) -> Url {
    let mut cleaned = url.clone();
    cleaned.set_query(None);
    cleaned
}
