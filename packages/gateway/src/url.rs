//! URL construction and server error message extraction.

use reqwest::Url;

use crate::RemoteError;

/// Maximum length of a plain-text error body used as a message.
const BODY_PREVIEW_LEN: usize = 500;

/// Builds `base` + path `segments` + query string.
///
/// Segments are percent-encoded individually, so ids containing `/` or
/// spaces stay a single segment. Query pairs with an empty value are
/// dropped.
///
/// # Errors
///
/// Returns [`RemoteError::InvalidUrl`] if `base` is not an absolute URL
/// that can carry a path.
pub fn build_url(
    base: &str,
    segments: &[&str],
    query: &[(&str, String)],
) -> Result<Url, RemoteError> {
    let invalid = |message: String| RemoteError::InvalidUrl {
        url: base.to_string(),
        message,
    };

    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;

    url.path_segments_mut()
        .map_err(|()| invalid("URL cannot be a base".to_string()))?
        .pop_if_empty()
        .extend(segments);

    let present: Vec<(&str, &str)> = query
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (*key, value.as_str()))
        .collect();

    if !present.is_empty() {
        url.query_pairs_mut().extend_pairs(present);
    }

    Ok(url)
}

/// Extracts the server-provided error message from a response body.
///
/// Understands `{"detail": {"message": ..}}`, `{"detail": ".."}`,
/// `{"message": ..}` and `{"error": ..}`. A non-JSON body is used
/// verbatim (truncated). Returns `None` for empty bodies.
#[must_use]
pub fn server_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        let preview: String = body.chars().take(BODY_PREVIEW_LEN).collect();
        return Some(preview);
    };

    let candidates = [
        &json["detail"]["message"],
        &json["detail"],
        &json["message"],
        &json["error"],
    ];

    candidates
        .into_iter()
        .find_map(|value| value.as_str())
        .filter(|message| !message.is_empty())
        .map(String::from)
}
