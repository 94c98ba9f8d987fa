use serde_json::Value;

/// Public translation endpoint used when none is supplied explicitly.
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// Endpoint answered with a non-success status code.
    Http(u16),
    /// The request never completed (connect, DNS, read failure).
    Transport(String),
    /// Response body did not have the expected fragment-list shape.
    Parse(String),
}

impl std::fmt::Display for TranslateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslateError::Http(status) => write!(f, "translation endpoint returned HTTP {status}"),
            TranslateError::Transport(msg) => write!(f, "translation request failed: {msg}"),
            TranslateError::Parse(msg) => write!(f, "unexpected translation response: {msg}"),
        }
    }
}

impl std::error::Error for TranslateError {}

/// Trim a raw selection. `None` means a whitespace-only selection: the
/// caller must abort silently, before any translation call is made.
pub fn normalize_selection(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Build the GET URL for a translation request.
pub fn request_url(endpoint: &str, text: &str, target_language: &str) -> String {
    format!(
        "{endpoint}?client=gtx&sl=auto&tl={}&dt=t&q={}",
        urlencoding::encode(target_language),
        urlencoding::encode(text)
    )
}

/// Extract the translated text from a response body. The endpoint answers
/// with a JSON array whose first element is a list of fragment tuples; the
/// head of each tuple is a translated fragment and the full translation is
/// their in-order concatenation.
pub fn parse_translation(body: &str) -> Result<String, TranslateError> {
    let data: Value =
        serde_json::from_str(body).map_err(|e| TranslateError::Parse(e.to_string()))?;
    let fragments = data
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::Parse("missing fragment list".into()))?;

    let mut out = String::new();
    for item in fragments {
        match item.get(0) {
            Some(Value::String(frag)) => out.push_str(frag),
            // Trailing tuples occasionally carry a null fragment.
            Some(Value::Null) => {}
            _ => return Err(TranslateError::Parse("fragment is not a string".into())),
        }
    }
    Ok(out)
}

/// Translate `text` into `target_language` with a single blocking GET.
/// No retries and no batching; timeouts are the transport defaults.
pub fn translate(text: &str, target_language: &str) -> Result<String, TranslateError> {
    translate_with_endpoint(DEFAULT_ENDPOINT, text, target_language)
}

pub fn translate_with_endpoint(
    endpoint: &str,
    text: &str,
    target_language: &str,
) -> Result<String, TranslateError> {
    let url = request_url(endpoint, text, target_language);
    tracing::debug!(%target_language, "requesting translation");
    let resp =
        reqwest::blocking::get(&url).map_err(|e| TranslateError::Transport(e.to_string()))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(TranslateError::Http(status.as_u16()));
    }
    let body = resp
        .text()
        .map_err(|e| TranslateError::Transport(e.to_string()))?;
    parse_translation(&body)
}
