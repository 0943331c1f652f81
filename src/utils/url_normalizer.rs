//! URL normalization for redirect targets.
//!
//! Targets are stored exactly as entered apart from surrounding whitespace and
//! a missing scheme, so that sub-path passthrough (`<url>` + `/rest`) keeps the
//! author's spelling.

use url::Url;

/// Scheme assumed when the input does not carry one.
pub const DEFAULT_SCHEME: &str = "https";

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("URL is empty")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL has no host")]
    MissingHost,
}

/// Normalizes a redirect target.
///
/// # Normalization Rules
///
/// 1. **Whitespace**: Leading and trailing whitespace is trimmed
/// 2. **Scheme**: `https://` is prepended when the input has no scheme
/// 3. **Protocol**: Only HTTP and HTTPS are allowed
/// 4. **Host**: Must be present
///
/// The returned string is the trimmed (and possibly prefixed) input, not the
/// re-serialized [`Url`], so no trailing slash is introduced.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_url("example.com/docs").unwrap(), "https://example.com/docs");
/// assert_eq!(normalize_url(" http://a.test ").unwrap(), "http://a.test");
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }

    let candidate = match Url::parse(trimmed) {
        Ok(url) if url.has_host() => trimmed.to_string(),
        Ok(url) if starts_with_port(trimmed, url.scheme()) => with_default_scheme(trimmed),
        Ok(url) if is_http_like(url.scheme()) => return Err(UrlNormalizationError::MissingHost),
        Ok(_) => return Err(UrlNormalizationError::UnsupportedProtocol),
        Err(url::ParseError::RelativeUrlWithoutBase) => with_default_scheme(trimmed),
        Err(e) => return Err(UrlNormalizationError::InvalidFormat(e.to_string())),
    };

    let url =
        Url::parse(&candidate).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    if !is_http_like(url.scheme()) {
        return Err(UrlNormalizationError::UnsupportedProtocol);
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlNormalizationError::MissingHost);
    }

    Ok(candidate)
}

fn with_default_scheme(input: &str) -> String {
    format!("{DEFAULT_SCHEME}://{}", input.trim_start_matches('/'))
}

/// `localhost:8080/x` parses with `localhost` as its scheme; a digit right
/// after the colon means it was a host and port.
fn starts_with_port(input: &str, scheme: &str) -> bool {
    input
        .get(scheme.len() + 1..)
        .and_then(|rest| rest.bytes().next())
        .is_some_and(|b| b.is_ascii_digit())
}

fn is_http_like(scheme: &str) -> bool {
    matches!(scheme, "http" | "https")
}
