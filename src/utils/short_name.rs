//! Short-name validation and request path classification.
//!
//! A short name is the first path segment of a redirect request. Names are
//! restricted to ASCII letters, digits, `_` and `-`.

use regex::Regex;
use std::sync::LazyLock;

/// Matches a leading `/` followed by at least one name character.
///
/// Uses the same charset as [`is_valid_name`], so `/foo-bar` looks up
/// `foo-bar` and never `foo` with `-bar` appended.
static SHORT_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/[0-9A-Za-z_-]+").expect("short path pattern is a valid regex")
});

/// Returns true when `name` is non-empty and only uses `[0-9A-Za-z_-]`.
///
/// Checked before any store mutation.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// A request target split into the short name and everything after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortPath {
    /// The looked-up name, without the leading slash.
    pub name: String,
    /// The rest of the (escaped) target, appended verbatim to the resolved URL.
    pub remainder: String,
}

impl ShortPath {
    /// Classifies a raw request target (path plus optional query).
    ///
    /// Returns `None` when the request should fall through to the default
    /// redirect: targets shorter than two characters, or targets whose first
    /// segment is not a valid short name.
    ///
    /// The target is HTML-escaped before matching, so the remainder is
    /// escaped as well.
    pub fn parse(target: &str) -> Option<Self> {
        if target.len() <= 1 {
            return None;
        }

        let escaped = escape_html(target);
        let found = SHORT_PATH.find(&escaped)?;
        if found.start() != 0 || found.end() <= 1 {
            return None;
        }

        Some(Self {
            name: escaped[1..found.end()].to_string(),
            remainder: escaped[found.end()..].to_string(),
        })
    }

    /// The matched prefix, including the leading slash.
    pub fn prefix(&self) -> String {
        format!("/{}", self.name)
    }
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&#34;"),
            _ => out.push(c),
        }
    }
    out
}
