//! Result of resolving a single redirect request.

/// What the redirect handler should answer with.
///
/// Transient: built per request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The path was not a short-name request; send the default redirect.
    DefaultRedirect,
    /// The name resolved; redirect to the target (remainder already appended).
    Resolved(String),
    /// A `go-get=1` discovery request for a known name.
    VanityImport { repository: String },
    /// The name is unknown (or mapped to an empty URL); send the default redirect.
    NotFound,
    /// The store failed while looking up the name.
    InternalError { name: String },
}

impl RequestOutcome {
    /// Returns true when the answer is the configured default redirect.
    pub fn is_default_redirect(&self) -> bool {
        matches!(self, Self::DefaultRedirect | Self::NotFound)
    }
}
