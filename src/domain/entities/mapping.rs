//! Mapping entity representing a short name bound to a redirect target.

/// A short name and the absolute URL it redirects to.
///
/// Names are unique and case-sensitive. URLs always carry an explicit scheme.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Mapping {
    #[sqlx(rename = "link_name")]
    pub name: String,
    #[sqlx(rename = "link_url")]
    pub url: String,
}

impl Mapping {
    /// Creates a new Mapping instance.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}
