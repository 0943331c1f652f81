//! Handler for short-name redirects.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::application::services::VANITY_QUERY;
use crate::domain::entities::RequestOutcome;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::short_name::ShortPath;

/// Documentation host the vanity page points to.
const DOCS_BASE: &str = "https://pkg.go.dev/";

/// Import-path discovery page for the Go toolchain.
///
/// Renders `templates/vanity.html` with `go-import` and `go-source` meta tags
/// pointing at the stored repository URL.
#[derive(Template, WebTemplate)]
#[template(path = "vanity.html")]
pub struct VanityTemplate {
    pub import_path: String,
    pub repository: String,
    pub docs_url: String,
}

/// Redirects a short name to its stored URL.
///
/// # Endpoint
///
/// Any method, any path. Mounted as the router fallback.
///
/// # Request Flow
///
/// 1. Targets of one character, or whose first segment is not a short name,
///    get the default redirect
/// 2. Look up the name in the store
/// 3. Unknown names and empty URLs get the default redirect
/// 4. `GET /{name}?go-get=1` returns the import-path discovery page
/// 5. Otherwise 307 to the stored URL with the rest of the target appended
///
/// # Errors
///
/// Returns 500 with body `Could not fetch requested URL "{name}"` if the
/// lookup fails. The listener keeps serving.
pub async fn redirect_handler(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    drop(body);

    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_default();

    let vanity = parts.method == Method::GET && parts.uri.query() == Some(VANITY_QUERY);
    let path = ShortPath::parse(target);

    let outcome = match &path {
        Some(path) => {
            state
                .redirect
                .resolve(&path.name, &path.remainder, vanity)
                .await
        }
        None => RequestOutcome::DefaultRedirect,
    };

    match (outcome, path) {
        (RequestOutcome::InternalError { name }, _) => AppError::Lookup { name }.into_response(),
        (RequestOutcome::Resolved(url), Some(path)) => temporary_redirect(&url)
            .unwrap_or_else(|| AppError::InvalidTarget { name: path.name }.into_response()),
        (RequestOutcome::VanityImport { repository }, Some(path)) => {
            let host = parts
                .headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .or_else(|| parts.uri.host())
                .unwrap_or_default();
            vanity_page(host, &path, repository)
        }
        (RequestOutcome::NotFound | RequestOutcome::DefaultRedirect, _) | (_, None) => {
            default_redirect(&state)
        }
    }
}

fn default_redirect(state: &AppState) -> Response {
    let url = state.redirect.default_url();
    temporary_redirect(url).unwrap_or_else(|| {
        tracing::error!(url, "Default redirect is not a valid header value");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

/// Builds a 307 response, or `None` if `url` cannot be sent as a header.
fn temporary_redirect(url: &str) -> Option<Response> {
    let location = HeaderValue::from_str(url).ok()?;
    Some((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
}

fn vanity_page(host: &str, path: &ShortPath, repository: String) -> Response {
    let import_path = format!("{host}{}", path.prefix());
    let docs_url = format!("{DOCS_BASE}{import_path}");

    let Ok(location) = HeaderValue::from_str(&docs_url) else {
        return AppError::InvalidTarget {
            name: path.name.clone(),
        }
        .into_response();
    };

    (
        StatusCode::OK,
        [(header::LOCATION, location)],
        VanityTemplate {
            import_path,
            repository,
            docs_url,
        },
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vanity_template_renders_meta_tags() {
        let html = VanityTemplate {
            import_path: "go.example.com/tool".to_string(),
            repository: "https://git.example.com/tool".to_string(),
            docs_url: "https://pkg.go.dev/go.example.com/tool".to_string(),
        }
        .render()
        .unwrap();

        assert!(html.contains(
            r#"<meta name="go-import" content="go.example.com/tool git https://git.example.com/tool">"#
        ));
        assert!(html.contains("https://git.example.com/tool/tree/master{/dir}/{file}#L{line}"));
        assert!(html.contains(r#"<meta http-equiv="refresh" content="0; url=https://git.example.com/tool">"#));
        assert!(html.contains(r#"<a href="https://pkg.go.dev/go.example.com/tool">here</a>"#));
    }

    #[test]
    fn test_temporary_redirect_rejects_control_characters() {
        assert!(temporary_redirect("https://a.test/\n").is_none());

        let response = temporary_redirect("https://a.test/x").unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "https://a.test/x");
    }
}
