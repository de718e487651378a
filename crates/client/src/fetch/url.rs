//! Scope-relative URL resolution for cache keys and fetches.

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve `input` against the worker scope.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Join relative input (`./`, `index.html`, `/app.js`) onto `scope`
/// 3. Require http or https
/// 4. Lowercase the host
/// 5. Remove fragment (#...), keep the query string intact
pub fn resolve(scope: &url::Url, input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut resolved = scope.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match resolved.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = resolved.host_str()
        && host.chars().any(|c| c.is_ascii_uppercase())
    {
        let lowered = host.to_ascii_lowercase();
        resolved
            .set_host(Some(&lowered))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    resolved.set_fragment(None);

    Ok(resolved)
}

/// Parse the scope URL itself. It must be absolute http(s).
pub fn parse_scope(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let scope = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    match scope.scheme() {
        "http" | "https" => Ok(scope),
        scheme => Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> url::Url {
        parse_scope("https://example.com/app/").unwrap()
    }

    #[test]
    fn test_resolve_dot_slash() {
        let url = resolve(&scope(), "./").unwrap();
        assert_eq!(url.as_str(), "https://example.com/app/");
    }

    #[test]
    fn test_resolve_relative_file() {
        let url = resolve(&scope(), "./index.html").unwrap();
        assert_eq!(url.as_str(), "https://example.com/app/index.html");

        let url = resolve(&scope(), "icons/icon-192.png").unwrap();
        assert_eq!(url.as_str(), "https://example.com/app/icons/icon-192.png");
    }

    #[test]
    fn test_resolve_root_relative() {
        let url = resolve(&scope(), "/manifest.json").unwrap();
        assert_eq!(url.as_str(), "https://example.com/manifest.json");
    }

    #[test]
    fn test_resolve_absolute_passthrough() {
        let url = resolve(&scope(), "https://cdn.example.org/lib.js").unwrap();
        assert_eq!(url.host_str(), Some("cdn.example.org"));
    }

    #[test]
    fn test_resolve_remove_fragment() {
        let url = resolve(&scope(), "./index.html#top").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/app/index.html");
    }

    #[test]
    fn test_resolve_preserve_query() {
        let url = resolve(&scope(), "./data.json?a=1&b=2").unwrap();
        assert_eq!(url.query(), Some("a=1&b=2"));
    }

    #[test]
    fn test_resolve_lowercase_host() {
        let url = resolve(&scope(), "https://EXAMPLE.COM/x").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve(&scope(), "file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve(&scope(), ""), Err(UrlError::Empty)));
        assert!(matches!(resolve(&scope(), "   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_parse_scope_rejects_relative() {
        assert!(matches!(parse_scope("./"), Err(UrlError::InvalidUrl(_))));
    }
}
