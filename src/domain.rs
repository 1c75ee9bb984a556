//! Utility functions for normalizing URLs and extracting crawl domains.

use url::Url;

/// Normalizes a raw URL string so it can be fetched.
/// Blank input is returned unchanged; anything that does not already start
/// with an `http` scheme gets `http://` prepended. No relative resolution
/// happens here, callers resolve against a base first.
pub(crate) fn normalize_url(raw: &str) -> String {
    if raw.is_empty() || raw.starts_with("http") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    }
}

/// Extracts the crawl domain (e.g. "example.com") from a URL string.
///
/// Hosts beginning with `www` lose exactly their first four characters,
/// so `www.example.com` becomes `example.com`.
///
/// # Arguments
/// * `url_str` - The absolute URL to take the domain from.
///
/// # Returns
/// * `Some(String)` with the domain on success.
/// * `None` if the URL does not parse, has no host, or the host reduces
///   to an empty string after the `www` strip.
pub(crate) fn domain_of(url_str: &str) -> Option<String> {
    let url = Url::parse(url_str).ok()?;
    let host = url.host_str()?;

    let domain = if host.starts_with("www") {
        host.get(4..).unwrap_or_default()
    } else {
        host
    };

    if domain.is_empty() {
        return None;
    }
    Some(domain.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url_prepends_scheme() {
        assert_eq!(normalize_url("example.com"), "http://example.com");
        assert_eq!(
            normalize_url("example.com/contact"),
            "http://example.com/contact"
        );
    }

    #[test]
    fn test_normalize_url_keeps_existing_scheme() {
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(
            normalize_url("https://example.com/a?b=1"),
            "https://example.com/a?b=1"
        );
    }

    #[test]
    fn test_normalize_url_blank_stays_blank() {
        assert_eq!(normalize_url(""), "");
    }

    #[test]
    fn test_domain_of_simple() {
        assert_eq!(domain_of("http://example.com").as_deref(), Some("example.com"));
        assert_eq!(
            domain_of("http://example.com:8080/x").as_deref(),
            Some("example.com")
        );
        assert_eq!(
            domain_of("https://sub.domain.example.co.uk").as_deref(),
            Some("sub.domain.example.co.uk")
        );
    }

    #[test]
    fn test_domain_of_strips_www() {
        assert_eq!(
            domain_of("https://www.example.com").as_deref(),
            Some("example.com")
        );
        assert_eq!(
            domain_of("http://www.example.com/contact?x=1").as_deref(),
            Some("example.com")
        );
    }

    #[test]
    fn test_domain_of_strip_is_positional() {
        // the strip removes four characters whenever the host starts with
        // `www`, dot or not
        assert_eq!(
            domain_of("http://wwwexample.com").as_deref(),
            Some("xample.com")
        );
    }

    #[test]
    fn test_domain_of_invalid() {
        assert_eq!(domain_of(""), None);
        assert_eq!(domain_of("http://"), None);
        assert_eq!(domain_of("not a url"), None);
        assert_eq!(domain_of("mailto:user@example.com"), None);
        assert_eq!(domain_of("http://www./"), None);
    }
}
