use crate::{UrlError, UrlResult};
use url::{form_urlencoded, Url};

/// Click identifiers stripped from queries; any `utm_*` key is stripped too
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "yclid", "mc_eid"];

/// Normalizes a URL so equivalent links collapse to one visited-set entry
///
/// Only http and https URLs with a host are accepted. The host is lowercased,
/// `.`/`..` and empty path segments are resolved, the fragment is dropped and
/// the query loses its tracking parameters and is sorted by key. An empty
/// path becomes `/`; a trailing slash is kept.
///
/// Scheme and a `www.` prefix are left as found: the audit fetches exactly
/// the URLs the site links to.
///
/// # Examples
///
/// ```
/// use site_auditor::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.COM/a//b/../page?b=2&a=1#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/a/page?a=1&b=2");
/// ```
pub fn normalize_url(url_str: &str) -> UrlResult<Url> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = match url.host_str() {
        Some(h) if !h.is_empty() => h.to_lowercase(),
        _ => return Err(UrlError::MissingDomain),
    };
    // IDNA hosts arrive lowercased already; opaque hosts may not
    if url.host_str() != Some(host.as_str()) {
        url.set_host(Some(&host))
            .map_err(|e| UrlError::Parse(e.to_string()))?;
    }

    let path = clean_path(url.path());
    url.set_path(&path);
    url.set_fragment(None);

    let query = url.query().and_then(clean_query);
    url.set_query(query.as_deref());

    Ok(url)
}

/// Resolves `.` and `..`, drops empty segments, keeps a trailing slash
fn clean_path(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }

    let mut cleaned = String::with_capacity(path.len());
    for segment in &stack {
        cleaned.push('/');
        cleaned.push_str(segment);
    }
    if cleaned.is_empty() || (path.ends_with('/') && !stack.is_empty()) {
        cleaned.push('/');
    }
    cleaned
}

/// Rebuilds a query without tracking keys, pairs sorted; `None` when nothing is left
fn clean_query(query: &str) -> Option<String> {
    let mut pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if pairs.is_empty() {
        return None;
    }
    pairs.sort();

    Some(
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish(),
    )
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
