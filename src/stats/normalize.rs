//! Canonical URL keys for statistics.

use url::Url;

/// Normalize an outbound URL into its statistics key.
///
/// The URL is canonicalized (lowercase scheme and host, default port elided,
/// empty path becomes `/`) and any run of trailing slashes collapses to one,
/// so `http://Host:80` and `http://host//` share the key `http://host/`.
pub fn normalize_url(raw: &str) -> String {
    let canonical = match Url::parse(raw) {
        Ok(url) => url.to_string(),
        Err(_) => raw.to_string(),
    };
    collapse_trailing_slashes(canonical)
}

fn collapse_trailing_slashes(mut url: String) -> String {
    let (head, query) = match url.find(['?', '#']) {
        Some(idx) => {
            let tail = url.split_off(idx);
            (url, tail)
        }
        None => (url, String::new()),
    };

    let trimmed = head.trim_end_matches('/');
    if trimmed.len() == head.len() || trimmed.ends_with(':') {
        // No trailing slash, or an opaque/scheme-only remainder.
        return head + &query;
    }
    format!("{}/{}", trimmed, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_gets_single_slash() {
        assert_eq!(normalize_url("http://localhost:9000"), "http://localhost:9000/");
        assert_eq!(normalize_url("https://localhost:9876/"), "https://localhost:9876/");
    }

    #[test]
    fn duplicate_trailing_slashes_collapse() {
        assert_eq!(normalize_url("http://host//"), "http://host/");
        assert_eq!(normalize_url("http://host/foo///"), "http://host/foo/");
    }

    #[test]
    fn query_is_kept() {
        assert_eq!(
            normalize_url("http://host/search//?q=a/b"),
            "http://host/search/?q=a/b"
        );
    }

    #[test]
    fn host_and_default_port_are_canonical() {
        assert_eq!(normalize_url("HTTP://Example.COM:80/a"), "http://example.com/a");
    }

    #[test]
    fn non_trailing_path_is_untouched() {
        assert_eq!(normalize_url("http://host/foo/bar"), "http://host/foo/bar");
    }

    #[test]
    fn unparseable_input_is_kept() {
        assert_eq!(normalize_url("not a url"), "not a url");
    }
}
