//! Outbound target derivation.

use http::header::HOST;
use http::Request;

/// Where an outbound call is going, derived once at interception time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallTarget {
    /// Scheme with trailing colon, e.g. `https:`.
    pub protocol: String,
    /// Host header value, or the URI authority when no header is set.
    pub host: String,
    /// Path plus query.
    pub path: String,
    /// `{protocol}//{host}{path}`.
    pub url: String,
}

impl CallTarget {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let uri = request.uri();

        let protocol = format!("{}:", uri.scheme_str().unwrap_or("http"));

        let host = request
            .headers()
            .get(HOST)
            .and_then(|h| h.to_str().ok())
            .map(str::to_owned)
            .or_else(|| uri.authority().map(|a| a.to_string()))
            .unwrap_or_default();

        let path = match uri.query() {
            Some(query) => format!("{}?{}", uri.path(), query),
            None => uri.path().to_string(),
        };

        let url = format!("{}//{}{}", protocol, host, path);

        Self {
            protocol,
            host,
            path,
            url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_from_absolute_uri() {
        let req = Request::get("http://localhost:9000").body(()).unwrap();
        let target = CallTarget::from_request(&req);
        assert_eq!(target.protocol, "http:");
        assert_eq!(target.host, "localhost:9000");
        assert_eq!(target.path, "/");
        assert_eq!(target.url, "http://localhost:9000/");
    }

    #[test]
    fn keeps_query() {
        let req = Request::get("https://api.example.com/v1/items?page=2")
            .body(())
            .unwrap();
        let target = CallTarget::from_request(&req);
        assert_eq!(target.path, "/v1/items?page=2");
        assert_eq!(target.url, "https://api.example.com/v1/items?page=2");
    }

    #[test]
    fn host_header_wins_over_authority() {
        let req = Request::get("http://10.0.0.5:8080/health")
            .header("host", "service.internal")
            .body(())
            .unwrap();
        let target = CallTarget::from_request(&req);
        assert_eq!(target.url, "http://service.internal/health");
    }
}
