//! Support gates for interception and body rewriting.

use http::header::{CONTENT_ENCODING, CONTENT_TYPE, SET_COOKIE, UPGRADE};
use http::{HeaderMap, Method};

use crate::codec;

/// Whether a request is eligible for interception at all. Only `GET`
/// requests qualify, and never websocket upgrades: intercepting an upgrade
/// would break protocol framing.
pub fn supports_processing(method: &Method, headers: &HeaderMap) -> bool {
    if method != Method::GET {
        return false;
    }
    !headers
        .get_all(UPGRADE)
        .iter()
        .any(|value| header_contains(value, "websocket"))
}

/// Whether a response body is eligible for rewriting: textual (or untyped)
/// content in a codec-supported encoding, and no XSRF token cookie in play.
pub fn supports_rewrite(headers: &HeaderMap) -> bool {
    supports_content(headers) && supports_writing(headers)
}

fn supports_content(headers: &HeaderMap) -> bool {
    let content_type = header_str(headers, &CONTENT_TYPE);
    if !content_type.is_empty() && !content_type.contains("text") {
        return false;
    }
    codec::is_supported(header_str(headers, &CONTENT_ENCODING))
}

/// Responses carrying an XSRF-TOKEN cookie must never be rewritten.
fn supports_writing(headers: &HeaderMap) -> bool {
    !headers
        .get_all(SET_COOKIE)
        .iter()
        .any(|value| header_contains(value, "XSRF-TOKEN"))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &http::header::HeaderName) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

fn header_contains(value: &http::HeaderValue, needle: &str) -> bool {
    value
        .to_str()
        .map(|text| text.contains(needle))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                http::header::HeaderName::from_static(name),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_get_without_upgrade_is_supported() {
        assert!(supports_processing(&Method::GET, &HeaderMap::new()));
    }

    #[test]
    fn test_non_get_methods_are_rejected() {
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::HEAD] {
            assert!(!supports_processing(&method, &HeaderMap::new()));
        }
    }

    #[test]
    fn test_websocket_upgrade_is_rejected() {
        let map = headers(&[("upgrade", "websocket")]);
        assert!(!supports_processing(&Method::GET, &map));
    }

    #[test]
    fn test_other_upgrades_are_allowed() {
        let map = headers(&[("upgrade", "h2c")]);
        assert!(supports_processing(&Method::GET, &map));
    }

    #[test]
    fn test_empty_content_type_is_rewritable() {
        assert!(supports_rewrite(&HeaderMap::new()));
    }

    #[test]
    fn test_text_content_types_are_rewritable() {
        for content_type in ["text/html", "text/plain; charset=utf-8"] {
            let map = headers(&[("content-type", content_type)]);
            assert!(supports_rewrite(&map));
        }
    }

    #[test]
    fn test_binary_content_types_are_not_rewritable() {
        for content_type in ["application/octet-stream", "image/png"] {
            let map = headers(&[("content-type", content_type)]);
            assert!(!supports_rewrite(&map));
        }
    }

    #[test]
    fn test_supported_encodings_pass() {
        for encoding in ["identity", "gzip", "deflate"] {
            let map = headers(&[("content-type", "text/html"), ("content-encoding", encoding)]);
            assert!(supports_rewrite(&map), "encoding {encoding} should pass");
        }
    }

    #[test]
    fn test_unsupported_encoding_disqualifies() {
        let map = headers(&[("content-type", "text/html"), ("content-encoding", "br")]);
        assert!(!supports_rewrite(&map));
    }

    #[test]
    fn test_xsrf_cookie_disables_rewriting() {
        let map = headers(&[
            ("content-type", "text/html"),
            ("set-cookie", "session=abc"),
            ("set-cookie", "XSRF-TOKEN=xyz; Path=/"),
        ]);
        assert!(!supports_rewrite(&map));
    }

    #[test]
    fn test_unrelated_cookies_are_fine() {
        let map = headers(&[("content-type", "text/html"), ("set-cookie", "session=abc")]);
        assert!(supports_rewrite(&map));
    }
}
