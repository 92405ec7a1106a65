use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Reasons a URL is refused as a remote document source.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("Private IP address not allowed: {0}")]
    PrivateIp(String),
    #[error("Localhost not allowed")]
    Localhost,
}

/// Checks that a URL may be fetched as a feed document.
///
/// Only `http` and `https` are accepted. Unless `allow_private_hosts` is set,
/// localhost, loopback, link-local, unspecified and private (RFC 1918 /
/// unique local IPv6) addresses are refused as well.
///
/// # Examples
///
/// ```
/// use jsonfeed::util::validate_fetch_url;
///
/// assert!(validate_fetch_url("https://example.org/feed.json", false).is_ok());
/// assert!(validate_fetch_url("file:///etc/passwd", false).is_err());
/// assert!(validate_fetch_url("http://127.0.0.1/feed.json", false).is_err());
/// assert!(validate_fetch_url("http://127.0.0.1/feed.json", true).is_ok());
/// ```
pub fn validate_fetch_url(url_str: &str, allow_private_hosts: bool) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if allow_private_hosts {
        return Ok(url);
    }

    if let Some(host) = url.host_str() {
        if host.eq_ignore_ascii_case("localhost") {
            return Err(UrlValidationError::Localhost);
        }

        let bare_host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);

        if let Ok(ip) = bare_host.parse::<IpAddr>() {
            // ::ffff:a.b.c.d reaches the IPv4 host a.b.c.d
            let ip = match ip {
                IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(ip, IpAddr::V4),
                v4 => v4,
            };
            if ip.is_loopback() {
                return Err(UrlValidationError::Localhost);
            }
            if is_private_ip(&ip) {
                return Err(UrlValidationError::PrivateIp(ip.to_string()));
            }
        }
    }

    Ok(url)
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_link_local() || v4.is_unspecified(),
        IpAddr::V6(v6) => {
            if v6.is_unspecified() {
                return true;
            }
            let first = v6.segments()[0];
            // fc00::/7 unique local, fe80::/10 link-local
            (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_http_and_https_accepted() {
        assert!(validate_fetch_url("https://example.com/feed.json", false).is_ok());
        assert!(validate_fetch_url("http://news.example.org:8080/feed", false).is_ok());
    }

    #[test]
    fn test_non_http_schemes_rejected() {
        for url in ["file:///tmp/feed.json", "ftp://example.com/feed", "data:,{}"] {
            assert!(
                matches!(
                    validate_fetch_url(url, true),
                    Err(UrlValidationError::UnsupportedScheme(_))
                ),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn test_unparsable_url_rejected() {
        assert!(matches!(
            validate_fetch_url("not a url", false),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_localhost_rejected_by_default() {
        assert!(matches!(
            validate_fetch_url("http://localhost/feed", false),
            Err(UrlValidationError::Localhost)
        ));
        assert!(matches!(
            validate_fetch_url("http://127.0.0.1:3000/feed", false),
            Err(UrlValidationError::Localhost)
        ));
        assert!(matches!(
            validate_fetch_url("http://[::1]/feed", false),
            Err(UrlValidationError::Localhost)
        ));
        assert!(matches!(
            validate_fetch_url("http://[::ffff:127.0.0.1]/feed", false),
            Err(UrlValidationError::Localhost)
        ));
    }

    #[test]
    fn test_mapped_public_address_accepted() {
        assert!(validate_fetch_url("http://[::ffff:93.184.216.34]/feed", false).is_ok());
    }

    #[test]
    fn test_private_ranges_rejected_by_default() {
        for url in [
            "http://10.0.0.1/feed",
            "http://172.16.0.1/feed",
            "http://192.168.1.1:8080/feed",
            "http://169.254.1.1/feed",
            "http://0.0.0.0/feed",
            "http://[fe80::1]/feed",
            "http://[fd00::1]/feed",
            "http://[::ffff:10.0.0.1]/feed",
            "http://[::ffff:a9fe:a9fe]/feed",
        ] {
            assert!(
                matches!(
                    validate_fetch_url(url, false),
                    Err(UrlValidationError::PrivateIp(_))
                ),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn test_private_hosts_allowed_when_configured() {
        assert!(validate_fetch_url("http://127.0.0.1:3000/feed", true).is_ok());
        assert!(validate_fetch_url("http://localhost/feed", true).is_ok());
        assert!(validate_fetch_url("http://192.168.1.1/feed", true).is_ok());
    }
}
