/// Domain extraction for card source URLs
use url::{Host, Url};

/// Registrable domain of a card URL, used for the link chip on cards
///
/// Keeps the last two host labels, or three for `co.uk` / `com.au` style
/// suffixes. Hosts without a scheme (`panoramix.cc/page`) are accepted.
/// Localhost and IP addresses are returned as-is.
///
/// Examples:
/// - https://www.google.com/search → google.com
/// - https://news.bbc.co.uk/article → bbc.co.uk
/// - panoramix.cc → panoramix.cc
pub fn extract_domain(url: &str) -> Option<String> {
    let parsed = parse_lenient(url.trim())?;

    match parsed.host()? {
        Host::Ipv4(ip) => Some(ip.to_string()),
        Host::Ipv6(ip) => Some(ip.to_string()),
        Host::Domain(hostname) => {
            let hostname = hostname.trim_end_matches('.').to_lowercase();
            if hostname.is_empty() {
                return None;
            }
            if hostname == "localhost" {
                return Some(hostname);
            }

            let parts: Vec<&str> = hostname.split('.').collect();
            if parts.len() < 2 {
                return Some(hostname);
            }

            let tld = parts[parts.len() - 1];
            let num_parts = if parts.len() >= 3
                && tld.len() == 2
                && matches!(parts[parts.len() - 2], "co" | "com")
            {
                3
            } else {
                2
            };

            Some(parts[parts.len() - num_parts..].join("."))
        }
    }
}

fn parse_lenient(url: &str) -> Option<Url> {
    if url.is_empty() {
        return None;
    }
    match Url::parse(url) {
        Ok(parsed) => parsed.has_host().then_some(parsed),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{url}")).ok()
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_domain_basic() {
        assert_eq!(extract_domain("https://www.google.com"), Some("google.com".to_string()));
        assert_eq!(extract_domain("http://google.com"), Some("google.com".to_string()));
        assert_eq!(
            extract_domain("https://github.com/rust-lang/rust?tab=readme"),
            Some("github.com".to_string())
        );
    }

    #[test]
    fn test_extract_domain_country_tlds() {
        assert_eq!(extract_domain("https://news.bbc.co.uk/news"), Some("bbc.co.uk".to_string()));
        assert_eq!(
            extract_domain("https://shop.example.com.au/products"),
            Some("example.com.au".to_string())
        );
    }

    #[test]
    fn test_extract_domain_without_scheme() {
        assert_eq!(extract_domain("panoramix.cc"), Some("panoramix.cc".to_string()));
        assert_eq!(extract_domain("www.panoramix.cc/board/1"), Some("panoramix.cc".to_string()));
    }

    #[test]
    fn test_extract_domain_special_hosts() {
        assert_eq!(extract_domain("http://localhost:5005/api"), Some("localhost".to_string()));
        assert_eq!(extract_domain("http://127.0.0.1:8080"), Some("127.0.0.1".to_string()));
        assert_eq!(extract_domain("https://WWW.Example.ORG"), Some("example.org".to_string()));
    }

    #[test]
    fn test_extract_domain_rejects_hostless() {
        assert_eq!(extract_domain(""), None);
        assert_eq!(extract_domain("   "), None);
        assert_eq!(extract_domain("https://"), None);
        assert_eq!(extract_domain("data:image/png;base64,AAAA"), None);
    }
}
