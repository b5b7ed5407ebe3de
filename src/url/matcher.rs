/// Checks whether a host lies within an allowed domain
///
/// The allowed domain matches itself and any of its subdomains, so
/// `example.com` allows `example.com`, `blog.example.com` and
/// `a.b.example.com`, but not `badexample.com`.
///
/// # Examples
///
/// ```
/// use bibcrawl::url::matches_domain;
///
/// assert!(matches_domain("example.com", "blog.example.com"));
/// assert!(!matches_domain("example.com", "example.org"));
/// ```
pub fn matches_domain(allowed: &str, host: &str) -> bool {
    let allowed = allowed.to_lowercase();
    let host = host.to_lowercase();

    host == allowed || host.ends_with(&format!(".{}", allowed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(matches_domain("example.com", "example.com"));
        assert!(!matches_domain("example.com", "other.com"));
    }

    #[test]
    fn test_subdomain_match() {
        assert!(matches_domain("example.com", "blog.example.com"));
        assert!(matches_domain("example.com", "api.v2.example.com"));
    }

    #[test]
    fn test_suffix_without_dot_does_not_match() {
        assert!(!matches_domain("example.com", "badexample.com"));
    }

    #[test]
    fn test_parent_does_not_match_subdomain_rule() {
        assert!(!matches_domain("blog.example.com", "example.com"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(matches_domain("Example.COM", "BLOG.example.com"));
    }
}
