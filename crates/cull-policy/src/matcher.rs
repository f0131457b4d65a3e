//! Domain expression matching.
//!
//! Patterns support a single leading wildcard segment: `*.example.com`
//! matches `example.com` itself and any subdomain of it. A pattern without
//! a wildcard matches only the exact domain. Matching is case-insensitive.
//! Malformed patterns never match and never panic.

/// Returns true if `domain` matches the wildcard `pattern`.
#[must_use]
pub fn matches(pattern: &str, domain: &str) -> bool {
    let pattern = pattern.trim();
    if pattern.is_empty() || domain.is_empty() {
        return false;
    }

    let domain = domain.to_ascii_lowercase();

    if let Some(suffix) = pattern.strip_prefix("*.") {
        // Interior or repeated wildcards are malformed, as is a bare `*.`.
        if suffix.is_empty() || suffix.contains('*') {
            return false;
        }
        let suffix = suffix.to_ascii_lowercase();
        domain == suffix || domain.ends_with(&format!(".{suffix}"))
    } else if pattern.contains('*') {
        false
    } else {
        domain == pattern.to_ascii_lowercase()
    }
}
