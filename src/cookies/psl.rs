//! Public Suffix List (PSL) validation for cookie domain security.
//!
//! Rejects cookies whose `Domain` attribute is a public suffix like
//! `.com` or `.co.uk` (supercookies), and domains the page cannot set.
//!
//! Uses Mozilla's Public Suffix List via the `psl` crate.

use psl::{List, Psl};

use crate::base::error::CookieError;

/// Check if a domain is a listed public suffix (e.g., "com", "co.uk").
///
/// Unlisted single labels such as "localhost" are not treated as public
/// suffixes.
pub fn is_public_suffix(domain: &str) -> bool {
    let domain_lower = domain.trim_start_matches('.').to_lowercase();
    let domain_bytes = domain_lower.as_bytes();

    match List.suffix(domain_bytes) {
        Some(suffix) => suffix.is_known() && suffix.as_bytes() == domain_bytes,
        None => false,
    }
}

/// RFC 6265 domain matching: `host` equals `cookie_domain` or is a
/// subdomain of it. A leading dot on `cookie_domain` is ignored.
pub fn domain_matches(cookie_domain: &str, host: &str) -> bool {
    let cookie_domain = cookie_domain.trim_start_matches('.').to_lowercase();
    let host = host.to_lowercase();

    host == cookie_domain || host.ends_with(&format!(".{}", cookie_domain))
}

/// Check the `Domain` attribute of a cookie about to be set.
///
/// `host` is the page host when known; without it only the public suffix
/// check applies.
pub fn check_cookie_domain(domain: &str, host: Option<&str>) -> Result<(), CookieError> {
    if is_public_suffix(domain) {
        return Err(CookieError::PublicSuffixDomain {
            domain: domain.to_string(),
        });
    }

    if let Some(host) = host {
        if !domain_matches(domain, host) {
            return Err(CookieError::DomainMismatch {
                domain: domain.to_string(),
                host: host.to_string(),
            });
        }
    }

    Ok(())
}
