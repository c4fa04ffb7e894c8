//! Cookie validation.
//!
//! Rules run in a fixed order and the first failing rule is reported:
//!
//! 1. key characters are `[A-Za-z0-9_-]`
//! 2. key does not carry a reserved prefix itself
//! 3. value has none of `" , ; : \`, no control characters and no
//!    leading or trailing whitespace
//! 4. `Secure` needs a secure page
//! 5. `__Secure-` needs a secure page and `Secure`
//! 6. `__Host-` needs `Secure`, no `Domain` and `Path=/`
//! 7. `SameSite=None` needs `Secure`
//! 8. a numeric expiration is at least one second
//! 9. `Path` starts with `/`; `Path` and `Domain` cannot break out of
//!    their attribute
//! 10. `Domain` is not a public suffix and matches the page host

use url::Url;

use crate::base::error::CookieError;
use crate::cookies::psl;
use crate::cookies::record::{CookiePrefix, CookieRecord, Expiration, SameSite};

/// Characters a cookie value may not contain.
pub const RESERVED_VALUE_CHARS: [char; 5] = ['"', ',', ';', ':', '\\'];

/// The page a cookie is being set from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    /// Whether the page was loaded over a secure transport.
    pub secure: bool,
    /// Page host, used to check the `Domain` attribute.
    pub host: Option<String>,
}

impl Default for PageContext {
    fn default() -> Self {
        Self::secure()
    }
}

impl PageContext {
    /// A secure page with an unknown host.
    pub fn secure() -> Self {
        Self {
            secure: true,
            host: None,
        }
    }

    /// An insecure (`http:`) page with an unknown host.
    pub fn insecure() -> Self {
        Self {
            secure: false,
            host: None,
        }
    }

    /// Only `http:` pages are insecure.
    pub fn from_url(url: &Url) -> Self {
        Self {
            secure: url.scheme() != "http",
            host: url.host_str().map(str::to_lowercase),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }
}

pub(crate) fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

pub(crate) fn is_value_char(c: char) -> bool {
    !RESERVED_VALUE_CHARS.contains(&c)
}

/// Stores and the parser trim both ends, so such values would not survive.
fn is_valid_value(value: &str) -> bool {
    value.trim() == value && value.chars().all(|c| is_value_char(c) && !c.is_control())
}

pub(crate) fn is_valid_path(path: &str) -> bool {
    path.starts_with('/') && !path.chars().any(|c| c == ';' || c.is_control())
}

pub(crate) fn is_valid_domain(domain: &str) -> bool {
    !domain.is_empty()
        && !domain
            .chars()
            .any(|c| c == ';' || c.is_whitespace() || c.is_control())
}

/// Validate `record` for writing from `page`.
pub fn validate(record: &CookieRecord, page: &PageContext) -> Result<(), CookieError> {
    if record.key.is_empty() || !record.key.chars().all(is_key_char) {
        return Err(CookieError::InvalidKey {
            key: record.key.clone(),
        });
    }

    if CookiePrefix::of(&record.key).is_some() {
        return Err(CookieError::ReservedKeyPrefix {
            key: record.key.clone(),
        });
    }

    if !is_valid_value(&record.value) {
        return Err(CookieError::InvalidValue {
            value: record.value.clone(),
        });
    }

    if record.secure && !page.secure {
        return Err(CookieError::SecureRequiresHttps);
    }

    match record.prefix {
        Some(prefix @ CookiePrefix::Secure) => {
            if !page.secure {
                return Err(CookieError::PrefixRequiresHttps {
                    prefix: prefix.as_str(),
                });
            }
            if !record.secure {
                return Err(CookieError::PrefixRequiresSecure {
                    prefix: prefix.as_str(),
                });
            }
        }
        Some(prefix @ CookiePrefix::Host) => {
            if !record.secure {
                return Err(CookieError::PrefixRequiresSecure {
                    prefix: prefix.as_str(),
                });
            }
            if record.domain.is_some() {
                return Err(CookieError::HostPrefixWithDomain);
            }
            if record.path.as_deref() != Some("/") {
                return Err(CookieError::HostPrefixPath);
            }
        }
        None => {}
    }

    if record.same_site == Some(SameSite::None) && !record.secure {
        return Err(CookieError::SameSiteNoneRequiresSecure);
    }

    if let Some(Expiration::MaxAge(max_age)) = record.expire {
        let seconds = max_age.whole_seconds();
        if seconds <= 0 {
            return Err(CookieError::NonPositiveExpiration { seconds });
        }
    }

    if let Some(path) = &record.path {
        if !is_valid_path(path) {
            return Err(CookieError::InvalidPath { path: path.clone() });
        }
    }

    if let Some(domain) = &record.domain {
        if !is_valid_domain(domain) {
            return Err(CookieError::InvalidDomain {
                domain: domain.clone(),
            });
        }
        psl::check_cookie_domain(domain, page.host.as_deref())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn secure_page() -> PageContext {
        PageContext::secure()
    }

    #[test]
    fn test_accepts_plain_cookie() {
        let record = CookieRecord::new("session_id", "abc-123 xyz");
        assert_eq!(validate(&record, &PageContext::insecure()), Ok(()));
    }

    #[test]
    fn test_rejects_invalid_key_characters() {
        for key in ["", "a b", "a=b", "é", "a.b"] {
            let err = validate(&CookieRecord::new(key, "v"), &secure_page()).unwrap_err();
            assert!(matches!(err, CookieError::InvalidKey { .. }), "key {key:?}");
        }
    }

    #[test]
    fn test_rejects_reserved_prefix_in_key() {
        let err = validate(&CookieRecord::new("__Secure-foo", "v"), &secure_page()).unwrap_err();
        assert_eq!(
            err,
            CookieError::ReservedKeyPrefix {
                key: "__Secure-foo".to_string()
            }
        );

        let err = validate(&CookieRecord::new("__Host-foo", "v"), &secure_page()).unwrap_err();
        assert!(matches!(err, CookieError::ReservedKeyPrefix { .. }));
    }

    #[test]
    fn test_rejects_reserved_value_characters() {
        for value in ["a\"b", "a,b", "a;b", "a:b", "a\\b"] {
            let err = validate(&CookieRecord::new("k", value), &secure_page()).unwrap_err();
            assert!(matches!(err, CookieError::InvalidValue { .. }), "value {value:?}");
        }
    }

    #[test]
    fn test_rejects_control_characters_and_surrounding_whitespace() {
        for value in [" b", "b ", " b ", "\tb", "b\u{a0}", "a\nb", "a\u{7f}b", " "] {
            let err = validate(&CookieRecord::new("k", value), &secure_page()).unwrap_err();
            assert!(matches!(err, CookieError::InvalidValue { .. }), "value {value:?}");
        }
        assert!(validate(&CookieRecord::new("k", "a b\tc"), &secure_page()).is_err());
        assert_eq!(validate(&CookieRecord::new("k", "a b"), &secure_page()), Ok(()));
    }

    #[test]
    fn test_printable_ascii_values() {
        for c in (0x20u8..0x7f).map(char::from) {
            let value = format!("x{c}y");
            let accepted = validate(&CookieRecord::new("k", value.as_str()), &secure_page()).is_ok();
            assert_eq!(accepted, !RESERVED_VALUE_CHARS.contains(&c), "char {c:?}");
        }
    }

    #[test]
    fn test_path_cannot_inject_attributes() {
        let record = CookieRecord::new("a", "b").path("/; SameSite=None; Domain=com");
        assert_eq!(
            validate(&record, &secure_page()),
            Err(CookieError::InvalidPath {
                path: "/; SameSite=None; Domain=com".to_string()
            })
        );

        for path in ["", "app", "/a\nb", "/a\rSecure"] {
            let err = validate(&CookieRecord::new("a", "b").path(path), &secure_page()).unwrap_err();
            assert!(matches!(err, CookieError::InvalidPath { .. }), "path {path:?}");
        }
        assert_eq!(
            validate(&CookieRecord::new("a", "b").path("/app/v1"), &secure_page()),
            Ok(())
        );
    }

    #[test]
    fn test_domain_cannot_inject_attributes() {
        for domain in ["", "example.com; Domain=com", "example.com Secure", "exa\nmple.com"] {
            let err =
                validate(&CookieRecord::new("a", "b").domain(domain), &secure_page()).unwrap_err();
            assert!(matches!(err, CookieError::InvalidDomain { .. }), "domain {domain:?}");
        }
    }

    #[test]
    fn test_path_rule_follows_expiration_rule() {
        let record = CookieRecord::new("a", "b")
            .expire(Expiration::seconds(0))
            .path("bad");
        assert!(matches!(
            validate(&record, &secure_page()),
            Err(CookieError::NonPositiveExpiration { .. })
        ));
    }

    #[test]
    fn test_key_rule_wins_over_value_rule() {
        let err = validate(&CookieRecord::new("bad key", "bad;value"), &secure_page()).unwrap_err();
        assert!(matches!(err, CookieError::InvalidKey { .. }));
    }

    #[test]
    fn test_secure_requires_secure_page() {
        let record = CookieRecord::new("a", "b").secure(true);
        assert_eq!(
            validate(&record, &PageContext::insecure()),
            Err(CookieError::SecureRequiresHttps)
        );
        assert_eq!(validate(&record, &secure_page()), Ok(()));
    }

    #[test]
    fn test_secure_prefix() {
        let record = CookieRecord::new("a", "b").prefix(CookiePrefix::Secure);
        assert_eq!(
            validate(&record, &PageContext::insecure()),
            Err(CookieError::PrefixRequiresHttps { prefix: "__Secure-" })
        );
        assert_eq!(
            validate(&record, &secure_page()),
            Err(CookieError::PrefixRequiresSecure { prefix: "__Secure-" })
        );
        assert_eq!(validate(&record.secure(true), &secure_page()), Ok(()));
    }

    #[test]
    fn test_host_prefix() {
        let base = CookieRecord::new("a", "b").prefix(CookiePrefix::Host);

        assert_eq!(
            validate(&base.clone().path("/"), &secure_page()),
            Err(CookieError::PrefixRequiresSecure { prefix: "__Host-" })
        );
        assert_eq!(
            validate(
                &base.clone().secure(true).path("/").domain("example.com"),
                &secure_page()
            ),
            Err(CookieError::HostPrefixWithDomain)
        );
        assert_eq!(
            validate(&base.clone().secure(true), &secure_page()),
            Err(CookieError::HostPrefixPath)
        );
        assert_eq!(
            validate(&base.clone().secure(true).path("/app"), &secure_page()),
            Err(CookieError::HostPrefixPath)
        );
        assert_eq!(validate(&base.secure(true).path("/"), &secure_page()), Ok(()));
    }

    #[test]
    fn test_same_site_none_requires_secure() {
        let record = CookieRecord::new("a", "b").same_site(SameSite::None);
        assert_eq!(
            validate(&record, &secure_page()),
            Err(CookieError::SameSiteNoneRequiresSecure)
        );
        assert_eq!(validate(&record.secure(true), &secure_page()), Ok(()));
    }

    #[test]
    fn test_non_positive_expiration() {
        let zero = CookieRecord::new("a", "b").expire(Expiration::seconds(0));
        assert_eq!(
            validate(&zero, &secure_page()),
            Err(CookieError::NonPositiveExpiration { seconds: 0 })
        );

        let negative = CookieRecord::new("a", "b").expire(Expiration::seconds(-5));
        assert_eq!(
            validate(&negative, &secure_page()),
            Err(CookieError::NonPositiveExpiration { seconds: -5 })
        );

        let sub_second = CookieRecord::new("a", "b").max_age(Duration::milliseconds(500));
        assert!(validate(&sub_second, &secure_page()).is_err());

        let session = CookieRecord::new("a", "b").expire(Expiration::Session);
        assert_eq!(validate(&session, &secure_page()), Ok(()));
    }

    #[test]
    fn test_domain_checks_run_last() {
        let record = CookieRecord::new("a", "b").domain("com");
        assert!(matches!(
            validate(&record, &secure_page()),
            Err(CookieError::PublicSuffixDomain { .. })
        ));

        let page = PageContext::secure().with_host("example.com");
        let record = CookieRecord::new("a", "b").domain("other.org");
        assert!(matches!(
            validate(&record, &page),
            Err(CookieError::DomainMismatch { .. })
        ));

        let record = CookieRecord::new("a", "b").domain("example.com");
        assert_eq!(validate(&record, &page), Ok(()));
    }

    #[test]
    fn test_page_context_from_url() {
        let page = PageContext::from_url(&Url::parse("http://Example.com/a").unwrap());
        assert!(!page.secure);
        assert_eq!(page.host.as_deref(), Some("example.com"));

        let page = PageContext::from_url(&Url::parse("https://example.com").unwrap());
        assert!(page.secure);

        let page = PageContext::from_url(&Url::parse("file:///tmp/index.html").unwrap());
        assert!(page.secure);
        assert_eq!(page.host, None);
    }
}
