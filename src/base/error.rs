use thiserror::Error;

/// Every way a cookie operation can be rejected.
///
/// Validation variants are listed in the order the validator checks them.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CookieError {
    // Validation errors
    #[error("Invalid key characters in '{key}': only [A-Za-z0-9_-] are allowed")]
    InvalidKey { key: String },
    #[error("Key '{key}' starts with a reserved prefix, use the prefix field instead")]
    ReservedKeyPrefix { key: String },
    #[error("Invalid value characters in {value:?}: '\"' ',' ';' ':' '\\', control characters and surrounding whitespace are not allowed")]
    InvalidValue { value: String },
    #[error("Secure requires an HTTPS context")]
    SecureRequiresHttps,
    #[error("The '{prefix}' prefix requires an HTTPS context")]
    PrefixRequiresHttps { prefix: &'static str },
    #[error("The '{prefix}' prefix requires the secure attribute")]
    PrefixRequiresSecure { prefix: &'static str },
    #[error("The '__Host-' prefix forbids a domain attribute")]
    HostPrefixWithDomain,
    #[error("The '__Host-' prefix requires path to be '/'")]
    HostPrefixPath,
    #[error("SameSite=None requires the secure attribute")]
    SameSiteNoneRequiresSecure,
    #[error("Negative expiration not allowed ({seconds}s)")]
    NonPositiveExpiration { seconds: i64 },
    #[error("Invalid path {path:?}: must start with '/' and contain no ';' or control characters")]
    InvalidPath { path: String },
    #[error("Invalid domain {domain:?}: must be non-empty and contain no ';', whitespace or control characters")]
    InvalidDomain { domain: String },
    #[error("Cookie domain '{domain}' is a public suffix")]
    PublicSuffixDomain { domain: String },
    #[error("Cookie domain '{domain}' does not match page host '{host}'")]
    DomainMismatch { domain: String, host: String },

    // Lookup errors
    #[error("Cookie '{key}' doesn't exist")]
    NotFound { key: String },

    // Store and configuration errors
    #[error("Cookie store {path} failed: {message}")]
    Store { path: String, message: String },
    #[error("Invalid cookie manager configuration: {message}")]
    InvalidConfig { message: String },
}

impl CookieError {
    pub fn not_found(key: impl Into<String>) -> Self {
        CookieError::NotFound { key: key.into() }
    }

    pub fn store(path: impl Into<String>, message: impl Into<String>) -> Self {
        CookieError::Store {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        CookieError::InvalidConfig {
            message: message.into(),
        }
    }

    /// True for every error raised by the validator.
    pub fn is_validation(&self) -> bool {
        (-1099..=-1000).contains(&self.as_i32())
    }

    /// Stable numeric code for the error.
    ///
    /// Validation errors live in `-1000..=-1099`, lookup errors in
    /// `-1100..=-1199`, store and config errors in `-1200..=-1299`.
    pub fn as_i32(&self) -> i32 {
        match self {
            CookieError::InvalidKey { .. } => -1000,
            CookieError::ReservedKeyPrefix { .. } => -1001,
            CookieError::InvalidValue { .. } => -1002,
            CookieError::SecureRequiresHttps => -1003,
            CookieError::PrefixRequiresHttps { .. } => -1004,
            CookieError::PrefixRequiresSecure { .. } => -1005,
            CookieError::HostPrefixWithDomain => -1006,
            CookieError::HostPrefixPath => -1007,
            CookieError::SameSiteNoneRequiresSecure => -1008,
            CookieError::NonPositiveExpiration { .. } => -1009,
            CookieError::PublicSuffixDomain { .. } => -1010,
            CookieError::DomainMismatch { .. } => -1011,
            CookieError::InvalidPath { .. } => -1012,
            CookieError::InvalidDomain { .. } => -1013,
            CookieError::NotFound { .. } => -1100,
            CookieError::Store { .. } => -1200,
            CookieError::InvalidConfig { .. } => -1201,
        }
    }
}

impl From<serde_json::Error> for CookieError {
    fn from(err: serde_json::Error) -> Self {
        CookieError::InvalidConfig {
            message: err.to_string(),
        }
    }
}
