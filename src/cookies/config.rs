//! Cookie manager configuration.

use serde::Deserialize;
use std::path::Path;

use crate::base::context::IoResultExt;
use crate::base::error::CookieError;
use crate::cookies::record::SameSite;
use crate::cookies::validator::is_valid_path;

/// Defaults applied when a record leaves an attribute unset.
///
/// Loadable from JSON; missing fields keep their defaults:
///
/// ```
/// use cookiemanager::cookies::config::ManagerConfig;
/// use cookiemanager::cookies::record::SameSite;
///
/// let config = ManagerConfig::from_json(r#"{ "default_same_site": "Strict" }"#)?;
/// assert_eq!(config.default_same_site, SameSite::Strict);
/// assert_eq!(config.default_path, "/");
/// # Ok::<(), cookiemanager::base::error::CookieError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManagerConfig {
    /// `SameSite` written when the record has none.
    pub default_same_site: SameSite,
    /// `Path` written when the record has none.
    pub default_path: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            default_same_site: SameSite::Lax,
            default_path: "/".to_string(),
        }
    }
}

impl ManagerConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default SameSite value.
    pub fn default_same_site(mut self, same_site: SameSite) -> Self {
        self.default_same_site = same_site;
        self
    }

    /// Set the default path.
    pub fn default_path(mut self, path: impl Into<String>) -> Self {
        self.default_path = path.into();
        self
    }

    /// Parse a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, CookieError> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, CookieError> {
        let json = std::fs::read_to_string(path).store_context(path)?;
        Self::from_json(&json)
    }

    fn check(&self) -> Result<(), CookieError> {
        if !is_valid_path(&self.default_path) {
            return Err(CookieError::invalid_config(format!(
                "default_path {:?} must start with '/' and contain no ';' or control characters",
                self.default_path
            )));
        }
        if self.default_same_site == SameSite::None {
            return Err(CookieError::invalid_config(
                "default_same_site cannot be None: it would require every cookie to be Secure",
            ));
        }
        Ok(())
    }
}
