//! Cookie persistence - save and load cookies to/from disk.
//!
//! Provides JSON-based persistence for [`MemoryCookieStore`] and a
//! [`FileCookieStore`] that keeps no state between calls, so several
//! processes can share one jar file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

use crate::base::context::IoResultExt;
use crate::base::error::CookieError;
use crate::cookies::record::SameSite;
use crate::cookies::store::{CookieStore, MemoryCookieStore, StoredCookie};

/// Serializable representation of a cookie for persistence.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct PersistentCookie {
    name: String,
    value: String,
    domain: Option<String>,
    path: String,
    secure: bool,
    same_site: Option<SameSite>,
    expires_unix_secs: Option<i64>,
    sequence: u64,
}

/// Save the cookies of a jar to a file.
///
/// # Example
/// ```ignore
/// persistence::save_cookies(&jar, Path::new("/path/to/cookies.json"))?;
/// ```
pub fn save_cookies(jar: &MemoryCookieStore, path: &Path) -> io::Result<()> {
    let all_cookies: Vec<PersistentCookie> = jar
        .cookies()
        .into_iter()
        .map(|cookie| PersistentCookie {
            expires_unix_secs: cookie.expires.map(|t| t.unix_timestamp()),
            name: cookie.name,
            value: cookie.value,
            domain: cookie.domain,
            path: cookie.path,
            secure: cookie.secure,
            same_site: cookie.same_site,
            sequence: cookie.sequence,
        })
        .collect();

    let json = serde_json::to_string_pretty(&all_cookies)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    fs::write(path, json)
}

/// Load cookies from a file into a new jar. Expired cookies are skipped.
pub fn load_cookies(path: &Path, secure_origin: bool) -> io::Result<MemoryCookieStore> {
    let json = fs::read_to_string(path)?;
    let persistent_cookies: Vec<PersistentCookie> =
        serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let jar = MemoryCookieStore::with_secure_origin(secure_origin);
    let now = OffsetDateTime::now_utc();

    for pc in persistent_cookies {
        let expires = match pc.expires_unix_secs {
            Some(secs) => match OffsetDateTime::from_unix_timestamp(secs) {
                Ok(expires) => Some(expires),
                Err(_) => continue,
            },
            None => None,
        };

        let cookie = StoredCookie {
            name: pc.name,
            value: pc.value,
            domain: pc.domain,
            path: pc.path,
            secure: pc.secure,
            same_site: pc.same_site,
            expires,
            sequence: pc.sequence,
        };

        if cookie.is_expired(now) {
            continue;
        }
        jar.restore(cookie);
    }

    Ok(jar)
}

/// A cookie store backed by a JSON file.
///
/// Every read and write goes to disk; nothing is cached, so changes made
/// by other processes are picked up on the next call.
#[derive(Debug, Clone)]
pub struct FileCookieStore {
    path: PathBuf,
    secure_origin: bool,
}

impl FileCookieStore {
    /// A store for a secure origin. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            secure_origin: true,
        }
    }

    pub fn secure_origin(mut self, secure_origin: bool) -> Self {
        self.secure_origin = secure_origin;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<MemoryCookieStore, CookieError> {
        match load_cookies(&self.path, self.secure_origin) {
            Ok(jar) => Ok(jar),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Ok(MemoryCookieStore::with_secure_origin(self.secure_origin))
            }
            Err(e) => Err::<MemoryCookieStore, _>(e).store_context(&self.path),
        }
    }
}

impl CookieStore for FileCookieStore {
    fn read(&self) -> Result<String, CookieError> {
        self.load()?.read()
    }

    fn write(&self, attributes: &str) -> Result<(), CookieError> {
        let jar = self.load()?;
        jar.write(attributes)?;
        save_cookies(&jar, &self.path).store_context(&self.path)?;
        tracing::debug!(path = %self.path.display(), count = jar.len(), "cookie jar saved");
        Ok(())
    }
}
