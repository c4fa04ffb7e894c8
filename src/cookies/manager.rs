//! Cookie operations over one [`CookieStore`].
//!
//! [`CookieManager`] ties the validator, serializer and parser to a store:
//! writes go validate, serialize, write; reads go read, parse, filter.

use std::collections::HashSet;

use crate::base::error::CookieError;
use crate::cookies::config::ManagerConfig;
use crate::cookies::parser;
use crate::cookies::record::{CookieRecord, DocumentCookie};
use crate::cookies::serializer;
use crate::cookies::store::CookieStore;
use crate::cookies::validator::{self, is_valid_domain, is_valid_path, PageContext};

/// Manage the cookies of one page through its cookie store.
///
/// Every call reads the store afresh; nothing is cached, so writes made
/// through other managers sharing the store are always visible.
///
/// # Example
/// ```
/// use cookiemanager::cookies::manager::CookieManager;
/// use cookiemanager::cookies::record::{CookieRecord, Expiration};
/// use cookiemanager::cookies::store::MemoryCookieStore;
///
/// let manager = CookieManager::new(MemoryCookieStore::new());
/// manager.set(&CookieRecord::new("theme", "dark").expire(Expiration::days(30)))?;
///
/// assert_eq!(manager.get("theme")?.value, "dark");
/// manager.remove("theme")?;
/// assert!(manager.all()?.is_empty());
/// # Ok::<(), cookiemanager::base::error::CookieError>(())
/// ```
pub struct CookieManager<S> {
    store: S,
    page: PageContext,
    config: ManagerConfig,
}

impl<S: CookieStore> CookieManager<S> {
    /// A manager for a secure page with the default config.
    pub fn new(store: S) -> Self {
        Self {
            store,
            page: PageContext::default(),
            config: ManagerConfig::default(),
        }
    }

    pub fn with_page(mut self, page: PageContext) -> Self {
        self.page = page;
        self
    }

    pub fn with_config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Check `record` against this page without writing it.
    pub fn validate(&self, record: &CookieRecord) -> Result<(), CookieError> {
        validator::validate(record, &self.page)
    }

    /// Validate and serialize `record` without writing it.
    pub fn serialize(&self, record: &CookieRecord) -> Result<String, CookieError> {
        self.validate(record)?;
        Ok(serializer::serialize_with(record, &self.config))
    }

    /// Validate, serialize and write `record`.
    ///
    /// Returns the pair as it will be read back, its key carrying the prefix.
    pub fn set(&self, record: &CookieRecord) -> Result<DocumentCookie, CookieError> {
        let attributes = match self.serialize(record) {
            Ok(attributes) => attributes,
            Err(e) => {
                tracing::debug!(key = %record.key, error = %e, "cookie rejected");
                return Err(e);
            }
        };

        self.store.write(&attributes)?;
        tracing::debug!(key = %record.full_name(), "cookie written");

        Ok(record.document_cookie())
    }

    /// The first visible cookie named `key`.
    pub fn get(&self, key: &str) -> Result<DocumentCookie, CookieError> {
        self.all()?
            .into_iter()
            .find(|cookie| cookie.key == key)
            .ok_or_else(|| CookieError::not_found(key))
    }

    /// Every visible cookie, in store order.
    pub fn all(&self) -> Result<Vec<DocumentCookie>, CookieError> {
        Ok(parser::parse(&self.store.read()?))
    }

    /// Names of every visible cookie, in store order.
    pub fn keys(&self) -> Result<Vec<String>, CookieError> {
        Ok(self.all()?.into_iter().map(|cookie| cookie.key).collect())
    }

    pub fn exist(&self, key: &str) -> Result<bool, CookieError> {
        Ok(self.all()?.iter().any(|cookie| cookie.key == key))
    }

    pub fn not_exist(&self, key: &str) -> Result<bool, CookieError> {
        self.exist(key).map(|exists| !exists)
    }

    /// Delete `key` set with the default domain and path.
    ///
    /// Fails with [`CookieError::NotFound`] when no such cookie is visible.
    pub fn remove(&self, key: &str) -> Result<(), CookieError> {
        self.remove_scoped(key, None, None)
    }

    /// Delete `key` set with an explicit domain and/or path.
    pub fn remove_scoped(
        &self,
        key: &str,
        domain: Option<&str>,
        path: Option<&str>,
    ) -> Result<(), CookieError> {
        if let Some(path) = path.filter(|p| !is_valid_path(p)) {
            return Err(CookieError::InvalidPath {
                path: path.to_string(),
            });
        }
        if let Some(domain) = domain.filter(|d| !is_valid_domain(d)) {
            return Err(CookieError::InvalidDomain {
                domain: domain.to_string(),
            });
        }

        let cookie = self.get(key)?;
        self.store.write(&serializer::serialize_removal(
            &cookie.key,
            domain,
            path,
            &self.config,
        ))?;
        tracing::debug!(key = %cookie.key, "cookie removed");
        Ok(())
    }

    /// Delete every visible cookie in the default scope, returning how
    /// many are actually gone afterwards.
    ///
    /// Deletion writes use the default domain and path, so a cookie set
    /// with a custom `path` or `domain` survives and is not counted; use
    /// [`remove_scoped`](Self::remove_scoped) for those. Cookies that
    /// vanish before their turn (removed by another manager sharing the
    /// store) are skipped.
    pub fn clear(&self) -> Result<usize, CookieError> {
        let mut removed = 0;
        let mut seen = HashSet::new();

        for key in self.keys()? {
            if !seen.insert(key.clone()) {
                continue;
            }

            let before = self.count(&key)?;
            if before == 0 {
                tracing::debug!(key = %key, "cookie already gone during clear");
                continue;
            }

            match self.remove(&key) {
                Ok(()) => {}
                Err(CookieError::NotFound { .. }) => {
                    tracing::debug!(key = %key, "cookie already gone during clear");
                    continue;
                }
                Err(e) => return Err(e),
            }

            let after = self.count(&key)?;
            removed += before.saturating_sub(after);
            if after > 0 {
                tracing::warn!(key = %key, left = after, "cookie outside the default scope survived clear");
            }
        }

        Ok(removed)
    }

    fn count(&self, key: &str) -> Result<usize, CookieError> {
        Ok(self.all()?.iter().filter(|cookie| cookie.key == key).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::record::{CookiePrefix, Expiration, SameSite};
    use crate::cookies::store::MemoryCookieStore;
    use std::cell::RefCell;

    fn manager() -> CookieManager<MemoryCookieStore> {
        CookieManager::new(MemoryCookieStore::new())
    }

    #[test]
    fn test_set_then_get() {
        let m = manager();
        let written = m.set(&CookieRecord::new("a", "b")).unwrap();
        assert_eq!(written, DocumentCookie::new("a", "b"));
        assert_eq!(m.get("a").unwrap(), DocumentCookie::new("a", "b"));
    }

    #[test]
    fn test_set_returns_prefixed_key() {
        let m = manager();
        let record = CookieRecord::new("id", "1")
            .prefix(CookiePrefix::Host)
            .secure(true)
            .path("/");
        let written = m.set(&record).unwrap();
        assert_eq!(written.key, "__Host-id");
        assert!(m.exist("__Host-id").unwrap());
        assert!(m.not_exist("id").unwrap());
    }

    #[test]
    fn test_set_rejects_invalid_without_writing() {
        let m = manager();
        let err = m
            .set(&CookieRecord::new("a", "b").same_site(SameSite::None))
            .unwrap_err();
        assert_eq!(err, CookieError::SameSiteNoneRequiresSecure);
        assert!(m.store().is_empty());
    }

    #[test]
    fn test_get_missing() {
        assert_eq!(manager().get("nope"), Err(CookieError::not_found("nope")));
    }

    #[test]
    fn test_all_and_keys_on_empty_store() {
        let m = manager();
        assert!(m.all().unwrap().is_empty());
        assert!(m.keys().unwrap().is_empty());
        assert!(!m.exist("").unwrap());
    }

    #[test]
    fn test_keys_in_store_order() {
        let m = manager();
        m.set(&CookieRecord::new("first", "1")).unwrap();
        m.set(&CookieRecord::new("second", "2").expire(Expiration::seconds(60)))
            .unwrap();
        assert_eq!(m.keys().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_remove() {
        let m = manager();
        m.set(&CookieRecord::new("a", "b")).unwrap();
        m.remove("a").unwrap();
        assert!(m.not_exist("a").unwrap());
        assert_eq!(m.remove("a"), Err(CookieError::not_found("a")));
    }

    #[test]
    fn test_remove_scoped_path() {
        let m = manager();
        m.set(&CookieRecord::new("a", "b").path("/app")).unwrap();

        // Default-path deletion does not reach the /app cookie.
        m.remove("a").unwrap();
        assert!(m.exist("a").unwrap());

        m.remove_scoped("a", None, Some("/app")).unwrap();
        assert!(m.not_exist("a").unwrap());
    }

    #[test]
    fn test_remove_prefixed_cookie() {
        let m = manager();
        m.set(
            &CookieRecord::new("id", "1")
                .prefix(CookiePrefix::Secure)
                .secure(true),
        )
        .unwrap();
        m.remove("__Secure-id").unwrap();
        assert!(m.all().unwrap().is_empty());
    }

    #[test]
    fn test_clear() {
        let m = manager();
        m.set(&CookieRecord::new("a", "1")).unwrap();
        m.set(&CookieRecord::new("b", "2")).unwrap();
        assert_eq!(m.clear().unwrap(), 2);
        assert!(m.all().unwrap().is_empty());
        assert_eq!(m.clear().unwrap(), 0);
    }

    #[test]
    fn test_clear_counts_only_removed_cookies() {
        let m = manager();
        m.set(&CookieRecord::new("a", "1").path("/app")).unwrap();
        m.set(&CookieRecord::new("b", "2")).unwrap();

        assert_eq!(m.clear().unwrap(), 1);
        assert_eq!(m.all().unwrap(), vec![DocumentCookie::new("a", "1")]);

        m.remove_scoped("a", None, Some("/app")).unwrap();
        assert_eq!(m.clear().unwrap(), 0);
        assert!(m.all().unwrap().is_empty());
    }

    #[test]
    fn test_clear_with_shadowed_name() {
        let m = manager();
        m.set(&CookieRecord::new("a", "deep").path("/app")).unwrap();
        m.set(&CookieRecord::new("a", "root")).unwrap();

        assert_eq!(m.clear().unwrap(), 1);
        assert_eq!(m.all().unwrap(), vec![DocumentCookie::new("a", "deep")]);
    }

    #[test]
    fn test_set_refuses_attribute_injection() {
        let m = manager();
        let err = m
            .set(&CookieRecord::new("a", "b").path("/; SameSite=None; Domain=com"))
            .unwrap_err();
        assert!(matches!(err, CookieError::InvalidPath { .. }));
        assert!(m.store().is_empty());
    }

    #[test]
    fn test_remove_scoped_refuses_attribute_injection() {
        let m = manager();
        m.set(&CookieRecord::new("a", "b")).unwrap();
        assert!(matches!(
            m.remove_scoped("a", None, Some("/; Domain=com")),
            Err(CookieError::InvalidPath { .. })
        ));
        assert!(matches!(
            m.remove_scoped("a", Some("example.com; Path=/"), None),
            Err(CookieError::InvalidDomain { .. })
        ));
        assert!(m.exist("a").unwrap());
    }

    /// A store where another tab deletes `b` right after the first read.
    struct RacingStore {
        inner: MemoryCookieStore,
        reads: RefCell<usize>,
    }

    impl CookieStore for RacingStore {
        fn read(&self) -> Result<String, CookieError> {
            let mut reads = self.reads.borrow_mut();
            *reads += 1;
            if *reads == 2 {
                self.inner.write("b=; Max-Age=-1; Path=/")?;
            }
            self.inner.read()
        }

        fn write(&self, attributes: &str) -> Result<(), CookieError> {
            self.inner.write(attributes)
        }
    }

    #[test]
    fn test_clear_tolerates_concurrent_removal() {
        let store = RacingStore {
            inner: MemoryCookieStore::new(),
            reads: RefCell::new(0),
        };
        store.inner.write("a=1; Path=/").unwrap();
        store.inner.write("b=2; Path=/").unwrap();

        let m = CookieManager::new(store);
        assert_eq!(m.clear().unwrap(), 1);
        assert!(m.store().inner.is_empty());
    }

    #[test]
    fn test_insecure_page() {
        let m = CookieManager::new(MemoryCookieStore::with_secure_origin(false))
            .with_page(PageContext::insecure());
        assert_eq!(
            m.set(&CookieRecord::new("a", "b").secure(true)),
            Err(CookieError::SecureRequiresHttps)
        );
        m.set(&CookieRecord::new("a", "b")).unwrap();
        assert!(m.exist("a").unwrap());
    }

    #[test]
    fn test_serialize_uses_config() {
        let m = manager().with_config(ManagerConfig::new().default_same_site(SameSite::Strict));
        assert_eq!(
            m.serialize(&CookieRecord::new("a", "b")).unwrap(),
            "a=b; Max-Age=Session; Path=/; SameSite=Strict"
        );
        assert!(m.serialize(&CookieRecord::new("a;", "b")).is_err());
    }
}
