//! Client-side authentication state: one provider over the storage
//! abstraction, exposing {is_authenticated, login, logout}.

use std::sync::Arc;

use super::storage::Storage;

const TOKEN_KEY: &str = "auth_token";

#[derive(Clone)]
pub struct Session {
    storage: Arc<dyn Storage>,
}

impl Session {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY)
    }

    pub fn login(&self, token: &str) {
        self.storage.set(TOKEN_KEY, token);
    }

    pub fn logout(&self) {
        self.storage.remove(TOKEN_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::storage::MemoryStorage;

    fn session() -> Session {
        Session::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_starts_unauthenticated() {
        assert!(!session().is_authenticated());
    }

    #[test]
    fn test_login_logout_cycle() {
        let session = session();

        session.login("a.jwt.token");
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("a.jwt.token".into()));

        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
    }
}
