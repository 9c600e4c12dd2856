use std::collections::HashMap;
use std::sync::RwLock;

use crate::AuthError;

/// Lookup of the shared secret an application authenticates with.
pub trait CredentialStorage: Send + Sync {
    /// Return the password stored for `app_id`, if any.
    fn password_by_app_id(&self, app_id: &str) -> Result<Option<String>, AuthError>;
}

/// In-process credential table, mostly useful for tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryCredentialStorage {
    passwords: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or replace) the password for `app_id`.
    ///
    /// Fails with [`AuthError::Storage`] once a writer has panicked while
    /// holding the table, same as lookups.
    pub fn insert(
        &self,
        app_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<(), AuthError> {
        let mut passwords = self
            .passwords
            .write()
            .map_err(|err| AuthError::Storage(err.to_string()))?;
        passwords.insert(app_id.into(), password.into());
        Ok(())
    }
}

impl CredentialStorage for MemoryCredentialStorage {
    fn password_by_app_id(&self, app_id: &str) -> Result<Option<String>, AuthError> {
        let passwords = self
            .passwords
            .read()
            .map_err(|err| AuthError::Storage(err.to_string()))?;
        Ok(passwords.get(app_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_inserted_password() {
        let storage = MemoryCredentialStorage::new();
        storage.insert("app-1", "secret").expect("insert");
        storage.insert("app-1", "rotated").expect("insert");

        assert_eq!(
            storage.password_by_app_id("app-1").expect("lookup"),
            Some("rotated".to_string())
        );
        assert_eq!(storage.password_by_app_id("app-2").expect("lookup"), None);
    }

    #[test]
    fn poisoned_table_fails_reads_and_writes_alike() {
        let storage = MemoryCredentialStorage::new();
        storage.insert("app-1", "secret").expect("insert");

        let poisoned = std::panic::catch_unwind(|| {
            let _guard = storage.passwords.write().expect("write lock");
            panic!("writer died holding the credential table");
        });
        assert!(poisoned.is_err());

        assert!(matches!(
            storage.password_by_app_id("app-1"),
            Err(AuthError::Storage(_))
        ));
        assert!(matches!(
            storage.insert("app-2", "other"),
            Err(AuthError::Storage(_))
        ));
    }
}
