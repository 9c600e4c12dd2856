use std::io::{self, Write};
use std::sync::Arc;

use crate::{ApiRequest, CredentialStorage};

/// Decides whether the request behind `url` may proceed.
pub trait ApiAuthenticator {
    fn auth(&self, url: &str) -> bool;
}

/// Placeholder authenticator.
///
/// Prints the request descriptor and accepts every request. The credential
/// storage is held so a checking implementation can use it without changing
/// how callers construct or invoke the authenticator; this one never reads it.
pub struct DefaultApiAuthenticator<S: CredentialStorage> {
    storage: Arc<S>,
}

impl<S: CredentialStorage> DefaultApiAuthenticator<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Same as [`ApiAuthenticator::auth`] but writes the descriptor to `out`.
    pub fn auth_with_output<W: Write>(&self, url: &str, out: &mut W) -> bool {
        let request = ApiRequest::from_url(url);
        tracing::debug!(url = request.url(), app_id = ?request.app_id(), "accepting api request without a credential check");
        // Output is best effort, the verdict does not depend on it.
        let _ = write!(out, "{request}");
        let _ = out.flush();
        true
    }
}

impl<S: CredentialStorage> ApiAuthenticator for DefaultApiAuthenticator<S> {
    fn auth(&self, url: &str) -> bool {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.auth_with_output(url, &mut out)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::{AuthError, MemoryCredentialStorage};

    #[derive(Default)]
    struct CountingStorage {
        lookups: AtomicUsize,
    }

    impl CredentialStorage for CountingStorage {
        fn password_by_app_id(&self, _app_id: &str) -> Result<Option<String>, AuthError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Err(AuthError::Storage("unreachable backend".to_string()))
        }
    }

    /// Routes trait calls to an in-memory buffer instead of stdout.
    struct Captured<S: CredentialStorage> {
        inner: DefaultApiAuthenticator<S>,
        out: Mutex<Vec<u8>>,
    }

    impl<S: CredentialStorage> ApiAuthenticator for Captured<S> {
        fn auth(&self, url: &str) -> bool {
            let mut out = self.out.lock().expect("buffer lock");
            self.inner.auth_with_output(url, &mut *out)
        }
    }

    fn authorize(authenticator: &dyn ApiAuthenticator, url: &str) -> bool {
        authenticator.auth(url)
    }

    #[test]
    fn accepts_every_url() {
        let authenticator = DefaultApiAuthenticator::new(Arc::new(MemoryCredentialStorage::new()));
        for url in [
            "",
            " ",
            "http://localhost:8080/api?app_id=a&token=t&ts=1",
            "definitely not a url",
            "?token=",
        ] {
            let mut out = Vec::new();
            assert!(authenticator.auth_with_output(url, &mut out), "{url:?}");
        }
    }

    #[test]
    fn trait_object_accepts_and_prints() {
        let captured = Captured {
            inner: DefaultApiAuthenticator::new(Arc::new(MemoryCredentialStorage::new())),
            out: Mutex::new(Vec::new()),
        };
        assert!(authorize(&captured, "http://localhost/trait-path"));
        assert!(authorize(&captured, ""));

        let printed = String::from_utf8(captured.out.into_inner().expect("buffer")).expect("utf8");
        assert!(printed.starts_with("{http://localhost/trait-path"), "{printed:?}");
    }

    #[test]
    fn output_contains_url() {
        let authenticator = DefaultApiAuthenticator::new(Arc::new(MemoryCredentialStorage::new()));
        for url in ["", "https://example.com/orders?app_id=shop&token=abc&ts=42", "ünïcødé/path"] {
            let mut out = Vec::new();
            authenticator.auth_with_output(url, &mut out);
            let printed = String::from_utf8(out).expect("utf8");
            assert!(printed.contains(url), "{printed:?} lacks {url:?}");
            assert!(!printed.ends_with('\n'));
        }
    }

    #[test]
    fn storage_is_never_consulted() {
        let storage = Arc::new(CountingStorage::default());
        let authenticator = DefaultApiAuthenticator::new(storage.clone());

        let mut out = Vec::new();
        assert!(authenticator.auth_with_output("http://h/p?app_id=a&token=t&ts=1", &mut out));
        assert_eq!(storage.lookups.load(Ordering::SeqCst), 0);
        assert!(Arc::ptr_eq(authenticator.storage(), &storage));
    }
}
