use axum::extract::FromRef;
use sha2::{Digest, Sha256};

use crate::state::AppState;

/// Deterministic keyed digest used for stored passwords and for deriving
/// activation codes from user ids.
///
/// Login and activation compare `hash(candidate)` against the stored value
/// with plain string equality. No per-password salt and no constant-time
/// compare; both are accepted weaknesses of this scheme, documented rather
/// than patched here.
#[derive(Clone)]
pub struct CredentialHasher {
    secret: String,
}

impl CredentialHasher {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn hash(&self, plain: &str) -> String {
        let mut digest = Sha256::new();
        digest.update(self.secret.as_bytes());
        digest.update(plain.as_bytes());
        hex::encode(digest.finalize())
    }

    /// Fails closed: an empty candidate or an empty stored value never matches.
    pub fn matches(&self, candidate: &str, stored: &str) -> bool {
        if candidate.is_empty() || stored.is_empty() {
            return false;
        }
        self.hash(candidate) == stored
    }
}

impl FromRef<AppState> for CredentialHasher {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.config.auth.secret.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> CredentialHasher {
        CredentialHasher::new("test-secret")
    }

    #[test]
    fn hash_is_deterministic() {
        let h = hasher();
        assert_eq!(h.hash("Password1"), h.hash("Password1"));
    }

    #[test]
    fn distinct_inputs_yield_distinct_hashes() {
        let h = hasher();
        let corpus = [
            "Password1",
            "Password2",
            "password1",
            "Password1 ",
            "hunter22A",
            "correct-Horse-battery-staple-9",
            "a",
            "A",
        ];
        for (i, a) in corpus.iter().enumerate() {
            for b in corpus.iter().skip(i + 1) {
                assert_ne!(h.hash(a), h.hash(b), "collision between {a:?} and {b:?}");
            }
        }
    }

    #[test]
    fn hash_depends_on_secret() {
        let a = CredentialHasher::new("secret-a");
        let b = CredentialHasher::new("secret-b");
        assert_ne!(a.hash("Password1"), b.hash("Password1"));
    }

    #[test]
    fn matches_roundtrip() {
        let h = hasher();
        let stored = h.hash("Password1");
        assert!(h.matches("Password1", &stored));
        assert!(!h.matches("Password2", &stored));
    }

    #[tokio::test]
    async fn hasher_from_app_state_uses_the_configured_secret() {
        let state = crate::state::AppState::fake();
        let h = CredentialHasher::from_ref(&state);
        assert_eq!(h.hash("Password1"), hasher().hash("Password1"));
    }

    #[test]
    fn empty_input_fails_closed() {
        let h = hasher();
        let stored = h.hash("Password1");
        assert!(!h.matches("", &stored));
        assert!(!h.matches("Password1", ""));
        // even the digest of the empty string must not match an empty candidate
        let empty_stored = h.hash("");
        assert!(!h.matches("", &empty_stored));
    }
}
