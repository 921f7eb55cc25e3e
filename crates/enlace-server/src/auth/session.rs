// In-memory session store
// Decision: Opaque random tokens held server-side, not signed claims; a
// deleted entry is revoked immediately, and nothing is trusted client-side
// Decision: Lazy expiry only; entries are evicted on the lookup that finds
// them expired, never by a background sweep
//
// The store is an owned object injected through app state, so tests run
// against isolated instances. All sessions are lost on process restart,
// forcing re-login after a deploy.

use chrono::{DateTime, Duration, Utc};
use enlace_core::UserRole;
use parking_lot::RwLock;
use rand::Rng;
use std::collections::HashMap;
use uuid::Uuid;

/// A live login: who, with what privilege snapshot, until when.
///
/// `role` is copied from the user at login time. The auth gateway re-derives
/// privilege from the live user row on every request, so this snapshot is
/// informational rather than authoritative.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub role: UserRole,
    pub expires_at: DateTime<Utc>,
}

/// Token -> session map shared by every in-flight request. All three
/// operations take the write lock, so the expired check-and-remove in `get`
/// cannot interleave with a concurrent `create` or `delete`.
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::hours(24)),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a session and return its token: 32 random bytes (256 bits of
    /// entropy), hex-encoded. Collisions are not defended against; the
    /// randomness source makes them astronomically improbable.
    pub fn create(&self, user_id: Uuid, role: UserRole) -> String {
        let bytes: [u8; 32] = rand::thread_rng().gen();
        let token = hex::encode(bytes);
        let session = Session {
            user_id,
            role,
            expires_at: Utc::now() + self.ttl,
        };
        self.sessions.write().insert(token.clone(), session);
        token
    }

    /// Look up a token. A session found at or past its expiry instant is
    /// removed as a side effect and reported absent, so a successful lookup
    /// always observes an expiry in the future.
    pub fn get(&self, token: &str) -> Option<Session> {
        let mut sessions = self.sessions.write();
        match sessions.get(token) {
            Some(session) if Utc::now() < session.expires_at => Some(session.clone()),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    /// Unconditional removal; absent tokens are a no-op.
    pub fn delete(&self, token: &str) {
        self.sessions.write().remove(token);
    }
}
