//! In-memory admin sessions keyed by random bearer tokens.

use licensor_store::AdminRecord;
use rand::RngCore;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "licensor_session";

/// Token length in bytes before hex encoding.
const TOKEN_BYTES: usize = 32;

/// A logged-in administrator.
#[derive(Debug, Clone)]
pub struct Session {
    pub admin_id: Uuid,
    pub username: String,
    expires_at: Instant,
}

impl Session {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Starts a session for `admin` and returns its token.
    pub async fn create(&self, admin: &AdminRecord) -> String {
        let token = generate_token();
        let now = Instant::now();
        let session = Session {
            admin_id: admin.id,
            username: admin.username.clone(),
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !s.is_expired(now));
        sessions.insert(token.clone(), session);
        token
    }

    /// Returns the live session for `token`, dropping it if expired.
    pub async fn get(&self, token: &str) -> Option<Session> {
        let now = Instant::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(s) if !s.is_expired(now) => return Some(s.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        self.sessions.write().await.remove(token);
        None
    }

    /// Ends the session. Returns false if there was none.
    pub async fn destroy(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
