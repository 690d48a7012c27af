use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::NamenodeError;

#[derive(Debug)]
struct UserRecord {
    salt: String,
    password_hash: String,
}

#[derive(Clone, Debug)]
struct Session {
    username: String,
    expires_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Credentials and live sessions. A user may hold any number of sessions,
/// each expiring on its own.
#[derive(Debug)]
pub struct UserRegistry {
    users: HashMap<String, UserRecord>,
    sessions: HashMap<String, Session>,
    session_ttl: TimeDelta,
    min_password_len: usize,
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl UserRegistry {
    pub fn new(session_ttl: TimeDelta, min_password_len: usize) -> Self {
        Self {
            users: HashMap::default(),
            sessions: HashMap::default(),
            session_ttl,
            min_password_len,
        }
    }

    pub fn register(&mut self, username: &str, password: &str) -> Result<(), NamenodeError> {
        if username.is_empty() || username.contains('/') || username.contains(char::is_whitespace)
        {
            return Err(NamenodeError::WeakCredentials(
                "username must be non empty without '/' or whitespace".to_string(),
            ));
        }
        if password.chars().count() < self.min_password_len {
            return Err(NamenodeError::WeakCredentials(format!(
                "password must be at least {} characters",
                self.min_password_len
            )));
        }
        if self.users.contains_key(username) {
            return Err(NamenodeError::AlreadyExists(format!("user {username}")));
        }
        let salt = uuid::Uuid::new_v4().simple().to_string();
        let password_hash = hash_password(&salt, password);
        self.users.insert(
            username.to_owned(),
            UserRecord {
                salt,
                password_hash,
            },
        );
        Ok(())
    }

    pub fn login(
        &mut self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedSession, NamenodeError> {
        let invalid = || NamenodeError::Unauthorized("invalid username or password".to_string());
        let record = self.users.get(username).ok_or_else(invalid)?;
        if hash_password(&record.salt, password) != record.password_hash {
            return Err(invalid());
        }
        let token = uuid::Uuid::new_v4().simple().to_string();
        let expires_at = now
            .checked_add_signed(self.session_ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.sessions.insert(
            token.clone(),
            Session {
                username: username.to_owned(),
                expires_at,
            },
        );
        Ok(IssuedSession { token, expires_at })
    }

    pub fn logout(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Owner of the session behind `token`.
    pub fn authenticate(&mut self, token: &str, now: DateTime<Utc>) -> Result<String, NamenodeError> {
        match self.sessions.get(token) {
            Some(session) if session.expires_at > now => Ok(session.username.clone()),
            Some(_) => {
                self.sessions.remove(token);
                Err(NamenodeError::Unauthorized("session expired".to_string()))
            }
            None => Err(NamenodeError::Unauthorized("invalid token".to_string())),
        }
    }

    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.expires_at > now);
        before - self.sessions.len()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> UserRegistry {
        UserRegistry::new(TimeDelta::hours(1), 6)
    }

    #[test]
    fn register_validates_and_rejects_duplicates() {
        let mut users = registry();
        assert!(matches!(users.register("", "secret1"), Err(NamenodeError::WeakCredentials(_))));
        assert!(matches!(users.register("a b", "secret1"), Err(NamenodeError::WeakCredentials(_))));
        assert!(matches!(users.register("alice", "123"), Err(NamenodeError::WeakCredentials(_))));
        users.register("alice", "secret1").unwrap();
        assert!(matches!(users.register("alice", "secret2"), Err(NamenodeError::AlreadyExists(_))));
        assert_eq!(users.user_count(), 1);
    }

    #[test]
    fn passwords_are_not_stored_in_clear() {
        let mut users = registry();
        users.register("alice", "secret1").unwrap();
        let record = users.users.get("alice").unwrap();
        assert_ne!(record.password_hash, "secret1");
        assert_eq!(record.password_hash.len(), 64);
    }

    #[test]
    fn sessions_are_independent_and_expire() {
        let mut users = registry();
        users.register("alice", "secret1").unwrap();
        let now = Utc::now();
        assert!(matches!(
            users.login("alice", "wrong-pass", now),
            Err(NamenodeError::Unauthorized(_))
        ));
        assert!(matches!(users.login("nobody", "secret1", now), Err(NamenodeError::Unauthorized(_))));

        let first = users.login("alice", "secret1", now).unwrap();
        let second = users.login("alice", "secret1", now).unwrap();
        assert_ne!(first.token, second.token);
        assert_eq!(users.authenticate(&first.token, now).unwrap(), "alice");
        assert_eq!(users.authenticate(&second.token, now).unwrap(), "alice");

        assert!(users.logout(&first.token));
        assert!(users.authenticate(&first.token, now).is_err());

        let after_expiry = now + TimeDelta::hours(2);
        assert!(matches!(
            users.authenticate(&second.token, after_expiry),
            Err(NamenodeError::Unauthorized(_))
        ));
        assert!(users.authenticate("made-up", now).is_err());
    }

    #[test]
    fn unbounded_ttl_saturates_expiry() {
        let mut users = UserRegistry::new(TimeDelta::MAX, 6);
        users.register("alice", "secret1").unwrap();
        let now = Utc::now();
        let session = users.login("alice", "secret1", now).unwrap();
        assert_eq!(session.expires_at, DateTime::<Utc>::MAX_UTC);
        assert_eq!(users.authenticate(&session.token, now).unwrap(), "alice");
    }

    #[test]
    fn purge_drops_only_expired_sessions() {
        let mut users = registry();
        users.register("alice", "secret1").unwrap();
        let now = Utc::now();
        users.login("alice", "secret1", now - TimeDelta::hours(2)).unwrap();
        let live = users.login("alice", "secret1", now).unwrap();
        assert_eq!(users.purge_expired(now), 1);
        assert!(users.authenticate(&live.token, now).is_ok());
    }
}
