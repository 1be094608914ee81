//! Admin session storage
//!
//! Sessions are keyed by an opaque random token handed to the browser. The
//! provider tokens never leave the server.

use std::collections::HashMap;
use std::time::Duration;
use async_trait::async_trait;
use redis::AsyncCommands;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error};
use crate::config::RedisConfig;
use crate::utils::errors::Result;
use super::auth_client::Session;

#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    async fn save(&self, token: &str, session: &Session, ttl: Duration) -> Result<()>;

    /// Load a session; expired or unknown tokens yield `None`
    async fn load(&self, token: &str) -> Result<Option<Session>>;

    async fn delete(&self, token: &str) -> Result<()>;
}

/// Redis-based session storage
#[derive(Clone)]
pub struct RedisSessionStore {
    connection_manager: redis::aio::ConnectionManager,
    prefix: String,
}

impl RedisSessionStore {
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            prefix: config.prefix.clone(),
        })
    }

    /// Test Redis connection
    pub async fn test_connection(&self) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn session_key(&self, token: &str) -> String {
        format!("{}session:{}", self.prefix, token)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(&self, token: &str, session: &Session, ttl: Duration) -> Result<()> {
        let key = self.session_key(token);
        let serialized = serde_json::to_string(session)?;
        let ttl_seconds = ttl.as_secs().max(1);
        let mut conn = self.connection_manager.clone();

        match conn.set_ex::<_, _, ()>(&key, serialized, ttl_seconds).await {
            Ok(()) => {
                debug!(ttl_seconds = ttl_seconds, "Session saved to Redis");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to save session to Redis");
                Err(e.into())
            }
        }
    }

    async fn load(&self, token: &str) -> Result<Option<Session>> {
        let key = self.session_key(token);
        let mut conn = self.connection_manager.clone();

        let serialized: Option<String> = conn.get(&key).await?;
        match serialized {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, token: &str) -> Result<()> {
        let key = self.session_key(token);
        let mut conn = self.connection_manager.clone();

        let deleted: u32 = conn.del(&key).await?;
        debug!(deleted = deleted, "Session removed from Redis");
        Ok(())
    }
}

impl std::fmt::Debug for RedisSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSessionStore")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// In-process session storage for development and tests
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, (Session, Instant)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.sessions.lock().await.values().filter(|(_, deadline)| *deadline > now).count()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, token: &str, session: &Session, ttl: Duration) -> Result<()> {
        let deadline = Instant::now() + ttl;
        self.sessions
            .lock()
            .await
            .insert(token.to_string(), (session.clone(), deadline));
        Ok(())
    }

    async fn load(&self, token: &str) -> Result<Option<Session>> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(token) {
            Some((session, deadline)) if *deadline > Instant::now() => Ok(Some(session.clone())),
            Some(_) => {
                sessions.remove(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, token: &str) -> Result<()> {
        self.sessions.lock().await.remove(token);
        Ok(())
    }
}
