use async_trait::async_trait;
use redis::{AsyncCommands, Script, aio::ConnectionManager};

use crate::{
    error::{AppError, Result},
    models::session::Session,
    sessions::store::SessionStore,
};

/// Writes the session and indexes its token. The index TTL is only ever
/// raised, so it always covers the longest-lived session in the set.
const PUT_SESSION_SCRIPT: &str = r#"
redis.call('SET', KEYS[1], ARGV[1], 'EX', ARGV[2])
redis.call('SADD', KEYS[2], ARGV[3])
if redis.call('TTL', KEYS[2]) < tonumber(ARGV[2]) then
    redis.call('EXPIRE', KEYS[2], ARGV[2])
end
return 1
"#;

fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

fn user_index_key(user_id: &str) -> String {
    format!("user_sessions:{}", user_id)
}

/// Redis-backed [`SessionStore`].
///
/// Each session lives under `session:{token}` with a TTL. A per-user set
/// `user_sessions:{user_id}` indexes the tokens so all of a user's sessions
/// can be destroyed at once.
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: ConnectionManager,
    put_script: Script,
}

impl RedisSessionStore {
    /// Connects to `redis_url`.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;
        Ok(Self {
            redis,
            put_script: Script::new(PUT_SESSION_SCRIPT),
        })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, token: &str, session: &Session, ttl_secs: u64) -> Result<()> {
        let session_json = sonic_rs::to_string(session)
            .map_err(|e| AppError::Internal(format!("Session serialization failed: {}", e)))?;

        let mut redis = self.redis.clone();
        let _: i64 = self
            .put_script
            .key(session_key(token))
            .key(user_index_key(&session.user.id))
            .arg(&session_json)
            .arg(ttl_secs.max(1))
            .arg(token)
            .invoke_async(&mut redis)
            .await?;

        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<Session>> {
        let mut redis = self.redis.clone();
        let raw: Option<String> = redis.get(session_key(token)).await?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match sonic_rs::from_str::<Session>(&raw) {
            Ok(session) if !session.is_expired_at(chrono::Utc::now()) => Ok(Some(session)),
            Ok(_) => {
                let _: () = redis.del(session_key(token)).await.unwrap_or(());
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("❌ Invalid session JSON, dropping it: {}", e);
                let _: () = redis.del(session_key(token)).await.unwrap_or(());
                Ok(None)
            }
        }
    }

    async fn destroy(&self, token: &str) -> Result<()> {
        let mut redis = self.redis.clone();
        let raw: Option<String> = redis.get(session_key(token)).await?;

        if let Some(session) = raw.and_then(|raw| sonic_rs::from_str::<Session>(&raw).ok()) {
            let _: () = redis
                .srem(user_index_key(&session.user.id), token)
                .await?;
        }

        let _: () = redis.del(session_key(token)).await?;
        Ok(())
    }

    async fn destroy_user(&self, user_id: &str) -> Result<()> {
        let mut redis = self.redis.clone();
        let index_key = user_index_key(user_id);
        let tokens: Vec<String> = redis.smembers(&index_key).await?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        for token in &tokens {
            pipe.del(session_key(token)).ignore();
        }
        pipe.del(&index_key).ignore();
        let _: () = pipe.query_async(&mut redis).await?;

        tracing::debug!("Destroyed {} session(s) for user {}", tokens.len(), user_id);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize> {
        // Keys expire on their own.
        Ok(0)
    }
}
