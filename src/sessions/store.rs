use async_trait::async_trait;
use crate::{error::Result, models::session::Session};

/// Server-side session storage keyed by the opaque cookie token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores `session` under `token` for `ttl_secs` seconds, replacing any previous value.
    async fn put(&self, token: &str, session: &Session, ttl_secs: u64) -> Result<()>;

    /// Looks a token up. Expired sessions read as `None`.
    async fn get(&self, token: &str) -> Result<Option<Session>>;

    /// Destroys one session. Unknown tokens are not an error.
    async fn destroy(&self, token: &str) -> Result<()>;

    /// Destroys every session belonging to `user_id`.
    async fn destroy_user(&self, user_id: &str) -> Result<()>;

    /// Drops expired sessions and returns how many went away.
    async fn purge_expired(&self) -> Result<usize>;
}
