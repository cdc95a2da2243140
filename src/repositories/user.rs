use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::{Row, error::SqlState};
use crate::{
    error::{AppError, Result},
    models::user::{NewUser, User, UserProfile},
};

/// Message for a taken login id.
pub const DUPLICATE_USER_ID_MESSAGE: &str = "이미 사용 중인 아이디 입니다.";
/// Message for a taken email address.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "이미 사용 중인 이메일 입니다.";

/// Access to the `User` table.
///
/// Every method issues exactly one statement. Update and delete methods return
/// the number of affected rows.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user, failing with `Conflict` when the id or email is taken.
    async fn insert(&self, user: NewUser) -> Result<()>;
    async fn exists(&self, user_id: &str) -> Result<bool>;
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>>;
    async fn profile(&self, user_id: &str) -> Result<Option<UserProfile>>;
    async fn password_hash(&self, user_id: &str) -> Result<Option<String>>;
    async fn update_nickname(&self, user_id: &str, nickname: &str) -> Result<u64>;
    async fn update_password(&self, user_id: &str, password_hash: &str) -> Result<u64>;
    async fn update_picture(&self, user_id: &str, picture: &str) -> Result<u64>;
    async fn delete(&self, user_id: &str) -> Result<u64>;
    async fn find_id_by_email(&self, email: &str) -> Result<Option<String>>;
    async fn find_id_by_id_and_email(&self, user_id: &str, email: &str) -> Result<Option<String>>;
}

/// PostgreSQL-backed [`UserRepository`].
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool,
}

impl PgUserRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn column<'a, T>(row: &'a Row, name: &str) -> Result<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(name)
        .map_err(|_| AppError::MissingData(name.to_string()))
}

/// A helper function to map a `tokio_postgres::Row` to a `User`.
fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        user_id: column(row, "user_id")?,
        username: column(row, "username")?,
        nickname: column(row, "nickname")?,
        email: column(row, "email")?,
        password: column(row, "password")?,
        picture: column(row, "picture")?,
        tier: column(row, "tier")?,
        review_count: column(row, "review_count")?,
    })
}

fn row_to_profile(row: &Row) -> Result<UserProfile> {
    Ok(UserProfile {
        username: column(row, "username")?,
        nickname: column(row, "nickname")?,
        email: column(row, "email")?,
        picture: column(row, "picture")?,
        tier: column(row, "tier")?,
        review_count: column(row, "review_count")?,
    })
}

/// Maps a unique-key violation to `Conflict`; everything else stays a store error.
fn map_insert_error(err: tokio_postgres::Error) -> AppError {
    if err.code() != Some(&SqlState::UNIQUE_VIOLATION) {
        return AppError::Database(err);
    }

    let on_email = err
        .as_db_error()
        .and_then(|db| db.constraint())
        .is_some_and(|constraint| constraint.contains("email"));

    if on_email {
        AppError::Conflict(DUPLICATE_EMAIL_MESSAGE.to_string())
    } else {
        AppError::Conflict(DUPLICATE_USER_ID_MESSAGE.to_string())
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: NewUser) -> Result<()> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(
                r#"
                INSERT INTO "User" (user_id, username, nickname, email, password)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .await?;
        client
            .execute(
                &stmt,
                &[
                    &user.user_id,
                    &user.username,
                    &user.nickname,
                    &user.email,
                    &user.password_hash,
                ],
            )
            .await
            .map_err(map_insert_error)?;
        Ok(())
    }

    async fn exists(&self, user_id: &str) -> Result<bool> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(r#"SELECT 1 FROM "User" WHERE user_id = $1"#)
            .await?;
        Ok(client.query_opt(&stmt, &[&user_id]).await?.is_some())
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(
                r#"
                SELECT user_id, username, nickname, email, password, picture, tier, review_count
                FROM "User"
                WHERE user_id = $1
                "#,
            )
            .await?;
        let row = client.query_opt(&stmt, &[&user_id]).await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(
                r#"
                SELECT username, nickname, email, picture, tier, review_count
                FROM "User"
                WHERE user_id = $1
                "#,
            )
            .await?;
        let row = client.query_opt(&stmt, &[&user_id]).await?;
        row.as_ref().map(row_to_profile).transpose()
    }

    async fn password_hash(&self, user_id: &str) -> Result<Option<String>> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(r#"SELECT password FROM "User" WHERE user_id = $1"#)
            .await?;
        let row = client.query_opt(&stmt, &[&user_id]).await?;
        row.as_ref().map(|r| column(r, "password")).transpose()
    }

    async fn update_nickname(&self, user_id: &str, nickname: &str) -> Result<u64> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(r#"UPDATE "User" SET nickname = $1 WHERE user_id = $2"#)
            .await?;
        Ok(client.execute(&stmt, &[&nickname, &user_id]).await?)
    }

    async fn update_password(&self, user_id: &str, password_hash: &str) -> Result<u64> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(r#"UPDATE "User" SET password = $1 WHERE user_id = $2"#)
            .await?;
        Ok(client.execute(&stmt, &[&password_hash, &user_id]).await?)
    }

    async fn update_picture(&self, user_id: &str, picture: &str) -> Result<u64> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(r#"UPDATE "User" SET picture = $1 WHERE user_id = $2"#)
            .await?;
        Ok(client.execute(&stmt, &[&picture, &user_id]).await?)
    }

    async fn delete(&self, user_id: &str) -> Result<u64> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(r#"DELETE FROM "User" WHERE user_id = $1"#)
            .await?;
        Ok(client.execute(&stmt, &[&user_id]).await?)
    }

    async fn find_id_by_email(&self, email: &str) -> Result<Option<String>> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(r#"SELECT user_id FROM "User" WHERE email = $1"#)
            .await?;
        let row = client.query_opt(&stmt, &[&email]).await?;
        row.as_ref().map(|r| column(r, "user_id")).transpose()
    }

    async fn find_id_by_id_and_email(&self, user_id: &str, email: &str) -> Result<Option<String>> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(r#"SELECT user_id FROM "User" WHERE user_id = $1 AND email = $2"#)
            .await?;
        let row = client.query_opt(&stmt, &[&user_id, &email]).await?;
        row.as_ref().map(|r| column(r, "user_id")).transpose()
    }
}
