use super::{Count, parse_stored_timestamp, stored_timestamp};
use crate::domain;
use crate::domain::user::User;
use crate::domain::user::driven_ports::CreateUserError;
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::Context;
use sqlx::query_as;

pub struct DbDetectUser {}

impl domain::user::driven_ports::DetectUser for DbDetectUser {
    async fn user_with_email_exists(
        &self,
        email: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, anyhow::Error> {
        let mut connection = ext_cxn.database_cxn().await?;

        let users_with_email = query_as::<_, Count>(
            "SELECT count(*) AS count FROM users WHERE email = ? COLLATE NOCASE",
        )
        .bind(email)
        .fetch_one(connection.borrow_connection())
        .await
        .context("Detecting user via email")?;

        Ok(users_with_email.count > 0)
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    password_hash: String,
    created_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(value: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            created_at: parse_stored_timestamp("users.created_at", &value.created_at)?,
            id: value.id,
            email: value.email,
            name: value.name,
            password_hash: value.password_hash,
        })
    }
}

pub struct DbReadUsers {}

impl domain::user::driven_ports::UserReader for DbReadUsers {
    async fn user_by_id(
        &self,
        user_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<User>, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let user = query_as::<_, UserRow>(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("Fetching a user by id")?;

        user.map(User::try_from).transpose()
    }

    async fn user_by_email(
        &self,
        email: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<User>, anyhow::Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        let user = query_as::<_, UserRow>(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE email = ? COLLATE NOCASE",
        )
        .bind(email)
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("Fetching a user by email")?;

        user.map(User::try_from).transpose()
    }
}

pub struct DbWriteUsers {}

impl domain::user::driven_ports::UserWriter for DbWriteUsers {
    async fn create_user(
        &self,
        user: &User,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), CreateUserError> {
        let mut cxn_handle = ext_cxn.database_cxn().await?;

        sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(stored_timestamp(&user.created_at))
        .execute(cxn_handle.borrow_connection())
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                CreateUserError::EmailTaken
            }
            other => anyhow::Error::new(other).context("Inserting a user").into(),
        })?;

        Ok(())
    }
}
