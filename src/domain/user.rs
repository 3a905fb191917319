use crate::auth;
use crate::domain::user::driven_ports::{CreateUserError, DetectUser, UserReader, UserWriter};
use crate::domain::user::driving_ports::{LoginError, RegisterError};
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    /// Argon2 hash in PHC string format
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, PartialEq)]
#[cfg_attr(test, derive(Clone))]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: String,
}

pub mod driven_ports {
    use super::*;

    pub trait UserReader {
        async fn user_by_id(
            &self,
            user_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<User>, anyhow::Error>;

        /// Email lookup ignores case
        async fn user_by_email(
            &self,
            email: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<User>, anyhow::Error>;
    }

    #[derive(Debug, Error)]
    pub enum CreateUserError {
        /// The store already holds an account with this email, in any letter case
        #[error("an account with that email already exists")]
        EmailTaken,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    pub trait UserWriter {
        async fn create_user(
            &self,
            user: &User,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), CreateUserError>;
    }

    pub trait DetectUser {
        async fn user_with_email_exists(
            &self,
            email: &str,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;

    #[derive(Debug, Error)]
    pub enum RegisterError {
        #[error("an account with that email already exists")]
        EmailTaken,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    #[derive(Debug, Error)]
    pub enum LoginError {
        #[error("the email or password was incorrect")]
        InvalidCredentials,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait UserPort {
        async fn register(
            &self,
            new_user: &NewUser,
            ext_cxn: &mut impl ExternalConnectivity,
            u_writer: &impl driven_ports::UserWriter,
            u_detect: &impl driven_ports::DetectUser,
        ) -> Result<User, RegisterError>;
        async fn log_in(
            &self,
            email: &str,
            password: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
        ) -> Result<User, LoginError>;
        async fn user_by_id(
            &self,
            user_id: &str,
            ext_cxn: &mut impl ExternalConnectivity,
            u_reader: &impl driven_ports::UserReader,
        ) -> Result<Option<User>, anyhow::Error>;
    }
}

pub struct UserService {}

impl driving_ports::UserPort for UserService {
    async fn register(
        &self,
        new_user: &NewUser,
        ext_cxn: &mut impl ExternalConnectivity,
        u_writer: &impl UserWriter,
        u_detect: &impl DetectUser,
    ) -> Result<User, RegisterError> {
        let email_taken = u_detect
            .user_with_email_exists(&new_user.email, &mut *ext_cxn)
            .await
            .context("checking for an existing account")?;
        if email_taken {
            return Err(RegisterError::EmailTaken);
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: new_user.email.clone(),
            name: new_user.name.clone(),
            password_hash: auth::hash_password(&new_user.password).await?,
            created_at: Utc::now(),
        };
        // Another registration may have claimed the email since the check above
        u_writer
            .create_user(&user, &mut *ext_cxn)
            .await
            .map_err(|err| match err {
                CreateUserError::EmailTaken => RegisterError::EmailTaken,
                CreateUserError::PortError(cause) => {
                    RegisterError::PortError(cause.context("registering a user"))
                }
            })?;

        info!(user_id = %user.id, "registered a new user");
        Ok(user)
    }

    async fn log_in(
        &self,
        email: &str,
        password: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl UserReader,
    ) -> Result<User, LoginError> {
        let user = u_reader
            .user_by_email(email, &mut *ext_cxn)
            .await
            .context("looking up a user to log in")?
            .ok_or(LoginError::InvalidCredentials)?;

        if !auth::verify_password(password, &user.password_hash).await {
            return Err(LoginError::InvalidCredentials);
        }

        Ok(user)
    }

    async fn user_by_id(
        &self,
        user_id: &str,
        ext_cxn: &mut impl ExternalConnectivity,
        u_reader: &impl UserReader,
    ) -> Result<Option<User>, anyhow::Error> {
        u_reader
            .user_by_id(user_id, &mut *ext_cxn)
            .await
            .context("fetching a user by ID")
    }
}


#[cfg(test)]
pub mod test_util {
    use super::*;
    use crate::domain::test_util::{Connectivity, FakeImplementation};
    use std::sync::{Mutex, RwLock};

    pub fn new_user_default() -> NewUser {
        NewUser {
            email: "someone@example.com".to_owned(),
            name: "Someone".to_owned(),
            password: "hunter22".to_owned(),
        }
    }

    /// A stored user whose password is irrelevant to the test
    pub fn user_default() -> User {
        User {
            id: "user-1".to_owned(),
            email: "someone@example.com".to_owned(),
            name: "Someone".to_owned(),
            password_hash: "not-a-real-hash".to_owned(),
            created_at: DateTime::<Utc>::default(),
        }
    }

    pub struct InMemoryUserPersistence {
        pub users: Vec<User>,
        pub connected: Connectivity,
    }

    impl InMemoryUserPersistence {
        pub fn new() -> InMemoryUserPersistence {
            InMemoryUserPersistence {
                users: Vec::new(),
                connected: Connectivity::Connected,
            }
        }

        pub fn new_locked() -> RwLock<InMemoryUserPersistence> {
            RwLock::new(Self::new())
        }
    }

    impl driven_ports::UserReader for RwLock<InMemoryUserPersistence> {
        async fn user_by_id(
            &self,
            user_id: &str,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<User>, anyhow::Error> {
            let persistence = self.read().expect("user persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            Ok(persistence.users.iter().find(|user| user.id == user_id).cloned())
        }

        async fn user_by_email(
            &self,
            email: &str,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<User>, anyhow::Error> {
            let persistence = self.read().expect("user persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            Ok(persistence
                .users
                .iter()
                .find(|user| user.email.eq_ignore_ascii_case(email))
                .cloned())
        }
    }

    impl driven_ports::UserWriter for RwLock<InMemoryUserPersistence> {
        async fn create_user(
            &self,
            user: &User,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), CreateUserError> {
            let mut persistence = self.write().expect("user persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            if persistence
                .users
                .iter()
                .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
            {
                return Err(CreateUserError::EmailTaken);
            }
            persistence.users.push(user.clone());
            Ok(())
        }
    }

    impl driven_ports::DetectUser for RwLock<InMemoryUserPersistence> {
        async fn user_with_email_exists(
            &self,
            email: &str,
            _ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error> {
            let persistence = self.read().expect("user persist rw lock poisoned");
            persistence.connected.blow_up_if_disconnected()?;

            Ok(persistence
                .users
                .iter()
                .any(|user| user.email.eq_ignore_ascii_case(email)))
        }
    }

    pub struct MockUserService {
        pub register_result: FakeImplementation<NewUser, Result<User, RegisterError>>,
        pub log_in_result: FakeImplementation<(String, String), Result<User, LoginError>>,
        pub user_by_id_result: FakeImplementation<String, anyhow::Result<Option<User>>>,
    }

    impl MockUserService {
        pub fn new() -> MockUserService {
            MockUserService {
                register_result: FakeImplementation::new(),
                log_in_result: FakeImplementation::new(),
                user_by_id_result: FakeImplementation::new(),
            }
        }

        pub fn new_locked() -> Mutex<MockUserService> {
            Mutex::new(Self::new())
        }
    }

    impl driving_ports::UserPort for Mutex<MockUserService> {
        async fn register(
            &self,
            new_user: &NewUser,
            _ext_cxn: &mut impl ExternalConnectivity,
            _u_writer: &impl UserWriter,
            _u_detect: &impl DetectUser,
        ) -> Result<User, RegisterError> {
            let mut locked_self = self.lock().expect("mock user service mutex poisoned");
            locked_self.register_result.save_arguments(new_user.clone());

            locked_self.register_result.return_value_result()
        }

        async fn log_in(
            &self,
            email: &str,
            password: &str,
            _ext_cxn: &mut impl ExternalConnectivity,
            _u_reader: &impl UserReader,
        ) -> Result<User, LoginError> {
            let mut locked_self = self.lock().expect("mock user service mutex poisoned");
            locked_self
                .log_in_result
                .save_arguments((email.to_owned(), password.to_owned()));

            locked_self.log_in_result.return_value_result()
        }

        async fn user_by_id(
            &self,
            user_id: &str,
            _ext_cxn: &mut impl ExternalConnectivity,
            _u_reader: &impl UserReader,
        ) -> Result<Option<User>, anyhow::Error> {
            let mut locked_self = self.lock().expect("mock user service mutex poisoned");
            locked_self.user_by_id_result.save_arguments(user_id.to_owned());

            locked_self.user_by_id_result.return_value_anyhow()
        }
    }
}
