//! User Command Handlers

use std::sync::Arc;

use crate::application::commands::RegisterUser;
use crate::application::error::ApplicationError;
use crate::application::ports::{RepositoryError, UserRepositoryPort};
use crate::domain::user::{Email, User, Username};

/// RegisterUser Handler
pub struct RegisterUserHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl RegisterUserHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>) -> Self {
        Self { user_repo }
    }

    pub async fn handle(&self, command: RegisterUser) -> Result<User, ApplicationError> {
        let username = Username::new(command.username).map_err(ApplicationError::validation)?;
        let email = Email::new(command.email).map_err(ApplicationError::validation)?;

        let user = User::register(username, email);

        self.user_repo.insert(&user).await.map_err(|e| match e {
            RepositoryError::Duplicate(_) => ApplicationError::conflict("用户名或邮箱已被注册"),
            other => other.into(),
        })?;

        tracing::info!(
            user_id = %user.id(),
            username = %user.username(),
            "User registered"
        );

        Ok(user)
    }
}
