//! Account registration, authentication, and profile updates.

use std::sync::Arc;

use crate::auth;
use crate::clock::Clock;
use crate::locale::MessageKey;
use crate::model::UserModel;
use crate::model::UserUpdate;
use crate::repository::Repository;
use crate::repository::table::Table;
use crate::service::error::ServiceError;

/// Minimum accepted password length, matching the registration contract.
const MIN_PASSWORD_LEN: usize = 6;

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Service for managing user accounts.
pub struct UserService {
    pub db: Arc<Repository>,
    pub clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(db: Arc<Repository>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Registers a new account.
    ///
    /// # Performance
    /// * DB calls: 2
    pub async fn register(&self, new_user: NewUser) -> Result<UserModel, ServiceError> {
        Self::validate_email(&new_user.email)?;
        Self::validate_password(&new_user.password)?;
        if new_user.name.trim().is_empty() {
            return Err(ServiceError::Validation {
                key: MessageKey::ValidationFailed,
            });
        }

        // DB 1
        if self.db.user_table.select_by_email(&new_user.email).await?.is_some() {
            return Err(ServiceError::Conflict {
                key: MessageKey::UserAlreadyExists,
            });
        }

        let password_hash =
            auth::hash_password(&new_user.password).map_err(|e| ServiceError::UnexpectedResult {
                message: e.to_string(),
            })?;

        let mut user = UserModel {
            id: 0,
            name: new_user.name,
            email: new_user.email,
            password_hash,
            created_at: self.clock.now(),
        };
        // DB 1
        user.id = self.db.user_table.insert(&user).await.map_err(|e| {
            // Lost race against a concurrent registration for the same email.
            if e.is_unique_violation() {
                ServiceError::Conflict {
                    key: MessageKey::UserAlreadyExists,
                }
            } else {
                e.into()
            }
        })?;

        Ok(user)
    }

    /// Checks credentials and returns the account on success.
    ///
    /// # Performance
    /// * DB calls: 1
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<UserModel, ServiceError> {
        // DB 1
        let user = self
            .db
            .user_table
            .select_by_email(email)
            .await?
            .ok_or(ServiceError::NotFound {
                key: MessageKey::UserNotFound,
            })?;

        let matches =
            auth::verify_password(password, &user.password_hash).map_err(|e| {
                ServiceError::UnexpectedResult {
                    message: e.to_string(),
                }
            })?;
        if !matches {
            return Err(ServiceError::Auth {
                key: MessageKey::PasswordMismatch,
            });
        }

        Ok(user)
    }

    /// Applies a partial profile update.
    ///
    /// Changing the password requires the correct current password plus a
    /// matching confirmation; changing the email re-checks uniqueness.
    ///
    /// # Performance
    /// * DB calls: 2 + 1?
    pub async fn update(&self, user_id: i64, fields: UserUpdate) -> Result<UserModel, ServiceError> {
        // DB 1
        let mut user =
            self.db
                .user_table
                .select(&user_id)
                .await?
                .ok_or(ServiceError::NotFound {
                    key: MessageKey::UserNotFound,
                })?;

        if let Some(email) = &fields.email
            && email != &user.email
        {
            Self::validate_email(email)?;
            // DB 1?
            if self.db.user_table.select_by_email(email).await?.is_some() {
                return Err(ServiceError::Conflict {
                    key: MessageKey::UserAlreadyExists,
                });
            }
            user.email = email.clone();
        }

        if let Some(name) = fields.name {
            if name.trim().is_empty() {
                return Err(ServiceError::Validation {
                    key: MessageKey::ValidationFailed,
                });
            }
            user.name = name;
        }

        if let Some(password) = &fields.password {
            Self::validate_password(password)?;

            let confirmed = fields
                .confirm_password
                .as_ref()
                .is_some_and(|c| c == password);
            let old_password = fields.old_password.as_ref();
            let (Some(old_password), true) = (old_password, confirmed) else {
                return Err(ServiceError::Validation {
                    key: MessageKey::ValidationFailed,
                });
            };

            let matches = auth::verify_password(old_password, &user.password_hash).map_err(|e| {
                ServiceError::UnexpectedResult {
                    message: e.to_string(),
                }
            })?;
            if !matches {
                return Err(ServiceError::Auth {
                    key: MessageKey::PasswordMismatch,
                });
            }

            user.password_hash =
                auth::hash_password(password).map_err(|e| ServiceError::UnexpectedResult {
                    message: e.to_string(),
                })?;
        }

        // DB 1
        self.db.user_table.update(&user).await?;
        Ok(user)
    }

    fn validate_email(email: &str) -> Result<(), ServiceError> {
        let well_formed = email.contains('@')
            && !email.starts_with('@')
            && !email.ends_with('@')
            && !email.contains(char::is_whitespace);
        if !well_formed {
            return Err(ServiceError::Validation {
                key: MessageKey::ValidationFailed,
            });
        }
        Ok(())
    }

    fn validate_password(password: &str) -> Result<(), ServiceError> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(ServiceError::Validation {
                key: MessageKey::ValidationFailed,
            });
        }
        Ok(())
    }
}
