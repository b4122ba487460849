//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, UpdateUser, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate a user by email and return a JWT token
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !self.verify_password(&user.password_hash, password) {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role(),
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    fn verify_password(&self, hash: &str, password: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// List all users
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    /// Create a new user
    pub async fn create_user(&self, data: &CreateUser) -> AppResult<User> {
        if self.repository.users.email_exists(&data.email, None).await? {
            return Err(AppError::Conflict(format!(
                "Email '{}' is already registered",
                data.email
            )));
        }

        let password_hash = self.hash_password(&data.password)?;
        let role = data.role.unwrap_or(Role::Patron);

        let user = self
            .repository
            .users
            .create(&data.name, &data.email, &password_hash, role)
            .await?;

        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    /// Update a user
    pub async fn update_user(&self, id: i32, data: &UpdateUser) -> AppResult<User> {
        if let Some(ref email) = data.email {
            if self.repository.users.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict(format!(
                    "Email '{}' is already registered",
                    email
                )));
            }
        }

        let password_hash = match data.password.as_deref() {
            Some(password) => Some(self.hash_password(password)?),
            None => None,
        };

        self.repository
            .users
            .update(
                id,
                data.name.as_deref(),
                data.email.as_deref(),
                password_hash.as_deref(),
                data.role,
            )
            .await
    }

    /// Delete a user; refused while the user still holds unreturned items
    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        self.repository.users.get_by_id(id).await?;

        let held = self
            .repository
            .reservations
            .count_unreturned_for_user(id)
            .await?;
        if held > 0 {
            return Err(AppError::Conflict(format!(
                "User still holds {} unreturned item(s)",
                held
            )));
        }

        self.repository.users.delete(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}
