use std::sync::Arc;

use chrono::Utc;
use influence_api::{LinkedAccountResponse, UpdateProfileRequest, UserResponse};
use uuid::Uuid;

use crate::auth::user_type::UserType;
use crate::db::models::user::{UpdateUser, User};
use crate::db::repositories::{LinkedAccountRepository, USERS_USERNAME_KEY, UserRepository};
use crate::error::AppError;

const MAX_USERNAME_LEN: usize = 150;

/// Current-user profile: read with linked accounts, partial update.
#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepository>,
    accounts: Arc<dyn LinkedAccountRepository>,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserRepository>, accounts: Arc<dyn LinkedAccountRepository>) -> Self {
        Self { users, accounts }
    }

    pub fn current(&self, user_id: Uuid) -> Result<UserResponse, AppError> {
        let user = self
            .users
            .find_by_id(user_id)?
            .ok_or_else(|| AppError::not_found("User"))?;
        self.to_response(user)
    }

    pub fn update(&self, user_id: Uuid, request: UpdateProfileRequest) -> Result<UserResponse, AppError> {
        let changes = UpdateUser {
            name: request.name.map(|n| n.trim().to_string()),
            username: request.username.map(|u| validate_username(&u)).transpose()?,
            image: request.image,
            user_type: request
                .user_type
                .map(|t| UserType::from_request(Some(&t)).map(|t| t.as_str().to_string()))
                .transpose()?,
            updated_at: Utc::now(),
        };

        let user = match self.users.update(user_id, &changes) {
            Ok(user) => user,
            Err(e) if e.violates(USERS_USERNAME_KEY) => {
                return Err(AppError::duplicate("Username is already taken"));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(%user_id, "Profile updated");
        self.to_response(user)
    }

    fn to_response(&self, user: User) -> Result<UserResponse, AppError> {
        let accounts = self
            .accounts
            .list_for_user(user.id)?
            .into_iter()
            .map(LinkedAccountResponse::from)
            .collect();

        Ok(UserResponse {
            id: user.id,
            name: user.name,
            username: user.username,
            user_type: user.user_type,
            email: user.email,
            email_verified: user.email_verified,
            image: user.image,
            accounts,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}

fn validate_username(raw: &str) -> Result<String, AppError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(AppError::validation("username cannot be empty"));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(AppError::validation("username is too long"));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(AppError::validation("username cannot contain whitespace"));
    }
    Ok(username.to_string())
}
