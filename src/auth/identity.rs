//! Identity provisioning shared by the magic link and social login flows.

use uuid::Uuid;

use crate::auth::user_type::UserType;
use crate::db::models::user::{NewUser, User};
use crate::db::repositories::{USERS_EMAIL_KEY, USERS_USERNAME_KEY, UserRepository};
use crate::error::AppError;

const USERNAME_ATTEMPTS: usize = 4;

/// Returns the identity owning `email`, creating it when absent.
///
/// The username starts as `username_base` and gets a short random suffix on
/// collision. A concurrent insert of the same email resolves to the row that
/// won the race.
pub fn find_or_create_by_email(
    users: &dyn UserRepository,
    email: &str,
    username_base: &str,
    name: Option<&str>,
    user_type: UserType,
) -> Result<User, AppError> {
    if let Some(user) = users.find_by_email(email)? {
        return Ok(user);
    }

    for attempt in 0..USERNAME_ATTEMPTS {
        let new_user = NewUser {
            email: Some(email.to_string()),
            username: candidate_username(username_base, attempt),
            name: name.map(str::to_string),
            user_type: user_type.as_str().to_string(),
        };

        match users.create(&new_user) {
            Ok(user) => {
                tracing::info!(user_id = %user.id, username = %user.username, "Created identity");
                return Ok(user);
            }
            Err(e) if e.violates(USERS_EMAIL_KEY) => {
                tracing::debug!(email, "Identity created concurrently, re-reading");
                return users
                    .find_by_email(email)?
                    .ok_or_else(|| AppError::internal("identity missing after email conflict"));
            }
            Err(e) if e.violates(USERS_USERNAME_KEY) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::duplicate("Could not allocate a unique username"))
}

fn candidate_username(base: &str, attempt: usize) -> String {
    let base = if base.is_empty() { "user" } else { base };
    if attempt == 0 {
        return base.to_string();
    }
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{base}_{}", &suffix[..6])
}
