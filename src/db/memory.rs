//! In-memory store for unit tests. Mirrors the Postgres constraints
//! (unique email, username, (provider, provider_account_id), token) and the
//! conditional update used to consume magic links.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::error::RepositoryError;
use crate::db::models::linked_account::{LinkedAccount, NewLinkedAccount, RefreshLinkedAccount};
use crate::db::models::magic_link::{MagicLink, NewMagicLink};
use crate::db::models::user::{NewUser, UpdateUser, User};
use crate::db::repositories::{
    LINKED_ACCOUNTS_PROVIDER_KEY, LinkedAccountRepository, MAGIC_LINKS_TOKEN_KEY,
    MagicLinkRepository, USERS_EMAIL_KEY, USERS_USERNAME_KEY, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    accounts: Vec<LinkedAccount>,
    magic_links: Vec<MagicLink>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        let mut tables = self.tables.lock().expect("memory store poisoned");
        f(&mut tables)
    }

    pub fn users(&self) -> Vec<User> {
        self.with(|t| t.users.clone())
    }

    pub fn accounts(&self) -> Vec<LinkedAccount> {
        self.with(|t| t.accounts.clone())
    }

    pub fn magic_links(&self) -> Vec<MagicLink> {
        self.with(|t| t.magic_links.clone())
    }

    /// Inserts a magic link row as-is (e.g. one that is already expired).
    pub fn insert_magic_link(&self, link: MagicLink) {
        self.with(|t| t.magic_links.push(link));
    }

    /// Overrides an account's `updated_at` to make recency explicit in tests.
    pub fn touch_account(&self, id: Uuid, updated_at: DateTime<Utc>) {
        self.with(|t| {
            if let Some(account) = t.accounts.iter_mut().find(|a| a.id == id) {
                account.updated_at = updated_at;
            }
        });
    }
}

impl UserRepository for MemoryStore {
    fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self.with(|t| t.users.iter().find(|u| u.id == id).cloned()))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.with(|t| {
            t.users
                .iter()
                .find(|u| u.email.as_deref() == Some(email))
                .cloned()
        }))
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.with(|t| t.users.iter().find(|u| u.username == username).cloned()))
    }

    fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        self.with(|t| {
            if new_user.email.is_some() && t.users.iter().any(|u| u.email == new_user.email) {
                return Err(RepositoryError::UniqueViolation(USERS_EMAIL_KEY.to_string()));
            }
            if t.users.iter().any(|u| u.username == new_user.username) {
                return Err(RepositoryError::UniqueViolation(
                    USERS_USERNAME_KEY.to_string(),
                ));
            }
            let now = Utc::now();
            let user = User {
                id: Uuid::new_v4(),
                email: new_user.email.clone(),
                username: new_user.username.clone(),
                name: new_user.name.clone(),
                user_type: new_user.user_type.clone(),
                email_verified: None,
                image: None,
                created_at: now,
                updated_at: now,
            };
            t.users.push(user.clone());
            Ok(user)
        })
    }

    fn update(&self, id: Uuid, changes: &UpdateUser) -> Result<User, RepositoryError> {
        self.with(|t| {
            if let Some(username) = &changes.username
                && t.users.iter().any(|u| u.id != id && &u.username == username)
            {
                return Err(RepositoryError::UniqueViolation(
                    USERS_USERNAME_KEY.to_string(),
                ));
            }
            let user = t
                .users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or_else(|| RepositoryError::NotFound("Record not found".to_string()))?;
            if let Some(name) = &changes.name {
                user.name = Some(name.clone());
            }
            if let Some(username) = &changes.username {
                user.username.clone_from(username);
            }
            if let Some(image) = &changes.image {
                user.image = Some(image.clone());
            }
            if let Some(user_type) = &changes.user_type {
                user.user_type.clone_from(user_type);
            }
            user.updated_at = changes.updated_at;
            Ok(user.clone())
        })
    }
}

impl LinkedAccountRepository for MemoryStore {
    fn find_by_provider_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<LinkedAccount>, RepositoryError> {
        Ok(self.with(|t| {
            t.accounts
                .iter()
                .find(|a| a.provider == provider && a.provider_account_id == provider_account_id)
                .cloned()
        }))
    }

    fn find_latest_for_user(
        &self,
        user_id: Uuid,
        providers: &[&str],
    ) -> Result<Option<LinkedAccount>, RepositoryError> {
        Ok(self.with(|t| {
            t.accounts
                .iter()
                .filter(|a| a.user_id == user_id)
                .filter(|a| providers.is_empty() || providers.contains(&a.provider.as_str()))
                .max_by(|a, b| (a.updated_at, a.id).cmp(&(b.updated_at, b.id)))
                .cloned()
        }))
    }

    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<LinkedAccount>, RepositoryError> {
        Ok(self.with(|t| {
            t.accounts
                .iter()
                .filter(|a| a.user_id == user_id)
                .cloned()
                .collect()
        }))
    }

    fn create(&self, new_account: &NewLinkedAccount) -> Result<LinkedAccount, RepositoryError> {
        self.with(|t| {
            if t.accounts.iter().any(|a| {
                a.provider == new_account.provider
                    && a.provider_account_id == new_account.provider_account_id
            }) {
                return Err(RepositoryError::UniqueViolation(
                    LINKED_ACCOUNTS_PROVIDER_KEY.to_string(),
                ));
            }
            if !t.users.iter().any(|u| u.id == new_account.user_id) {
                return Err(RepositoryError::ForeignKeyViolation(
                    "linked_accounts_user_id_fkey".to_string(),
                ));
            }
            let now = Utc::now();
            let account = LinkedAccount {
                id: Uuid::new_v4(),
                user_id: new_account.user_id,
                account_type: new_account.account_type.clone(),
                provider: new_account.provider.clone(),
                provider_account_id: new_account.provider_account_id.clone(),
                description: None,
                access_token: new_account.access_token.clone(),
                refresh_token: None,
                expires_at: new_account.expires_at,
                token_type: new_account.token_type.clone(),
                scope: None,
                user_type: new_account.user_type.clone(),
                created_at: now,
                updated_at: now,
            };
            t.accounts.push(account.clone());
            Ok(account)
        })
    }

    fn refresh(
        &self,
        id: Uuid,
        changes: &RefreshLinkedAccount,
    ) -> Result<LinkedAccount, RepositoryError> {
        self.with(|t| {
            let account = t
                .accounts
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| RepositoryError::NotFound("Record not found".to_string()))?;
            if let Some(token) = &changes.access_token {
                account.access_token = Some(token.clone());
            }
            if let Some(expires_at) = changes.expires_at {
                account.expires_at = Some(expires_at);
            }
            if let Some(token_type) = &changes.token_type {
                account.token_type = Some(token_type.clone());
            }
            if let Some(user_type) = &changes.user_type {
                account.user_type = Some(user_type.clone());
            }
            account.updated_at = changes.updated_at;
            Ok(account.clone())
        })
    }
}

impl MagicLinkRepository for MemoryStore {
    fn create(&self, new_link: &NewMagicLink) -> Result<MagicLink, RepositoryError> {
        self.with(|t| {
            if t.magic_links.iter().any(|m| m.token == new_link.token) {
                return Err(RepositoryError::UniqueViolation(
                    MAGIC_LINKS_TOKEN_KEY.to_string(),
                ));
            }
            let link = MagicLink {
                id: Uuid::new_v4(),
                user_id: new_link.user_id,
                token: new_link.token,
                email: new_link.email.clone(),
                user_type: new_link.user_type.clone(),
                is_used: false,
                created_at: Utc::now(),
                expires_at: new_link.expires_at,
            };
            t.magic_links.push(link.clone());
            Ok(link)
        })
    }

    fn consume(
        &self,
        user_id: Uuid,
        email: &str,
        token: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        Ok(self.with(|t| {
            match t.magic_links.iter_mut().find(|m| {
                m.user_id == user_id && m.token == token && m.email == email && m.is_redeemable(now)
            }) {
                Some(link) => {
                    link.is_used = true;
                    true
                }
                None => false,
            }
        }))
    }

    fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.with(|t| t.magic_links.retain(|m| m.id != id));
        Ok(())
    }
}
