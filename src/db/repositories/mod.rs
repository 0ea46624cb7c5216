//! Storage ports and their Postgres implementations.
//!
//! Every cross-request guarantee lives in the store: the unique constraints
//! below and the conditional update behind [`MagicLinkRepository::consume`].
//! Services never coordinate through in-process locks.

pub mod linked_account_repository;
pub mod magic_link_repository;
pub mod user_repository;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::error::RepositoryError;
use crate::db::models::linked_account::{LinkedAccount, NewLinkedAccount, RefreshLinkedAccount};
use crate::db::models::magic_link::{MagicLink, NewMagicLink};
use crate::db::models::user::{NewUser, UpdateUser, User};

pub use linked_account_repository::PgLinkedAccountRepository;
pub use magic_link_repository::PgMagicLinkRepository;
pub use user_repository::PgUserRepository;

pub const USERS_EMAIL_KEY: &str = "users_email_key";
pub const USERS_USERNAME_KEY: &str = "users_username_key";
pub const LINKED_ACCOUNTS_PROVIDER_KEY: &str = "linked_accounts_provider_account_key";
pub const MAGIC_LINKS_TOKEN_KEY: &str = "magic_links_token_key";

pub trait UserRepository: Send + Sync {
    fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;
    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
    fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError>;
    fn update(&self, id: Uuid, changes: &UpdateUser) -> Result<User, RepositoryError>;
}

pub trait LinkedAccountRepository: Send + Sync {
    fn find_by_provider_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<LinkedAccount>, RepositoryError>;

    /// Most recently updated account of `user_id` whose provider is in
    /// `providers` (any provider when empty). Ties on `updated_at` resolve to
    /// the greatest id.
    fn find_latest_for_user(
        &self,
        user_id: Uuid,
        providers: &[&str],
    ) -> Result<Option<LinkedAccount>, RepositoryError>;

    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<LinkedAccount>, RepositoryError>;

    /// Fails with [`RepositoryError::UniqueViolation`] on
    /// [`LINKED_ACCOUNTS_PROVIDER_KEY`] if the external account is already linked.
    fn create(&self, new_account: &NewLinkedAccount) -> Result<LinkedAccount, RepositoryError>;

    fn refresh(
        &self,
        id: Uuid,
        changes: &RefreshLinkedAccount,
    ) -> Result<LinkedAccount, RepositoryError>;
}

pub trait MagicLinkRepository: Send + Sync {
    fn create(&self, new_link: &NewMagicLink) -> Result<MagicLink, RepositoryError>;

    /// Atomically flips `is_used` for the row matching every argument, provided
    /// it is unused and `expires_at > now`. Returns whether a row was consumed.
    fn consume(
        &self,
        user_id: Uuid,
        email: &str,
        token: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;

    fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}
