//! Social login: turns an OAuth authorization code into a local identity
//! with a linked provider account.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::auth::identity::find_or_create_by_email;
use crate::auth::user_type::UserType;
use crate::db::models::linked_account::{LinkedAccount, NewLinkedAccount, RefreshLinkedAccount};
use crate::db::models::user::{UpdateUser, User};
use crate::db::repositories::{LINKED_ACCOUNTS_PROVIDER_KEY, LinkedAccountRepository, UserRepository};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLivedToken {
    pub access_token: String,
    pub provider_account_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongLivedToken {
    pub access_token: String,
    pub token_type: Option<String>,
    /// Seconds until expiry.
    pub expires_in: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub username: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// The three upstream stages of a provider login. A failing stage returns
/// [`AppError::Upstream`] carrying the provider's payload.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn name(&self) -> &str;

    fn authorization_url(&self) -> Result<String, AppError>;

    async fn exchange_code(&self, code: &str) -> Result<ShortLivedToken, AppError>;

    async fn upgrade_token(&self, short_lived: &ShortLivedToken) -> Result<LongLivedToken, AppError>;

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, AppError>;
}

#[derive(Clone)]
pub struct SocialLoginService {
    users: Arc<dyn UserRepository>,
    accounts: Arc<dyn LinkedAccountRepository>,
    provider: Arc<dyn OAuthProvider>,
    email_domain: String,
}

impl SocialLoginService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        accounts: Arc<dyn LinkedAccountRepository>,
        provider: Arc<dyn OAuthProvider>,
        email_domain: impl Into<String>,
    ) -> Self {
        Self {
            users,
            accounts,
            provider,
            email_domain: email_domain.into(),
        }
    }

    pub fn authorization_url(&self) -> Result<String, AppError> {
        self.provider.authorization_url()
    }

    /// Runs the provider chain, then refreshes the existing linkage or links
    /// the external account to a (possibly new) identity. Nothing is written
    /// unless all three stages succeed.
    pub async fn link_social_account(
        &self,
        code: &str,
        requested_user_type: Option<&str>,
    ) -> Result<User, AppError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::validation("code is required"));
        }
        let user_type = UserType::from_request(requested_user_type)?;
        let provider = self.provider.name();

        let short_lived = self.provider.exchange_code(code).await?;
        let long_lived = self.provider.upgrade_token(&short_lived).await?;
        let profile = self.provider.fetch_profile(&long_lived.access_token).await?;

        let external_id = short_lived.provider_account_id.as_str();
        let now = Utc::now();
        let changes = RefreshLinkedAccount {
            access_token: Some(long_lived.access_token.clone()),
            expires_at: long_lived.expires_in.map(|secs| now + Duration::seconds(secs)),
            token_type: long_lived.token_type.clone(),
            user_type: Some(user_type.as_str().to_string()),
            updated_at: now,
        };

        if let Some(account) = self.accounts.find_by_provider_account(provider, external_id)? {
            return self.refresh_existing(account, &changes);
        }

        let username = match profile.username.trim() {
            "" => format!("{provider}_{external_id}"),
            name => name.to_lowercase(),
        };
        let email = format!("{username}@{}", self.email_domain);
        let display_name = profile.name.as_deref().unwrap_or(&username).to_string();
        let user = find_or_create_by_email(
            self.users.as_ref(),
            &email,
            &username,
            Some(&display_name),
            user_type,
        )?;
        let user = match (&user.image, profile.picture) {
            (None, Some(picture)) => self.seed_image(user, picture),
            _ => user,
        };

        let new_account = NewLinkedAccount {
            user_id: user.id,
            account_type: "oauth".to_string(),
            provider: provider.to_string(),
            provider_account_id: external_id.to_string(),
            access_token: changes.access_token.clone(),
            expires_at: changes.expires_at,
            token_type: changes.token_type.clone(),
            user_type: changes.user_type.clone(),
        };

        match self.accounts.create(&new_account) {
            Ok(account) => {
                tracing::info!(user_id = %user.id, account_id = %account.id, provider, "Linked social account");
                Ok(user)
            }
            Err(e) if e.violates(LINKED_ACCOUNTS_PROVIDER_KEY) => {
                tracing::warn!(provider, external_id, "Social account linked concurrently, refreshing");
                let account = self
                    .accounts
                    .find_by_provider_account(provider, external_id)?
                    .ok_or_else(|| AppError::internal("linked account missing after conflict"))?;
                self.refresh_existing(account, &changes)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Best effort: a rejected picture leaves the identity without an image.
    fn seed_image(&self, user: User, picture: String) -> User {
        let changes = UpdateUser {
            image: Some(picture),
            ..UpdateUser::default()
        };
        match self.users.update(user.id, &changes) {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Profile picture not stored");
                user
            }
        }
    }

    fn refresh_existing(
        &self,
        account: LinkedAccount,
        changes: &RefreshLinkedAccount,
    ) -> Result<User, AppError> {
        let account = self.accounts.refresh(account.id, changes)?;
        tracing::info!(user_id = %account.user_id, account_id = %account.id, "Refreshed social account");

        self.users
            .find_by_id(account.user_id)?
            .ok_or_else(|| AppError::not_found("User"))
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::testing::{MockProvider, Stage};
    use super::*;
    use crate::db::error::RepositoryError;
    use crate::db::memory::MemoryStore;

    fn service(store: &Arc<MemoryStore>, provider: MockProvider) -> SocialLoginService {
        SocialLoginService::new(store.clone(), store.clone(), Arc::new(provider), "influenceai.com")
    }

    #[tokio::test]
    async fn first_login_creates_identity_and_account() {
        let store = Arc::new(MemoryStore::new());
        let social = service(&store, MockProvider::new("1789", "Creator.One"));

        let user = social.link_social_account("code", Some("Brand")).await.unwrap();

        assert_eq!(user.email.as_deref(), Some("creator.one@influenceai.com"));
        assert_eq!(user.username, "creator.one");
        assert_eq!(user.name.as_deref(), Some("creator.one"));
        assert_eq!(user.user_type, "brand");

        let accounts = store.accounts();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].user_id, user.id);
        assert_eq!(accounts[0].account_type, "oauth");
        assert_eq!(accounts[0].provider, "instagram");
        assert_eq!(accounts[0].provider_account_id, "1789");
        assert_eq!(accounts[0].access_token.as_deref(), Some("long-lived-1"));
        assert_eq!(accounts[0].user_type.as_deref(), Some("brand"));
        assert!(accounts[0].expires_at.is_some());
    }

    #[tokio::test]
    async fn profile_picture_seeds_a_missing_image() {
        let store = Arc::new(MemoryStore::new());
        let provider = MockProvider::new("1789", "creator").with_picture("https://cdn.example/c.jpg");
        let social = service(&store, provider);

        let user = social.link_social_account("code", None).await.unwrap();

        assert_eq!(user.image.as_deref(), Some("https://cdn.example/c.jpg"));
        assert_eq!(store.users()[0].image.as_deref(), Some("https://cdn.example/c.jpg"));
    }

    /// Rejects profile updates the way Postgres rejects an oversized value.
    struct NoUpdates(Arc<MemoryStore>);

    impl UserRepository for NoUpdates {
        fn find_by_id(&self, id: uuid::Uuid) -> Result<Option<User>, RepositoryError> {
            UserRepository::find_by_id(self.0.as_ref(), id)
        }

        fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
            UserRepository::find_by_email(self.0.as_ref(), email)
        }

        fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
            UserRepository::find_by_username(self.0.as_ref(), username)
        }

        fn create(&self, new_user: &crate::db::models::user::NewUser) -> Result<User, RepositoryError> {
            UserRepository::create(self.0.as_ref(), new_user)
        }

        fn update(&self, _id: uuid::Uuid, _changes: &UpdateUser) -> Result<User, RepositoryError> {
            Err(RepositoryError::DatabaseError("value too long for type".to_string()))
        }
    }

    #[tokio::test]
    async fn rejected_picture_does_not_block_linking() {
        let store = Arc::new(MemoryStore::new());
        let long_url = format!("https://scontent.cdninstagram.com/v/t51.jpg?{}", "oh=ab12&".repeat(60));
        let social = SocialLoginService::new(
            Arc::new(NoUpdates(store.clone())),
            store.clone(),
            Arc::new(MockProvider::new("1789", "creator").with_picture(&long_url)),
            "influenceai.com",
        );

        let user = social.link_social_account("code", None).await.unwrap();
        assert_eq!(user.image, None);
        assert_eq!(store.accounts().len(), 1);

        // A second login finds the linkage and succeeds again.
        let again = social.link_social_account("code", None).await.unwrap();
        assert_eq!(again.id, user.id);
        assert_eq!(store.accounts().len(), 1);
    }

    #[tokio::test]
    async fn repeated_login_refreshes_the_single_row() {
        let store = Arc::new(MemoryStore::new());
        let first = service(&store, MockProvider::new("1789", "creator"))
            .link_social_account("code-1", None)
            .await
            .unwrap();
        let before = store.accounts()[0].clone();

        let second = service(&store, MockProvider::new("1789", "creator").with_token("long-lived-2"))
            .link_social_account("code-2", Some("brand"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        let accounts = store.accounts();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].id, before.id);
        assert_eq!(accounts[0].access_token.as_deref(), Some("long-lived-2"));
        assert_eq!(accounts[0].user_type.as_deref(), Some("brand"));
        assert!(accounts[0].updated_at >= before.updated_at);
        assert_eq!(store.users().len(), 1);
    }

    #[tokio::test]
    async fn any_failing_stage_aborts_without_writes() {
        for stage in [Stage::Exchange, Stage::Upgrade, Stage::Profile] {
            let store = Arc::new(MemoryStore::new());
            let social = service(&store, MockProvider::new("1789", "creator").failing_at(stage));

            let err = social.link_social_account("code", None).await.unwrap_err();

            match err {
                AppError::Upstream(payload) => {
                    assert_eq!(payload, MockProvider::error_payload(stage))
                }
                other => panic!("unexpected error {other:?}"),
            }
            assert!(store.users().is_empty());
            assert!(store.accounts().is_empty());
        }
    }

    #[tokio::test]
    async fn missing_code_is_a_validation_error() {
        let store = Arc::new(MemoryStore::new());
        let social = service(&store, MockProvider::new("1789", "creator"));

        assert!(matches!(
            social.link_social_account("  ", None).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn magic_link_user_with_same_username_is_not_taken_over() {
        let store = Arc::new(MemoryStore::new());
        let existing = find_or_create_by_email(
            store.as_ref(),
            "creator@gmail.com",
            "creator",
            None,
            UserType::Influencer,
        )
        .unwrap();

        let linked = service(&store, MockProvider::new("1789", "creator"))
            .link_social_account("code", None)
            .await
            .unwrap();

        assert_ne!(linked.id, existing.id);
        assert!(linked.username.starts_with("creator_"));
        assert_eq!(linked.email.as_deref(), Some("creator@influenceai.com"));
    }

    /// Hides the linkage from the first lookup, as if another request
    /// inserted it between our read and our insert.
    struct LateWinner {
        store: Arc<MemoryStore>,
        hidden: AtomicBool,
    }

    impl LinkedAccountRepository for LateWinner {
        fn find_by_provider_account(
            &self,
            provider: &str,
            provider_account_id: &str,
        ) -> Result<Option<LinkedAccount>, RepositoryError> {
            if self.hidden.swap(false, Ordering::SeqCst) {
                return Ok(None);
            }
            self.store.find_by_provider_account(provider, provider_account_id)
        }

        fn find_latest_for_user(
            &self,
            user_id: uuid::Uuid,
            providers: &[&str],
        ) -> Result<Option<LinkedAccount>, RepositoryError> {
            self.store.find_latest_for_user(user_id, providers)
        }

        fn list_for_user(&self, user_id: uuid::Uuid) -> Result<Vec<LinkedAccount>, RepositoryError> {
            self.store.list_for_user(user_id)
        }

        fn create(&self, new_account: &NewLinkedAccount) -> Result<LinkedAccount, RepositoryError> {
            LinkedAccountRepository::create(self.store.as_ref(), new_account)
        }

        fn refresh(
            &self,
            id: uuid::Uuid,
            changes: &RefreshLinkedAccount,
        ) -> Result<LinkedAccount, RepositoryError> {
            self.store.refresh(id, changes)
        }
    }

    #[tokio::test]
    async fn insert_race_resolves_by_refreshing_the_winner() {
        let store = Arc::new(MemoryStore::new());
        let winner = service(&store, MockProvider::new("1789", "creator"))
            .link_social_account("code-1", None)
            .await
            .unwrap();

        let racing = SocialLoginService::new(
            store.clone(),
            Arc::new(LateWinner {
                store: store.clone(),
                hidden: AtomicBool::new(true),
            }),
            Arc::new(MockProvider::new("1789", "creator").with_token("long-lived-2")),
            "influenceai.com",
        );

        let user = racing.link_social_account("code-2", None).await.unwrap();

        assert_eq!(user.id, winner.id);
        let accounts = store.accounts();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].access_token.as_deref(), Some("long-lived-2"));
    }
}
