use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::jwt::JwtManager;
use crate::auth::magic_link::MagicLinkService;
use crate::auth::minter::CredentialMinter;
use crate::auth::social::{OAuthProvider, SocialLoginService};
use crate::db::repositories::{LinkedAccountRepository, MagicLinkRepository, UserRepository};
use crate::instagram::{GraphClient, InstagramService};
use crate::mailer::MagicLinkMailer;
use crate::profile::ProfileService;

/// Storage ports the services run against.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub accounts: Arc<dyn LinkedAccountRepository>,
    pub magic_links: Arc<dyn MagicLinkRepository>,
}

/// Shared handler state. Every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub jwt: JwtManager,
    pub minter: CredentialMinter,
    pub magic_links: MagicLinkService,
    pub social: SocialLoginService,
    pub profile: ProfileService,
    pub instagram: InstagramService,
}

impl AppState {
    pub fn new(
        jwt: JwtManager,
        repos: Repositories,
        mailer: Arc<dyn MagicLinkMailer>,
        provider: Arc<dyn OAuthProvider>,
        graph: GraphClient,
        social_email_domain: &str,
    ) -> Self {
        Self {
            minter: CredentialMinter::new(jwt.clone(), repos.accounts.clone()),
            magic_links: MagicLinkService::new(
                repos.users.clone(),
                repos.magic_links.clone(),
                mailer,
            ),
            social: SocialLoginService::new(
                repos.users.clone(),
                repos.accounts.clone(),
                provider,
                social_email_domain,
            ),
            profile: ProfileService::new(repos.users.clone(), repos.accounts.clone()),
            instagram: InstagramService::new(repos.accounts, graph),
            jwt,
        }
    }
}

impl FromRef<AppState> for JwtManager {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}
