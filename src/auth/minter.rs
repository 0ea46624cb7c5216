use std::sync::Arc;

use influence_api::TokenPair;

use crate::auth::jwt::{IdentityClaims, JwtManager};
use crate::db::models::user::User;
use crate::db::repositories::LinkedAccountRepository;
use crate::error::AppError;

/// Derives a signed credential pair from an identity and its most recently
/// updated linked account.
#[derive(Clone)]
pub struct CredentialMinter {
    jwt: JwtManager,
    accounts: Arc<dyn LinkedAccountRepository>,
}

impl CredentialMinter {
    pub fn new(jwt: JwtManager, accounts: Arc<dyn LinkedAccountRepository>) -> Self {
        Self { jwt, accounts }
    }

    pub fn claims_for(&self, user: &User) -> Result<IdentityClaims, AppError> {
        let latest = self.accounts.find_latest_for_user(user.id, &[])?;

        Ok(IdentityClaims {
            email: user.email.clone(),
            name: user.name.clone(),
            user_type: user.user_type.clone(),
            provider: latest.as_ref().map(|a| a.provider.clone()),
            provider_account_id: latest.map(|a| a.provider_account_id),
        })
    }

    pub fn mint(&self, user: &User) -> Result<TokenPair, AppError> {
        let claims = self.claims_for(user)?;
        let pair = self.jwt.issue_pair(user.id, &claims)?;
        tracing::debug!(user_id = %user.id, provider = ?claims.provider, "Minted credentials");
        Ok(pair)
    }
}
