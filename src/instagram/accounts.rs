//! Picks the linked account an analytics request runs against.

use crate::db::models::linked_account::LinkedAccount;
use crate::db::repositories::LinkedAccountRepository;
use crate::error::AppError;

pub const INSTAGRAM: &str = "instagram";
pub const INSTAGRAM_BUSINESS: &str = "instagram_business";
pub const FACEBOOK: &str = "facebook";

const BUSINESS_FAMILY: &[&str] = &[INSTAGRAM_BUSINESS, FACEBOOK];
const KNOWN_PROVIDERS: &[&str] = &[INSTAGRAM, INSTAGRAM_BUSINESS, FACEBOOK];

/// Credentials for Graph API calls on behalf of one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstagramAccess {
    pub ig_id: String,
    pub access_token: String,
}

/// Provider filters to try in order for a credential's `provider` claim:
/// exact match, then its family, then any known provider.
pub fn lookup_order(provider_claim: Option<&str>) -> Vec<Vec<&str>> {
    let mut order: Vec<Vec<&str>> = Vec::new();

    if let Some(claim) = provider_claim.filter(|p| KNOWN_PROVIDERS.contains(p)) {
        order.push(vec![claim]);
        if BUSINESS_FAMILY.contains(&claim) {
            order.push(BUSINESS_FAMILY.to_vec());
        }
    }
    order.push(KNOWN_PROVIDERS.to_vec());

    order
}

pub fn resolve_account(
    accounts: &dyn LinkedAccountRepository,
    user_id: uuid::Uuid,
    provider_claim: Option<&str>,
) -> Result<LinkedAccount, AppError> {
    for providers in lookup_order(provider_claim) {
        if let Some(account) = accounts.find_latest_for_user(user_id, &providers)? {
            tracing::debug!(%user_id, provider = %account.provider, "Resolved analytics account");
            return Ok(account);
        }
    }

    Err(AppError::not_found("No Instagram account found for this user"))
}

/// Facebook linkages carry no Instagram id; accounts without a stored token
/// cannot call the Graph API.
pub fn access_for(account: &LinkedAccount) -> Result<InstagramAccess, AppError> {
    if account.provider == FACEBOOK {
        return Err(AppError::invalid_input(
            "Instagram business account details not available",
        ));
    }

    let access_token = account
        .access_token
        .clone()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::invalid_input("Instagram account not connected"))?;

    Ok(InstagramAccess {
        ig_id: account.provider_account_id.clone(),
        access_token,
    })
}
