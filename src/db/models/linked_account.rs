use crate::db::schema::linked_accounts;
use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use influence_api::LinkedAccountResponse;
use uuid::Uuid;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = linked_accounts)]
pub struct NewLinkedAccount {
    pub user_id: Uuid,
    pub account_type: String,
    pub provider: String,
    pub provider_account_id: String,
    pub access_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub token_type: Option<String>,
    pub user_type: Option<String>,
}

#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = linked_accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LinkedAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_type: String,
    pub provider: String,
    pub provider_account_id: String,
    pub description: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub user_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Token material written back when an existing linkage logs in again.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = linked_accounts)]
pub struct RefreshLinkedAccount {
    pub access_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub token_type: Option<String>,
    pub user_type: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<LinkedAccount> for LinkedAccountResponse {
    fn from(account: LinkedAccount) -> Self {
        LinkedAccountResponse {
            id: account.id,
            account_type: account.account_type,
            description: account.description,
            provider: account.provider,
            provider_account_id: account.provider_account_id,
            user_type: account.user_type,
            created_at: account.created_at,
        }
    }
}
