use crate::db::DbPool;
use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::linked_account::{LinkedAccount, NewLinkedAccount, RefreshLinkedAccount};
use crate::db::repositories::LinkedAccountRepository;
use crate::db::schema::linked_accounts;
use diesel::prelude::*;
use uuid::Uuid;

pub struct PgLinkedAccountRepository {
    pool: DbPool,
}

impl PgLinkedAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl LinkedAccountRepository for PgLinkedAccountRepository {
    fn find_by_provider_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<LinkedAccount>, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        linked_accounts::table
            .filter(linked_accounts::provider.eq(provider))
            .filter(linked_accounts::provider_account_id.eq(provider_account_id))
            .select(LinkedAccount::as_select())
            .first(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    fn find_latest_for_user(
        &self,
        user_id: Uuid,
        providers: &[&str],
    ) -> Result<Option<LinkedAccount>, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = linked_accounts::table
            .filter(linked_accounts::user_id.eq(user_id))
            .into_boxed();

        if !providers.is_empty() {
            let providers: Vec<String> = providers.iter().map(|p| (*p).to_string()).collect();
            query = query.filter(linked_accounts::provider.eq_any(providers));
        }

        query
            .order((linked_accounts::updated_at.desc(), linked_accounts::id.desc()))
            .select(LinkedAccount::as_select())
            .first(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<LinkedAccount>, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        linked_accounts::table
            .filter(linked_accounts::user_id.eq(user_id))
            .order(linked_accounts::created_at.asc())
            .select(LinkedAccount::as_select())
            .load(&mut conn)
            .map_err(Into::into)
    }

    fn create(&self, new_account: &NewLinkedAccount) -> Result<LinkedAccount, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        diesel::insert_into(linked_accounts::table)
            .values(new_account)
            .returning(LinkedAccount::as_returning())
            .get_result(&mut conn)
            .map_err(Into::into)
    }

    fn refresh(
        &self,
        id: Uuid,
        changes: &RefreshLinkedAccount,
    ) -> Result<LinkedAccount, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        diesel::update(linked_accounts::table.find(id))
            .set(changes)
            .returning(LinkedAccount::as_returning())
            .get_result(&mut conn)
            .map_err(Into::into)
    }
}
