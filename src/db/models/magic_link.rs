use crate::db::schema::magic_links;
use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable, Selectable};
use uuid::Uuid;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = magic_links)]
pub struct NewMagicLink {
    pub user_id: Uuid,
    pub token: Uuid,
    pub email: String,
    pub user_type: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = magic_links)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MagicLink {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: Uuid,
    pub email: String,
    pub user_type: String,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl MagicLink {
    /// Whether the token could still be redeemed at `now`.
    #[cfg(test)]
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && self.expires_at > now
    }
}
