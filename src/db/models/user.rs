use crate::db::schema::users;
use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use uuid::Uuid;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub email: Option<String>,
    pub username: String,
    pub name: Option<String>,
    pub user_type: String,
}

#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
    pub username: String,
    pub name: Option<String>,
    pub user_type: String,
    pub email_verified: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile changes; `None` leaves the column untouched.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = users)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub username: Option<String>,
    pub image: Option<String>,
    pub user_type: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Default for UpdateUser {
    fn default() -> Self {
        Self {
            name: None,
            username: None,
            image: None,
            user_type: None,
            updated_at: Utc::now(),
        }
    }
}
