use crate::db::DbPool;
use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::user::{NewUser, UpdateUser, User};
use crate::db::repositories::UserRepository;
use crate::db::schema::users;
use diesel::prelude::*;
use uuid::Uuid;

pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PgUserRepository {
    fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        users::table
            .find(id)
            .select(User::as_select())
            .first(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        users::table
            .filter(users::email.eq(email))
            .select(User::as_select())
            .first(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        diesel::insert_into(users::table)
            .values(new_user)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .map_err(Into::into)
    }

    fn update(&self, id: Uuid, changes: &UpdateUser) -> Result<User, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        diesel::update(users::table.find(id))
            .set(changes)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .map_err(Into::into)
    }
}
