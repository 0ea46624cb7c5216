use crate::db::DbPool;
use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::magic_link::{MagicLink, NewMagicLink};
use crate::db::repositories::MagicLinkRepository;
use crate::db::schema::magic_links;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

pub struct PgMagicLinkRepository {
    pool: DbPool,
}

impl PgMagicLinkRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl MagicLinkRepository for PgMagicLinkRepository {
    fn create(&self, new_link: &NewMagicLink) -> Result<MagicLink, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        diesel::insert_into(magic_links::table)
            .values(new_link)
            .returning(MagicLink::as_returning())
            .get_result(&mut conn)
            .map_err(Into::into)
    }

    fn consume(
        &self,
        user_id: Uuid,
        email: &str,
        token: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        // Single UPDATE ... WHERE is_used = false: concurrent redemptions
        // serialize on the row lock and only one sees an affected row.
        let affected = diesel::update(
            magic_links::table
                .filter(magic_links::user_id.eq(user_id))
                .filter(magic_links::token.eq(token))
                .filter(magic_links::email.eq(email))
                .filter(magic_links::is_used.eq(false))
                .filter(magic_links::expires_at.gt(now)),
        )
        .set(magic_links::is_used.eq(true))
        .execute(&mut conn)?;

        Ok(affected == 1)
    }

    fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = get_connection(&self.pool)?;

        diesel::delete(magic_links::table.find(id)).execute(&mut conn)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::test_pool;
    use crate::db::models::user::NewUser;
    use crate::db::repositories::{PgUserRepository, UserRepository};
    use chrono::Duration;

    fn issue(pool: &DbPool, expires_at: DateTime<Utc>) -> MagicLink {
        let unique = Uuid::new_v4();
        let user = PgUserRepository::new(pool.clone())
            .create(&NewUser {
                email: Some(format!("magic_{unique}@example.com")),
                username: format!("magic_{unique}"),
                name: None,
                user_type: "influencer".to_string(),
            })
            .expect("create user");

        PgMagicLinkRepository::new(pool.clone())
            .create(&NewMagicLink {
                user_id: user.id,
                token: Uuid::new_v4(),
                email: user.email.unwrap_or_default(),
                user_type: "influencer".to_string(),
                expires_at,
            })
            .expect("create magic link")
    }

    #[test]
    #[ignore = "requires a running Postgres at DATABASE_URL"]
    fn consume_succeeds_once() {
        let pool = test_pool();
        let repo = PgMagicLinkRepository::new(pool.clone());
        let link = issue(&pool, Utc::now() + Duration::hours(24));

        let now = Utc::now();
        assert!(repo.consume(link.user_id, &link.email, link.token, now).unwrap());
        assert!(!repo.consume(link.user_id, &link.email, link.token, now).unwrap());
    }

    #[test]
    #[ignore = "requires a running Postgres at DATABASE_URL"]
    fn consume_rejects_expired_and_foreign_email() {
        let pool = test_pool();
        let repo = PgMagicLinkRepository::new(pool.clone());

        let expired = issue(&pool, Utc::now() - Duration::minutes(1));
        assert!(
            !repo
                .consume(expired.user_id, &expired.email, expired.token, Utc::now())
                .unwrap()
        );

        let live = issue(&pool, Utc::now() + Duration::hours(1));
        assert!(
            !repo
                .consume(live.user_id, "someone@else.com", live.token, Utc::now())
                .unwrap()
        );
    }

    #[test]
    #[ignore = "requires a running Postgres at DATABASE_URL"]
    fn concurrent_consume_has_single_winner() {
        let pool = test_pool();
        let link = issue(&pool, Utc::now() + Duration::hours(1));

        let wins = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let repo = PgMagicLinkRepository::new(pool.clone());
                    let link = &link;
                    scope.spawn(move || {
                        repo.consume(link.user_id, &link.email, link.token, Utc::now())
                            .unwrap()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count()
        });

        assert_eq!(wins, 1);
    }
}
