use diesel::dsl::now;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::IdentityResolver;
use crate::schema::{sessions, users};

/// Resolves identities from the `sessions` table maintained by the
/// authentication service and the `users` table.
pub struct DieselIdentityResolver {
    pool: DbPool,
}

impl DieselIdentityResolver {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl IdentityResolver for DieselIdentityResolver {
    fn resolve(&self, session_token: Option<&str>) -> Result<Uuid, DomainError> {
        let token = session_token
            .filter(|t| !t.is_empty())
            .ok_or(DomainError::Unauthenticated)?;
        let mut conn = self.pool.get()?;

        let username = sessions::table
            .filter(sessions::token.eq(token))
            .filter(sessions::expires_at.gt(now))
            .select(sessions::username)
            .first::<String>(&mut conn)
            .optional()?
            .ok_or(DomainError::Unauthenticated)?;

        users::table
            .filter(users::username.eq(&username))
            .select(users::id)
            .first::<Uuid>(&mut conn)
            .optional()?
            .ok_or(DomainError::UnknownUser)
    }
}
