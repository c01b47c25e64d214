//! PostgreSQL-backed `UserRepository` implementation using Diesel.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::user::{NewUser, User, UserId, UserPatch, UserSocials, Username};

use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
///
/// Uniqueness of `email`, `username`, and `google_id` is enforced by unique
/// indexes; violations surface as [`UserRepositoryError::Conflict`] with the
/// offending field named.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserRepositoryError::connection(message)
        }
    }
}

/// Name the colliding unique field from a Postgres constraint name.
fn conflict_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(name) if name.contains("email") => "email",
        Some(name) if name.contains("username") => "username",
        Some(name) if name.contains("google") => "googleId",
        _ => "email",
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            UserRepositoryError::conflict(conflict_field(info.constraint_name()))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserRepositoryError::connection("database connection error")
        }
        DieselError::NotFound => UserRepositoryError::query("record not found"),
        _ => UserRepositoryError::query("database error"),
    }
}

/// Convert a database row to a domain user.
fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let username = Username::new(&row.username).map_err(|_| {
        UserRepositoryError::query(format!("stored username {:?} is invalid", row.username))
    })?;
    let socials: UserSocials = serde_json::from_value(row.socials).unwrap_or_else(|error| {
        tracing::warn!(user_id = %row.id, %error, "unreadable socials column, defaulting to empty");
        UserSocials::default()
    });

    Ok(User {
        id: UserId::from_uuid(row.id),
        google_id: row.google_id,
        first_name: row.first_name,
        last_name: row.last_name,
        email: row.email,
        location: row.location,
        title: row.title,
        bio: row.bio,
        website: row.website,
        socials,
        username,
        profile_picture: row.profile_picture,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, id: UserId, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let socials = serde_json::to_value(&user.socials)
            .map_err(|error| UserRepositoryError::query(error.to_string()))?;
        let new_row = NewUserRow {
            id: *id.as_uuid(),
            google_id: user.google_id.as_deref(),
            first_name: &user.first_name,
            last_name: &user.last_name,
            email: &user.email,
            location: &user.location,
            title: &user.title,
            bio: &user.bio,
            website: &user.website,
            socials: &socials,
            username: user.username.as_ref(),
            profile_picture: user.profile_picture.as_deref(),
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_user(row)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        result.map(row_to_user).transpose()
    }

    async fn find_by_google_id(
        &self,
        google_id: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result: Option<UserRow> = users::table
            .filter(users::google_id.eq(google_id))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        result.map(row_to_user).transpose()
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result: Option<UserRow> = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        result.map(row_to_user).transpose()
    }

    async fn update(
        &self,
        id: &UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let socials = patch
            .socials
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|error| UserRepositoryError::query(error.to_string()))?;
        let changeset = UserChangeset {
            first_name: patch.first_name.as_deref(),
            last_name: patch.last_name.as_deref(),
            email: patch.email.as_deref(),
            location: patch.location.as_deref(),
            title: patch.title.as_deref(),
            bio: patch.bio.as_deref(),
            website: patch.website.as_deref(),
            socials,
            username: patch.username.as_ref().map(AsRef::as_ref),
            profile_picture: patch.profile_picture.as_deref(),
            updated_at: Utc::now(),
        };

        let row: Option<UserRow> = diesel::update(users::table)
            .filter(users::id.eq(id.as_uuid()))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(users::table.filter(users::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row() -> UserRow {
        UserRow {
            id: uuid::Uuid::new_v4(),
            google_id: Some("g-123".to_owned()),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            location: "London".to_owned(),
            title: "studio potter".to_owned(),
            bio: String::new(),
            website: String::new(),
            socials: serde_json::json!({"instagram": "@clay_ada"}),
            username: "clay_ada".to_owned(),
            profile_picture: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn row_to_user_reads_socials_json() {
        let user = row_to_user(row()).expect("valid row");
        assert_eq!(user.socials.instagram.as_deref(), Some("@clay_ada"));
        assert_eq!(user.username.as_ref(), "clay_ada");
    }

    #[rstest]
    fn unreadable_socials_default_to_empty() {
        let mut bad = row();
        bad.socials = serde_json::json!([1, 2, 3]);
        let user = row_to_user(bad).expect("valid row");
        assert_eq!(user.socials, UserSocials::default());
    }

    #[rstest]
    fn invalid_stored_username_is_a_query_error() {
        let mut bad = row();
        bad.username = "has space".to_owned();
        let error = row_to_user(bad).expect_err("invalid row");
        assert!(matches!(error, UserRepositoryError::Query { .. }));
    }

    #[rstest]
    #[case(Some("users_email_key"), "email")]
    #[case(Some("users_username_key"), "username")]
    #[case(Some("users_google_id_key"), "googleId")]
    #[case(None, "email")]
    fn conflict_field_from_constraint_name(
        #[case] constraint: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(conflict_field(constraint), expected);
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::build("bad url"));
        assert!(matches!(repo_err, UserRepositoryError::Connection { .. }));
    }
}
