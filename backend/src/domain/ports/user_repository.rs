//! Port for user persistence.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::user::{NewUser, User, UserId, UserPatch, Username};

/// Errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection {
        /// Adapter-level detail.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query {
        /// Adapter-level detail.
        message: String,
    },
    /// A unique column would be duplicated.
    #[error("user {field} already taken")]
    Conflict {
        /// Which unique field collided (`email`, `username`, or `googleId`).
        field: String,
    },
}

impl UserRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a conflict error for the given unique field.
    pub fn conflict(field: impl Into<String>) -> Self {
        Self::Conflict {
            field: field.into(),
        }
    }
}

/// Port for user storage and retrieval.
///
/// Uniqueness of `email`, `username`, and `google_id` is enforced by the
/// adapter and surfaced as [`UserRepositoryError::Conflict`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user and return the stored row.
    async fn insert(&self, id: UserId, user: &NewUser) -> Result<User, UserRepositoryError>;

    /// Fetch one user by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch one user by linked Google identity.
    async fn find_by_google_id(
        &self,
        google_id: &str,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch one user by username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Apply a patch, touching `updated_at`. Returns the updated row, or
    /// `None` when the user does not exist.
    async fn update(
        &self,
        id: &UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Delete a user (their pieces cascade). Returns whether a row was hit.
    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError>;
}

/// In-memory implementation backing tests and the no-database fallback.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn unique_collision(existing: &User, candidate: &User) -> Option<&'static str> {
    if existing.id == candidate.id {
        return None;
    }
    if existing.email == candidate.email {
        return Some("email");
    }
    if existing.username == candidate.username {
        return Some("username");
    }
    match (&existing.google_id, &candidate.google_id) {
        (Some(a), Some(b)) if a == b => Some("googleId"),
        _ => None,
    }
}

fn apply_patch(user: &mut User, patch: &UserPatch) {
    if let Some(first_name) = &patch.first_name {
        user.first_name = first_name.clone();
    }
    if let Some(last_name) = &patch.last_name {
        user.last_name = last_name.clone();
    }
    if let Some(email) = &patch.email {
        user.email = email.clone();
    }
    if let Some(location) = &patch.location {
        user.location = location.clone();
    }
    if let Some(title) = &patch.title {
        user.title = title.clone();
    }
    if let Some(bio) = &patch.bio {
        user.bio = bio.clone();
    }
    if let Some(website) = &patch.website {
        user.website = website.clone();
    }
    if let Some(socials) = &patch.socials {
        user.socials = socials.clone();
    }
    if let Some(username) = &patch.username {
        user.username = username.clone();
    }
    if let Some(profile_picture) = &patch.profile_picture {
        user.profile_picture = Some(profile_picture.clone());
    }
    user.updated_at = Utc::now();
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, id: UserId, user: &NewUser) -> Result<User, UserRepositoryError> {
        let now = Utc::now();
        let stored = User {
            id,
            google_id: user.google_id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            location: user.location.clone(),
            title: user.title.clone(),
            bio: user.bio.clone(),
            website: user.website.clone(),
            socials: user.socials.clone(),
            username: user.username.clone(),
            profile_picture: user.profile_picture.clone(),
            created_at: now,
            updated_at: now,
        };
        let mut users = self
            .users
            .lock()
            .map_err(|_| UserRepositoryError::query("user store poisoned"))?;
        for existing in users.values() {
            if let Some(field) = unique_collision(existing, &stored) {
                return Err(UserRepositoryError::conflict(field));
            }
        }
        users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self
            .users
            .lock()
            .map_err(|_| UserRepositoryError::query("user store poisoned"))?
            .get(id)
            .cloned())
    }

    async fn find_by_google_id(
        &self,
        google_id: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(self
            .users
            .lock()
            .map_err(|_| UserRepositoryError::query("user store poisoned"))?
            .values()
            .find(|user| user.google_id.as_deref() == Some(google_id))
            .cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(self
            .users
            .lock()
            .map_err(|_| UserRepositoryError::query("user store poisoned"))?
            .values()
            .find(|user| user.username == *username)
            .cloned())
    }

    async fn update(
        &self,
        id: &UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| UserRepositoryError::query("user store poisoned"))?;
        let Some(mut candidate) = users.get(id).cloned() else {
            return Ok(None);
        };
        apply_patch(&mut candidate, patch);
        for existing in users.values() {
            if let Some(field) = unique_collision(existing, &candidate) {
                return Err(UserRepositoryError::conflict(field));
            }
        }
        users.insert(*id, candidate.clone());
        Ok(Some(candidate))
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserRepositoryError> {
        Ok(self
            .users
            .lock()
            .map_err(|_| UserRepositoryError::query("user store poisoned"))?
            .remove(id)
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserSocials;
    use rstest::rstest;

    fn new_user(email: &str, username: &str, google_id: Option<&str>) -> NewUser {
        NewUser {
            google_id: google_id.map(str::to_owned),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: email.to_owned(),
            location: String::new(),
            title: String::new(),
            bio: String::new(),
            website: String::new(),
            socials: UserSocials::default(),
            username: Username::new(username).expect("valid username"),
            profile_picture: None,
        }
    }

    #[tokio::test]
    async fn insert_then_lookup_by_each_key() {
        let repo = InMemoryUserRepository::new();
        let id = UserId::random();
        let stored = repo
            .insert(id, &new_user("ada@example.com", "clay_ada", Some("g-123")))
            .await
            .expect("insert");

        assert_eq!(
            repo.find_by_id(&id).await.expect("by id").map(|u| u.id),
            Some(stored.id)
        );
        assert!(repo
            .find_by_google_id("g-123")
            .await
            .expect("by google id")
            .is_some());
        let username = Username::new("clay_ada").expect("valid username");
        assert!(repo
            .find_by_username(&username)
            .await
            .expect("by username")
            .is_some());
    }

    #[rstest]
    #[case("ada@example.com", "other_user", None, "email")]
    #[case("other@example.com", "clay_ada", None, "username")]
    #[case("third@example.com", "third_user", Some("g-123"), "googleId")]
    #[tokio::test]
    async fn duplicate_unique_fields_conflict(
        #[case] email: &str,
        #[case] username: &str,
        #[case] google_id: Option<&str>,
        #[case] field: &str,
    ) {
        let repo = InMemoryUserRepository::new();
        repo.insert(
            UserId::random(),
            &new_user("ada@example.com", "clay_ada", Some("g-123")),
        )
        .await
        .expect("first insert");

        let error = repo
            .insert(UserId::random(), &new_user(email, username, google_id))
            .await
            .expect_err("duplicate");
        assert_eq!(error, UserRepositoryError::conflict(field));
    }

    #[tokio::test]
    async fn update_rejects_username_collisions() {
        let repo = InMemoryUserRepository::new();
        repo.insert(
            UserId::random(),
            &new_user("ada@example.com", "clay_ada", None),
        )
        .await
        .expect("insert");
        let other = UserId::random();
        repo.insert(other, &new_user("brin@example.com", "brin", None))
            .await
            .expect("insert");

        let patch = UserPatch {
            username: Some(Username::new("clay_ada").expect("valid username")),
            ..UserPatch::default()
        };
        let error = repo.update(&other, &patch).await.expect_err("collision");
        assert_eq!(error, UserRepositoryError::conflict("username"));
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_hit() {
        let repo = InMemoryUserRepository::new();
        let id = UserId::random();
        repo.insert(id, &new_user("ada@example.com", "clay_ada", None))
            .await
            .expect("insert");

        assert!(repo.delete(&id).await.expect("delete"));
        assert!(!repo.delete(&id).await.expect("second delete"));
    }
}
