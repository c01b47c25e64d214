//! User identity and profile model.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 3;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 50;
/// Maximum length of the first or last name.
pub const NAME_MAX: usize = 100;

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Validation errors for user profile fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Username is empty once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Username shorter than [`USERNAME_MIN`].
    #[error("username must be at least {USERNAME_MIN} characters")]
    UsernameTooShort,
    /// Username longer than [`USERNAME_MAX`].
    #[error("username must be at most {USERNAME_MAX} characters")]
    UsernameTooLong,
    /// Username contains characters outside letters, digits, `_`, `-`, `.`.
    #[error("username may only contain letters, numbers, underscores, hyphens, or dots")]
    UsernameInvalidCharacters,
    /// Email fails the shape check.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// First name is empty or overlong.
    #[error("first name must be 1 to {NAME_MAX} characters")]
    InvalidFirstName,
    /// Last name is empty or overlong.
    #[error("last name must be 1 to {NAME_MAX} characters")]
    InvalidLastName,
}

static USERNAME_RE: OnceLock<Option<Regex>> = OnceLock::new();
static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();

// A pattern that fails to build rejects every candidate instead of
// panicking on first use.
fn username_regex() -> Option<&'static Regex> {
    USERNAME_RE
        .get_or_init(|| {
            // Length is enforced separately; this constrains allowed characters.
            Regex::new("^[A-Za-z0-9_.-]+$").ok()
        })
        .as_ref()
}

fn email_regex() -> Option<&'static Regex> {
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
}

/// Validated username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "clay_ada")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        let length = username.chars().count();
        if length < USERNAME_MIN {
            return Err(UserValidationError::UsernameTooShort);
        }
        if length > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong);
        }
        if !username_regex().is_some_and(|re| re.is_match(&username)) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(username))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validate an email address shape.
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email_regex().is_some_and(|re| re.is_match(email)) {
        Ok(())
    } else {
        Err(UserValidationError::InvalidEmail)
    }
}

fn validate_name(name: &str) -> bool {
    !name.trim().is_empty() && name.chars().count() <= NAME_MAX
}

/// Optional social media handles, stored as a JSONB object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSocials {
    /// Instagram handle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    /// Twitter handle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    /// Facebook handle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    /// YouTube channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    /// LinkedIn profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    /// Behance portfolio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behance: Option<String>,
}

/// Application user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// External OAuth identity link, when the account was created via Google.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Unique contact address.
    pub email: String,
    /// Free-text location.
    pub location: String,
    /// Free-text title (e.g. "studio potter").
    pub title: String,
    /// Free-text biography.
    pub bio: String,
    /// Personal website URL.
    pub website: String,
    /// Social media handles.
    pub socials: UserSocials,
    /// Unique handle.
    pub username: Username,
    /// Profile picture URL, when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Touched by every update.
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a user. Validated before persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// External OAuth identity link.
    pub google_id: Option<String>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Unique contact address.
    pub email: String,
    /// Free-text location.
    pub location: String,
    /// Free-text title.
    pub title: String,
    /// Free-text biography.
    pub bio: String,
    /// Personal website URL.
    pub website: String,
    /// Social media handles.
    pub socials: UserSocials,
    /// Unique handle.
    pub username: Username,
    /// Profile picture URL.
    pub profile_picture: Option<String>,
}

impl NewUser {
    /// Check field invariants before the user is persisted.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        validate_email(&self.email)?;
        if !validate_name(&self.first_name) {
            return Err(UserValidationError::InvalidFirstName);
        }
        if !validate_name(&self.last_name) {
            return Err(UserValidationError::InvalidLastName);
        }
        Ok(())
    }
}

/// Partial update for a user profile. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    /// Replacement given name.
    pub first_name: Option<String>,
    /// Replacement family name.
    pub last_name: Option<String>,
    /// Replacement contact address.
    pub email: Option<String>,
    /// Replacement location.
    pub location: Option<String>,
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement biography.
    pub bio: Option<String>,
    /// Replacement website URL.
    pub website: Option<String>,
    /// Replacement social handles.
    pub socials: Option<UserSocials>,
    /// Replacement username.
    pub username: Option<Username>,
    /// Replacement profile picture URL.
    pub profile_picture: Option<String>,
}

impl UserPatch {
    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Check invariants on the fields present in the patch.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if matches!(&self.first_name, Some(name) if !validate_name(name)) {
            return Err(UserValidationError::InvalidFirstName);
        }
        if matches!(&self.last_name, Some(name) if !validate_name(name)) {
            return Err(UserValidationError::InvalidLastName);
        }
        Ok(())
    }
}
