//! User record data model.
//!
//! The Record Store owns identity: ids and creation timestamps are assigned
//! on insert and never supplied by callers. Inputs crossing into the domain
//! are validated here so the driven ports only ever see well-formed values.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validation errors raised while constructing user inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Identifier was zero or negative.
    NonPositiveId {
        /// Rejected value.
        id: i64,
    },
    /// Email was empty or only whitespace.
    EmptyEmail,
    /// Name was empty or only whitespace.
    EmptyName,
    /// An update supplied neither an email nor a name.
    NothingToUpdate,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveId { id } => write!(f, "user id must be > 0, got {id}"),
            Self::EmptyEmail => write!(f, "email must not be empty or blank"),
            Self::EmptyName => write!(f, "name must not be empty or blank"),
            Self::NothingToUpdate => write!(f, "nothing to update"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Store-assigned user identifier; always strictly positive.
///
/// # Examples
/// ```
/// use user_directory::domain::UserId;
///
/// assert!(UserId::new(7).is_ok());
/// assert!(UserId::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct UserId(i64);

impl UserId {
    /// Validate a raw identifier.
    pub fn new(id: i64) -> Result<Self, UserValidationError> {
        if id <= 0 {
            return Err(UserValidationError::NonPositiveId { id });
        }
        Ok(Self(id))
    }

    /// Raw numeric value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for i64 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<i64> for UserId {
    type Error = UserValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A persisted user record.
///
/// ## Invariants
/// - `id` was assigned by the Record Store.
/// - `email` is unique across records; the store enforces this.
/// - `created_at` is set once at creation.
///
/// Serialised as JSON when mirrored into the Accelerator Cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,
    /// Unique contact address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Creation timestamp assigned by the store.
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    email: String,
    name: String,
}

impl NewUser {
    /// Validate that both fields carry content.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        let name = name.into();
        if is_blank(&email) {
            return Err(UserValidationError::EmptyEmail);
        }
        if is_blank(&name) {
            return Err(UserValidationError::EmptyName);
        }
        Ok(Self { email, name })
    }

    /// Email to insert.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Name to insert.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Validated partial update for an existing user.
///
/// Blank fields are treated as "leave unchanged"; at least one field must
/// carry content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChanges {
    id: UserId,
    email: Option<String>,
    name: Option<String>,
}

impl UserChanges {
    /// Build a change set, rejecting no-op updates.
    pub fn new(
        id: UserId,
        email: Option<String>,
        name: Option<String>,
    ) -> Result<Self, UserValidationError> {
        let email = email.filter(|value| !is_blank(value));
        let name = name.filter(|value| !is_blank(value));
        if email.is_none() && name.is_none() {
            return Err(UserValidationError::NothingToUpdate);
        }
        Ok(Self { id, email, name })
    }

    /// Record the changes target.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Replacement email, if one was supplied.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Replacement name, if one was supplied.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Apply the changes to an existing record.
    pub fn apply_to(&self, user: &User) -> User {
        User {
            id: user.id,
            email: self.email.clone().unwrap_or_else(|| user.email.clone()),
            name: self.name.clone().unwrap_or_else(|| user.name.clone()),
            created_at: user.created_at,
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests;
