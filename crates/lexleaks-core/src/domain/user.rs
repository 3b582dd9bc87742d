use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::DomainError;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 8;

/// User entity - an account that can author posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new non-admin user with generated ID and timestamps.
    pub fn new(username: String, email: Option<String>, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate registration input before the password is hashed.
    pub fn validate_registration(username: &str, password: &str) -> Result<(), DomainError> {
        let len = username.chars().count();
        if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
            return Err(DomainError::validation(
                "username",
                format!("must be between {USERNAME_MIN_LEN} and {USERNAME_MAX_LEN} characters"),
            ));
        }
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(DomainError::validation(
                "password",
                format!("must be at least {PASSWORD_MIN_LEN} characters"),
            ));
        }
        Ok(())
    }
}

/// Public projection of a user, embedded in post listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for Author {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// The resolved identity performing a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub username: String,
    pub is_admin: bool,
}

impl Actor {
    /// Authors may modify their own records; admins may modify anything.
    pub fn can_modify(&self, owner_id: Uuid) -> bool {
        self.is_admin || self.user_id == owner_id
    }

    pub fn require_admin(&self) -> Result<(), DomainError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_rejects_short_username() {
        let err = User::validate_registration("ab", "long-enough-password").unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "username", .. }));
    }

    #[test]
    fn test_registration_rejects_short_password() {
        let err = User::validate_registration("reporter", "short").unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "password", .. }));
    }

    #[test]
    fn test_actor_permissions() {
        let owner = Uuid::new_v4();
        let author = Actor {
            user_id: owner,
            username: "author".into(),
            is_admin: false,
        };
        let stranger = Actor {
            user_id: Uuid::new_v4(),
            username: "stranger".into(),
            is_admin: false,
        };
        let admin = Actor {
            user_id: Uuid::new_v4(),
            username: "editor".into(),
            is_admin: true,
        };

        assert!(author.can_modify(owner));
        assert!(!stranger.can_modify(owner));
        assert!(admin.can_modify(owner));
        assert!(stranger.require_admin().is_err());
        assert!(admin.require_admin().is_ok());
    }
}
