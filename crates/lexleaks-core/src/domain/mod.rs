//! Domain entities - the core business objects.

/// Error returned when a string does not name a variant of a closed domain enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value `{value}`, expected one of: {}", .expected.join(", "))]
pub struct UnknownVariant {
    pub value: String,
    pub expected: &'static [&'static str],
}

/// Declares a closed string enum stored as snake_case text in the database
/// and on the wire.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const VARIANTS: &'static [&'static str] = &[$($text),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    other => Err($crate::domain::UnknownVariant {
                        value: other.to_string(),
                        expected: Self::VARIANTS,
                    }),
                }
            }
        }
    };
}

mod impact;
mod post;
mod push_subscription;
mod user;

pub use impact::{Impact, ImpactChanges, ImpactFilter, ImpactLevel, ImpactStatus, ImpactType, NewImpact};
pub use post::{NewPost, Post, PostChanges, PostDetail, PostStatus, VerificationStatus};
pub use push_subscription::{
    NewPushSubscription, NotificationPreferences, NotificationTopic, PushSubscription,
};
pub use user::{Actor, Author, User};

/// Checks an optional free-text field against a maximum length in characters.
pub(crate) fn check_max_len(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), crate::DomainError> {
    match value {
        Some(v) if v.chars().count() > max => Err(crate::DomainError::validation(
            field,
            format!("must be at most {max} characters"),
        )),
        _ => Ok(()),
    }
}

/// Trims a required text field and rejects it if nothing is left.
pub(crate) fn require_text(
    field: &'static str,
    value: String,
    max: Option<usize>,
) -> Result<String, crate::DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::DomainError::validation(field, "cannot be empty"));
    }
    if let Some(max) = max {
        check_max_len(field, Some(trimmed), max)?;
    }
    Ok(trimmed.to_string())
}
