//! SeaORM entities mirroring the migration schema.

pub mod impact;
pub mod post;
pub mod push_subscription;
pub mod user;

use std::str::FromStr;

/// Parse an enum stored as text. Unknown values fall back to `default`
/// with a warning; the schema only ever receives values written by us.
pub(crate) fn parse_column<T: FromStr>(column: &'static str, raw: &str, default: T) -> T {
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(column, value = raw, "Unrecognized enum value in database");
        default
    })
}
