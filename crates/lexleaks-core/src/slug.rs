//! URL slug derivation.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::RepoError;
use crate::ports::PostRepository;

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("slug pattern is valid"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("separator pattern is valid"));

/// Used when a title has no word characters at all.
pub const FALLBACK_SLUG: &str = "post";

/// Derive the base slug for a title.
///
/// Lower-cases, drops everything except word characters, whitespace and
/// hyphens, collapses separator runs into one hyphen and trims hyphens from
/// both ends.
pub fn generate_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    let kept = DISALLOWED.replace_all(&lowered, "");
    let joined = SEPARATORS.replace_all(&kept, "-");
    let slug = joined.trim_matches('-');
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// Candidate slugs in order of preference: `base`, `base-1`, `base-2`, ...
pub fn candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(base.to_string()).chain((1u64..).map(move |n| format!("{base}-{n}")))
}

/// First candidate for `base` that is not in `taken`. Among the first
/// `taken.len() + 1` candidates at least one is free.
pub fn first_free(base: &str, taken: &HashSet<String>) -> String {
    candidates(base)
        .take(taken.len() + 1)
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Find the first free slug for `title` with a single repository lookup.
///
/// `current` is the slug the post already holds when renaming; it never
/// counts as taken, so renaming a post to a title that maps back onto its
/// own slug keeps that slug.
pub async fn resolve_unique_slug(
    posts: &dyn PostRepository,
    title: &str,
    current: Option<&str>,
) -> Result<String, RepoError> {
    let base = generate_slug(title);
    let mut taken: HashSet<String> = posts.slugs_with_base(&base).await?.into_iter().collect();
    if let Some(current) = current {
        taken.remove(current);
    }
    Ok(first_free(&base, &taken))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_title() {
        assert_eq!(generate_slug("Hello World!"), "hello-world");
    }

    #[test]
    fn test_collapses_and_trims_separators() {
        assert_eq!(generate_slug("  --Leaked:  Budget -- Memo--  "), "leaked-budget-memo");
        assert_eq!(generate_slug("snake_case stays"), "snake_case-stays");
    }

    #[test]
    fn test_keeps_unicode_word_characters() {
        assert_eq!(generate_slug("Économie Œuvre 2024"), "économie-œuvre-2024");
    }

    #[test]
    fn test_deterministic() {
        let title = "Minister's Offshore Accounts (Part 2)";
        assert_eq!(generate_slug(title), generate_slug(title));
        assert_eq!(generate_slug(title), "ministers-offshore-accounts-part-2");
    }

    #[test]
    fn test_punctuation_only_falls_back() {
        assert_eq!(generate_slug("?!?"), FALLBACK_SLUG);
    }

    #[test]
    fn test_candidates_order() {
        let first: Vec<_> = candidates("hello-world").take(3).collect();
        assert_eq!(first, vec!["hello-world", "hello-world-1", "hello-world-2"]);
    }

    fn taken(slugs: &[&str]) -> HashSet<String> {
        slugs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_free_skips_taken_candidates() {
        assert_eq!(first_free("memo", &taken(&[])), "memo");
        assert_eq!(first_free("memo", &taken(&["memo"])), "memo-1");
        assert_eq!(first_free("memo", &taken(&["memo", "memo-1", "memo-3"])), "memo-2");
    }

    #[test]
    fn test_first_free_ignores_unrelated_suffixes() {
        let slugs = taken(&["memo", "memo-draft", "memo-1-final"]);
        assert_eq!(first_free("memo", &slugs), "memo-1");
    }
}
