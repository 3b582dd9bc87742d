//! Post listing query model.
//!
//! A [`PostQuery`] bundles the optional filters, the sort order and the page
//! window for a listing. Stores either translate it to SQL or evaluate it in
//! memory with [`PostFilter::matches`] and [`PostSort::compare`]; both paths
//! share the impact bucketing in [`ImpactLevel`].

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Author, ImpactLevel, Post, PostStatus, VerificationStatus};

string_enum! {
    /// Listing order.
    #[derive(Default)]
    pub enum PostSort {
        #[default]
        Newest => "newest",
        Oldest => "oldest",
        Impact => "impact",
    }
}

/// Optional, AND-combined listing filters. `None` means no constraint.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    pub verification_status: Option<VerificationStatus>,
    pub category: Option<String>,
    /// Case-insensitive substring of the author's username.
    pub author: Option<String>,
    /// Earliest publication day, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Latest publication day, inclusive.
    pub date_to: Option<NaiveDate>,
    /// Case-insensitive substring of title, content or excerpt.
    pub search: Option<String>,
    pub impact_level: Option<ImpactLevel>,
    /// Drop rows without a publication timestamp.
    pub published_only: bool,
}

/// Offset pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 100,
        }
    }
}

impl Pagination {
    pub fn new(skip: u64, limit: u64) -> Self {
        Self { skip, limit }
    }

    /// Slice an already ordered sequence to this window.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(usize::try_from(self.skip).unwrap_or(usize::MAX))
            .take(usize::try_from(self.limit).unwrap_or(usize::MAX))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub filter: PostFilter,
    pub sort: PostSort,
    pub page: Pagination,
}

/// Listing row: a post projection with its author and impact count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub status: PostStatus,
    pub verification_status: VerificationStatus,
    pub category: Option<String>,
    pub document_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub author: Author,
    pub impact_count: u64,
}

impl PostSummary {
    pub fn new(post: &Post, author: Author, impact_count: u64) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            status: post.status,
            verification_status: post.verification_status,
            category: post.category.clone(),
            document_url: post.document_url.clone(),
            published_at: post.published_at,
            created_at: post.created_at,
            author,
            impact_count,
        }
    }

    pub fn impact_level(&self) -> ImpactLevel {
        ImpactLevel::from_count(self.impact_count)
    }
}

impl PostFilter {
    /// The public feed: published posts that carry a publication timestamp.
    pub fn published() -> Self {
        Self {
            status: Some(PostStatus::Published),
            published_only: true,
            ..Default::default()
        }
    }

    /// Publication window as `[from, until)` instants in UTC. `date_to` is
    /// inclusive of the whole day, so the upper bound is the next midnight.
    pub fn published_window(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let from = self.date_from.map(start_of_day);
        let until = self
            .date_to
            .map(|day| start_of_day(day) + TimeDelta::days(1));
        (from, until)
    }

    pub fn has_date_bounds(&self) -> bool {
        self.date_from.is_some() || self.date_to.is_some()
    }

    /// Evaluate every active filter against one post, its author and its
    /// total impact count.
    pub fn matches(&self, post: &Post, author: &Author, impact_count: u64) -> bool {
        if self.status.is_some_and(|s| post.status != s) {
            return false;
        }
        if self
            .verification_status
            .is_some_and(|v| post.verification_status != v)
        {
            return false;
        }
        if let Some(category) = &self.category {
            if post.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(needle) = &self.author {
            if !contains_ignore_case(&author.username, needle) {
                return false;
            }
        }
        if self.published_only && post.published_at.is_none() {
            return false;
        }
        if self.has_date_bounds() {
            let Some(published_at) = post.published_at else {
                return false;
            };
            let (from, until) = self.published_window();
            if from.is_some_and(|from| published_at < from) {
                return false;
            }
            if until.is_some_and(|until| published_at >= until) {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            let hit = contains_ignore_case(&post.title, needle)
                || contains_ignore_case(&post.content, needle)
                || post
                    .excerpt
                    .as_deref()
                    .is_some_and(|e| contains_ignore_case(e, needle));
            if !hit {
                return false;
            }
        }
        if let Some(level) = self.impact_level {
            if !level.contains(impact_count) {
                return false;
            }
        }
        true
    }
}

impl PostSort {
    /// Total order over summaries. Null `published_at` sorts last in both
    /// directions; remaining ties fall back to `created_at`, then `id`.
    pub fn compare(&self, a: &PostSummary, b: &PostSummary) -> Ordering {
        match self {
            Self::Newest => newest_first(a, b),
            Self::Oldest => nulls_last(a.published_at, b.published_at, Ordering::reverse)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id)),
            Self::Impact => b
                .impact_count
                .cmp(&a.impact_count)
                .then_with(|| newest_first(a, b)),
        }
    }
}

fn newest_first(a: &PostSummary, b: &PostSummary) -> Ordering {
    nulls_last(a.published_at, b.published_at, |o| o)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}

/// Orders present values by `direction(b.cmp(a))` and puts `None` after them.
fn nulls_last(
    a: Option<DateTime<Utc>>,
    b: Option<DateTime<Utc>>,
    direction: impl Fn(Ordering) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => direction(b.cmp(&a)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewPost;

    fn author(name: &str) -> Author {
        Author {
            id: Uuid::new_v4(),
            username: name.to_string(),
            is_admin: false,
            created_at: Utc::now(),
        }
    }

    fn post(title: &str, published_at: Option<DateTime<Utc>>) -> Post {
        let mut post = Post::new(
            Uuid::new_v4(),
            title.to_lowercase(),
            NewPost {
                title: title.to_string(),
                content: "Leaked memo on procurement".to_string(),
                excerpt: Some("Summary".to_string()),
                ..Default::default()
            },
            Utc::now(),
        );
        post.published_at = published_at;
        if published_at.is_some() {
            post.status = PostStatus::Published;
        }
        post
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = PostFilter::default();
        assert!(filter.matches(&post("Draft", None), &author("alice"), 0));
    }

    #[test]
    fn test_author_filter_is_case_insensitive_substring() {
        let filter = PostFilter {
            author: Some("LIC".into()),
            ..Default::default()
        };
        assert!(filter.matches(&post("A", None), &author("alice"), 0));
        assert!(!filter.matches(&post("A", None), &author("bob"), 0));
    }

    #[test]
    fn test_search_covers_title_content_and_excerpt() {
        let p = post("Offshore Accounts", None);
        let a = author("alice");
        for needle in ["offshore", "PROCUREMENT", "summ"] {
            let filter = PostFilter {
                search: Some(needle.into()),
                ..Default::default()
            };
            assert!(filter.matches(&p, &a, 0), "{needle} should match");
        }
        let filter = PostFilter {
            search: Some("nothing-like-this".into()),
            ..Default::default()
        };
        assert!(!filter.matches(&p, &a, 0));
    }

    #[test]
    fn test_date_bounds_are_inclusive_days_and_reject_null() {
        let filter = PostFilter {
            date_from: Some(day(2024, 3, 1)),
            date_to: Some(day(2024, 3, 31)),
            ..Default::default()
        };
        let a = author("alice");
        let first = day(2024, 3, 1).and_hms_opt(0, 0, 0).unwrap().and_utc();
        let last = day(2024, 3, 31).and_hms_opt(23, 59, 59).unwrap().and_utc();
        let after = day(2024, 4, 1).and_hms_opt(0, 0, 0).unwrap().and_utc();

        assert!(filter.matches(&post("First", Some(first)), &a, 0));
        assert!(filter.matches(&post("Last", Some(last)), &a, 0));
        assert!(!filter.matches(&post("After", Some(after)), &a, 0));
        assert!(!filter.matches(&post("Unpublished", None), &a, 0));
    }

    #[test]
    fn test_public_feed_skips_untimestamped_rows() {
        let filter = PostFilter::published();
        let mut legacy = post("Legacy", None);
        legacy.status = PostStatus::Published;

        assert!(!filter.matches(&legacy, &author("alice"), 0));
        assert!(filter.matches(&post("Live", Some(Utc::now())), &author("alice"), 0));
        assert!(!filter.matches(&post("Draft", None), &author("alice"), 0));
    }

    #[test]
    fn test_impact_level_filter_uses_bucket() {
        let filter = PostFilter {
            impact_level: Some(ImpactLevel::Low),
            ..Default::default()
        };
        let p = post("Quiet", None);
        let a = author("alice");
        assert!(filter.matches(&p, &a, 0));
        assert!(filter.matches(&p, &a, 1));
        assert!(!filter.matches(&p, &a, 2));
    }

    #[test]
    fn test_sort_nulls_last_in_both_directions() {
        let a = author("alice");
        let early = PostSummary::new(&post("Early", Some(Utc::now() - TimeDelta::days(2))), a.clone(), 0);
        let late = PostSummary::new(&post("Late", Some(Utc::now())), a.clone(), 0);
        let draft = PostSummary::new(&post("Draft", None), a, 0);

        let mut rows = vec![draft.clone(), early.clone(), late.clone()];
        rows.sort_by(|x, y| PostSort::Newest.compare(x, y));
        assert_eq!(rows, vec![late.clone(), early.clone(), draft.clone()]);

        rows.sort_by(|x, y| PostSort::Oldest.compare(x, y));
        assert_eq!(rows, vec![early, late, draft]);
    }

    #[test]
    fn test_impact_sort_breaks_ties_by_newest() {
        let a = author("alice");
        let busy = PostSummary::new(&post("Busy", Some(Utc::now() - TimeDelta::days(9))), a.clone(), 7);
        let older = PostSummary::new(&post("Older", Some(Utc::now() - TimeDelta::days(3))), a.clone(), 2);
        let newer = PostSummary::new(&post("Newer", Some(Utc::now())), a, 2);

        let mut rows = vec![older.clone(), newer.clone(), busy.clone()];
        rows.sort_by(|x, y| PostSort::Impact.compare(x, y));
        assert_eq!(rows, vec![busy, newer, older]);
    }

    #[test]
    fn test_pagination_window() {
        let page = Pagination::new(2, 3);
        assert_eq!(page.apply((0..10).collect()), vec![2, 3, 4]);
        assert_eq!(Pagination::new(8, 5).apply((0..10).collect()), vec![8, 9]);
        assert!(Pagination::new(0, 0).apply((0..10).collect::<Vec<_>>()).is_empty());
    }
}
