//! Boundary parsing: wire DTOs into domain inputs.
//!
//! Every rejection names the offending field.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;
use lexleaks_core::domain::{
    ImpactChanges, ImpactFilter, NewImpact, NewPost, NewPushSubscription, NotificationPreferences,
    PostChanges,
};
use lexleaks_core::query::{Pagination, PostFilter, PostQuery};
use lexleaks_shared::dto::{
    CreateImpactRequest, CreatePostRequest, ListImpactsParams, ListPostsParams, SearchPostsParams,
    SubscribeRequest, UpdateImpactRequest, UpdatePostRequest, UpdatePreferencesRequest,
};

use crate::middleware::error::AppError;

/// Largest page the HTTP API hands out.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Blank query values count as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn choice<T>(field: &'static str, value: Option<String>) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    non_blank(value)
        .map(|raw| raw.parse().map_err(|e: T::Err| AppError::validation(field, e.to_string())))
        .transpose()
}

fn required_choice<T>(field: &'static str, value: String) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    choice(field, Some(value))?.ok_or_else(|| AppError::validation(field, "is required"))
}

fn date(field: &'static str, value: Option<String>) -> Result<Option<NaiveDate>, AppError> {
    non_blank(value)
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|_| AppError::validation(field, format!("`{raw}` is not a YYYY-MM-DD date")))
        })
        .transpose()
}

pub fn page(skip: Option<u64>, limit: Option<u64>) -> Pagination {
    Pagination::new(
        skip.unwrap_or(0),
        limit.unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE),
    )
}

pub fn post_query(params: ListPostsParams) -> Result<PostQuery, AppError> {
    let filter = PostFilter {
        status: choice("status", params.status)?,
        verification_status: choice("verification_status", params.verification_status)?,
        category: non_blank(params.category),
        author: non_blank(params.author),
        date_from: date("date_from", params.date_from)?,
        date_to: date("date_to", params.date_to)?,
        search: non_blank(params.search),
        impact_level: choice("impact_level", params.impact_level)?,
        published_only: false,
    };

    Ok(PostQuery {
        filter,
        sort: choice("sort_by", params.sort_by)?.unwrap_or_default(),
        page: page(params.skip, params.limit),
    })
}

pub fn search_query(params: SearchPostsParams) -> Result<PostQuery, AppError> {
    let needle = non_blank(Some(params.q))
        .ok_or_else(|| AppError::validation("q", "must not be empty"))?;
    Ok(PostQuery {
        filter: PostFilter {
            status: choice("status", params.status)?,
            search: Some(needle),
            ..Default::default()
        },
        page: page(params.skip, params.limit),
        ..Default::default()
    })
}

pub fn new_post(req: CreatePostRequest) -> Result<NewPost, AppError> {
    Ok(NewPost {
        title: req.title,
        content: req.content,
        excerpt: req.excerpt,
        status: choice("status", req.status)?.unwrap_or_default(),
        verification_status: choice("verification_status", req.verification_status)?
            .unwrap_or_default(),
        category: req.category,
        document_url: req.document_url,
    })
}

pub fn post_changes(req: UpdatePostRequest) -> Result<PostChanges, AppError> {
    Ok(PostChanges {
        title: req.title,
        content: req.content,
        excerpt: req.excerpt,
        status: choice("status", req.status)?,
        verification_status: choice("verification_status", req.verification_status)?,
        category: req.category,
        document_url: req.document_url,
        published_at: req.published_at,
    })
}

pub fn impact_filter(params: &ListImpactsParams) -> Result<ImpactFilter, AppError> {
    Ok(ImpactFilter {
        post_id: params.post_id,
        kind: choice("type", params.kind.clone())?,
        status: choice("status", params.status.clone())?,
    })
}

pub fn new_impact(req: CreateImpactRequest) -> Result<NewImpact, AppError> {
    Ok(NewImpact {
        post_id: req.post_id,
        title: req.title,
        description: req.description,
        date: req.date,
        kind: required_choice("type", req.kind)?,
        status: choice("status", req.status)?.unwrap_or_default(),
    })
}

pub fn impact_changes(req: UpdateImpactRequest) -> Result<ImpactChanges, AppError> {
    Ok(ImpactChanges {
        title: req.title,
        description: req.description,
        date: req.date,
        kind: choice("type", req.kind)?,
        status: choice("status", req.status)?,
    })
}

pub fn new_subscription(req: SubscribeRequest) -> NewPushSubscription {
    NewPushSubscription {
        endpoint: req.subscription.endpoint,
        p256dh: req.subscription.keys.p256dh,
        auth: req.subscription.keys.auth,
        user_agent: non_blank(req.user_agent),
    }
}

pub fn preferences(req: UpdatePreferencesRequest) -> NotificationPreferences {
    NotificationPreferences {
        notify_new_posts: req.notify_new_posts,
        notify_updates: req.notify_updates,
        notify_weekly_digest: req.notify_weekly_digest,
    }
}

#[cfg(test)]
mod tests {
    use lexleaks_core::domain::{ImpactLevel, PostStatus};
    use lexleaks_core::query::PostSort;

    use super::*;

    #[test]
    fn test_listing_defaults_and_cap() {
        let query = post_query(ListPostsParams::default()).unwrap();
        assert_eq!(query.sort, PostSort::Newest);
        assert_eq!(query.page, Pagination::new(0, 100));

        let capped = post_query(ListPostsParams {
            limit: Some(5000),
            skip: Some(20),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(capped.page, Pagination::new(20, 100));
    }

    #[test]
    fn test_listing_parses_enums_and_dates() {
        let query = post_query(ListPostsParams {
            status: Some("published".into()),
            impact_level: Some("high".into()),
            sort_by: Some("impact".into()),
            date_from: Some("2024-01-01".into()),
            search: Some("   ".into()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(query.filter.status, Some(PostStatus::Published));
        assert_eq!(query.filter.impact_level, Some(ImpactLevel::High));
        assert_eq!(query.sort, PostSort::Impact);
        assert_eq!(query.filter.date_from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(query.filter.search, None);
    }

    #[test]
    fn test_bad_values_name_their_field() {
        let err = post_query(ListPostsParams {
            sort_by: Some("popular".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "sort_by", .. }));

        let err = post_query(ListPostsParams {
            date_to: Some("31/01/2024".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "date_to", .. }));
    }

    #[test]
    fn test_search_requires_needle() {
        let err = search_query(SearchPostsParams {
            q: " ".into(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "q", .. }));
    }
}
