//! SQL rendition of the post listing query.
//!
//! Posts are inner-joined to their author and left-joined to their impacts,
//! grouped per post, and the impact count is `COUNT(impacts.id)` so posts
//! without impacts count as zero. The impact level filter becomes a HAVING
//! range built from [`ImpactLevel::count_bounds`], matching the in-memory
//! evaluation exactly.

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Func, LikeExpr, NullOrdering, Order, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select,
};
use uuid::Uuid;

use lexleaks_core::domain::{Author, PostStatus, VerificationStatus};
use lexleaks_core::query::{PostFilter, PostQuery, PostSort, PostSummary};

use super::entity::{impact, parse_column, post, user};

/// Flat row produced by [`build_listing`].
#[derive(Debug, FromQueryResult)]
pub(crate) struct SummaryRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub status: String,
    pub verification_status: String,
    pub category: Option<String>,
    pub document_url: Option<String>,
    pub published_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub author_id: Uuid,
    pub author_username: String,
    pub author_is_admin: bool,
    pub author_created_at: DateTimeWithTimeZone,
    pub impact_count: i64,
}

impl From<SummaryRow> for PostSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            excerpt: row.excerpt,
            status: parse_column("posts.status", &row.status, PostStatus::Draft),
            verification_status: parse_column(
                "posts.verification_status",
                &row.verification_status,
                VerificationStatus::Unverified,
            ),
            category: row.category,
            document_url: row.document_url,
            published_at: row.published_at.map(Into::into),
            created_at: row.created_at.into(),
            author: Author {
                id: row.author_id,
                username: row.author_username,
                is_admin: row.author_is_admin,
                created_at: row.author_created_at.into(),
            },
            impact_count: u64::try_from(row.impact_count).unwrap_or(0),
        }
    }
}

fn impact_count() -> SimpleExpr {
    Expr::col((impact::Entity, impact::Column::Id)).count()
}

/// Build the aggregate listing select for a query.
pub(crate) fn build_listing(query: &PostQuery) -> Select<post::Entity> {
    let mut select = post::Entity::find()
        .select_only()
        .columns([
            post::Column::Id,
            post::Column::Title,
            post::Column::Slug,
            post::Column::Excerpt,
            post::Column::Status,
            post::Column::VerificationStatus,
            post::Column::Category,
            post::Column::DocumentUrl,
            post::Column::PublishedAt,
            post::Column::CreatedAt,
        ])
        .column_as(user::Column::Id, "author_id")
        .column_as(user::Column::Username, "author_username")
        .column_as(user::Column::IsAdmin, "author_is_admin")
        .column_as(user::Column::CreatedAt, "author_created_at")
        .column_as(impact_count(), "impact_count")
        .join(JoinType::InnerJoin, post::Relation::User.def())
        .join(JoinType::LeftJoin, post::Relation::Impact.def())
        .filter(filter_condition(&query.filter))
        .group_by(post::Column::Id)
        .group_by(user::Column::Id);

    if let Some(level) = query.filter.impact_level {
        let (min, max) = level.count_bounds();
        select = select.having(Expr::expr(impact_count()).gte(to_sql_count(min)));
        if let Some(max) = max {
            select = select.having(Expr::expr(impact_count()).lte(to_sql_count(max)));
        }
    }

    select = match query.sort {
        PostSort::Newest => newest_first(select),
        PostSort::Oldest => select
            .order_by_with_nulls(post::Column::PublishedAt, Order::Asc, NullOrdering::Last)
            .order_by_asc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id),
        PostSort::Impact => newest_first(select.order_by(impact_count(), Order::Desc)),
    };

    select.offset(query.page.skip).limit(query.page.limit)
}

fn newest_first(select: Select<post::Entity>) -> Select<post::Entity> {
    select
        .order_by_with_nulls(post::Column::PublishedAt, Order::Desc, NullOrdering::Last)
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id)
}

/// Accumulate every active filter as a conjunct.
fn filter_condition(filter: &PostFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(status) = filter.status {
        condition = condition.add(post::Column::Status.eq(status.as_str()));
    }
    if let Some(verification) = filter.verification_status {
        condition = condition.add(post::Column::VerificationStatus.eq(verification.as_str()));
    }
    if let Some(category) = &filter.category {
        condition = condition.add(post::Column::Category.eq(category.as_str()));
    }
    if let Some(author) = &filter.author {
        condition = condition.add(contains_ignore_case(
            Expr::col((user::Entity, user::Column::Username)),
            author,
        ));
    }

    if filter.published_only {
        condition = condition.add(post::Column::PublishedAt.is_not_null());
    }

    let (from, until) = filter.published_window();
    if let Some(from) = from {
        condition = condition.add(post::Column::PublishedAt.gte(from));
    }
    if let Some(until) = until {
        condition = condition.add(post::Column::PublishedAt.lt(until));
    }

    if let Some(needle) = &filter.search {
        condition = condition.add(
            Condition::any()
                .add(contains_ignore_case(
                    Expr::col((post::Entity, post::Column::Title)),
                    needle,
                ))
                .add(contains_ignore_case(
                    Expr::col((post::Entity, post::Column::Content)),
                    needle,
                ))
                .add(contains_ignore_case(
                    Expr::col((post::Entity, post::Column::Excerpt)),
                    needle,
                )),
        );
    }

    condition
}

/// `LOWER(column) LIKE '%needle%'` with the needle's wildcards escaped.
fn contains_ignore_case(column: Expr, needle: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
    Expr::expr(Func::lower(column)).like(LikeExpr::new(pattern).escape('\\'))
}

/// Escape `\`, `%` and `_` for a `LIKE ... ESCAPE '\'` pattern.
pub(super) fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn to_sql_count(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}
