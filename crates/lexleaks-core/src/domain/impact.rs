use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::require_text;
use crate::DomainError;

pub const IMPACT_TITLE_MAX_LEN: usize = 200;

string_enum! {
    /// Kind of real-world consequence attributed to a post.
    pub enum ImpactType {
        LegalAction => "legal_action",
        PolicyChange => "policy_change",
        Investigation => "investigation",
        Resignation => "resignation",
        Reform => "reform",
    }
}

string_enum! {
    /// Progress of an impact.
    #[derive(Default)]
    pub enum ImpactStatus {
        #[default]
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
    }
}

string_enum! {
    /// Bucket summarizing how many impacts a post has accumulated.
    pub enum ImpactLevel {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

impl ImpactLevel {
    const HIGH_MIN: u64 = 5;
    const MEDIUM_MIN: u64 = 2;

    /// Bucket an impact count: 5+ is high, 2..=4 medium, 0..=1 low.
    pub fn from_count(count: u64) -> Self {
        if count >= Self::HIGH_MIN {
            Self::High
        } else if count >= Self::MEDIUM_MIN {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Inclusive count range covered by this bucket, as `(min, max)` with an
    /// open upper end for `High`. Query-time predicates are built from this.
    pub fn count_bounds(&self) -> (u64, Option<u64>) {
        match self {
            Self::High => (Self::HIGH_MIN, None),
            Self::Medium => (Self::MEDIUM_MIN, Some(Self::HIGH_MIN - 1)),
            Self::Low => (0, Some(Self::MEDIUM_MIN - 1)),
        }
    }

    pub fn contains(&self, count: u64) -> bool {
        let (min, max) = self.count_bounds();
        count >= min && max.is_none_or(|max| count <= max)
    }
}

/// Impact entity - a recorded consequence of a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: ImpactType,
    pub status: ImpactStatus,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an impact.
#[derive(Debug, Clone)]
pub struct NewImpact {
    pub post_id: Uuid,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub kind: ImpactType,
    pub status: ImpactStatus,
}

impl NewImpact {
    pub fn validate(mut self) -> Result<Self, DomainError> {
        self.title = require_text("title", self.title, Some(IMPACT_TITLE_MAX_LEN))?;
        self.description = require_text("description", self.description, None)?;
        Ok(self)
    }
}

/// Partial update of an impact.
#[derive(Debug, Clone, Default)]
pub struct ImpactChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub kind: Option<ImpactType>,
    pub status: Option<ImpactStatus>,
}

impl ImpactChanges {
    pub fn validate(mut self) -> Result<Self, DomainError> {
        if let Some(title) = self.title.take() {
            self.title = Some(require_text("title", title, Some(IMPACT_TITLE_MAX_LEN))?);
        }
        if let Some(description) = self.description.take() {
            self.description = Some(require_text("description", description, None)?);
        }
        Ok(self)
    }
}

impl Impact {
    pub fn new(input: NewImpact, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            date: input.date,
            kind: input.kind,
            status: input.status,
            post_id: input.post_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, changes: ImpactChanges, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(date) = changes.date {
            self.date = date;
        }
        if let Some(kind) = changes.kind {
            self.kind = kind;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        self.updated_at = now;
    }
}

/// Independent, AND-combined filters for impact listings.
#[derive(Debug, Clone, Default)]
pub struct ImpactFilter {
    pub post_id: Option<Uuid>,
    pub kind: Option<ImpactType>,
    pub status: Option<ImpactStatus>,
}

impl ImpactFilter {
    pub fn matches(&self, impact: &Impact) -> bool {
        self.post_id.is_none_or(|id| impact.post_id == id)
            && self.kind.is_none_or(|kind| impact.kind == kind)
            && self.status.is_none_or(|status| impact.status == status)
    }
}
