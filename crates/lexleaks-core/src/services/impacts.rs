//! Impact lifecycle. All mutations are admin-only.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Actor, Impact, ImpactChanges, ImpactFilter, NewImpact};
use crate::error::{DomainError, RepoError};
use crate::ports::{ImpactRepository, PostRepository};
use crate::query::Pagination;

pub struct ImpactService {
    impacts: Arc<dyn ImpactRepository>,
    posts: Arc<dyn PostRepository>,
}

impl ImpactService {
    pub fn new(impacts: Arc<dyn ImpactRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { impacts, posts }
    }

    pub async fn list(
        &self,
        filter: &ImpactFilter,
        page: Pagination,
    ) -> Result<Vec<Impact>, DomainError> {
        Ok(self.impacts.list(filter, page).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Impact, DomainError> {
        self.impacts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Impact", id))
    }

    pub async fn create(&self, actor: &Actor, input: NewImpact) -> Result<Impact, DomainError> {
        actor.require_admin()?;
        let input = input.validate()?;

        if self.posts.find_by_id(input.post_id).await?.is_none() {
            return Err(DomainError::not_found("Post", input.post_id));
        }

        let saved = self.impacts.insert(Impact::new(input, Utc::now())).await?;
        tracing::info!(impact_id = %saved.id, post_id = %saved.post_id, kind = %saved.kind, "Impact recorded");
        Ok(saved)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: ImpactChanges,
    ) -> Result<Impact, DomainError> {
        actor.require_admin()?;
        let changes = changes.validate()?;

        let mut impact = self.get(id).await?;
        impact.apply(changes, Utc::now());

        match self.impacts.update(impact).await {
            Ok(saved) => Ok(saved),
            Err(RepoError::NotFound) => Err(DomainError::not_found("Impact", id)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), DomainError> {
        actor.require_admin()?;
        match self.impacts.delete(id).await {
            Ok(()) => {
                tracing::info!(impact_id = %id, "Impact deleted");
                Ok(())
            }
            Err(RepoError::NotFound) => Err(DomainError::not_found("Impact", id)),
            Err(e) => Err(e.into()),
        }
    }
}
