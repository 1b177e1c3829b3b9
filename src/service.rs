use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{Document, Profile, ProfilePatch},
    repository::{ProfileRepositoryState, RepositoryState},
};

/// ContentService
///
/// The CRUD contract shared by every content entity kind. Payloads are turned into
/// validated documents here, so the repository only ever stores documents that already
/// satisfy their schema.
pub struct ContentService<T: Document> {
    repo: RepositoryState<T>,
}

impl<T: Document> Clone for ContentService<T> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<T: Document> ContentService<T> {
    pub fn new(repo: RepositoryState<T>) -> Self {
        Self { repo }
    }

    /// All documents in the kind's default display order.
    pub async fn list_all(&self) -> Result<Vec<T>, ApiError> {
        Ok(self.repo.list_all(&T::default_sort()).await?)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<T, ApiError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(ApiError::NotFound(T::KIND))
    }

    pub async fn create(&self, payload: T::Create) -> Result<T, ApiError> {
        let doc = T::build(Uuid::new_v4(), Utc::now(), payload)?;
        let stored = self.repo.insert(&doc).await?;
        tracing::debug!(kind = T::KIND, id = %stored.id(), "document created");
        Ok(stored)
    }

    /// Merges `patch` onto the stored document and re-validates the result.
    pub async fn update_by_id(&self, id: Uuid, patch: T::Patch) -> Result<T, ApiError> {
        let mut doc = self.get_by_id(id).await?;
        doc.apply(patch)?;
        doc.validate()?;
        doc.touch(Utc::now());

        self.repo
            .update(&doc)
            .await?
            .ok_or(ApiError::NotFound(T::KIND))
    }

    pub async fn delete_by_id(&self, id: Uuid) -> Result<(), ApiError> {
        if self.repo.delete_by_id(id).await? {
            tracing::debug!(kind = T::KIND, %id, "document deleted");
            Ok(())
        } else {
            Err(ApiError::NotFound(T::KIND))
        }
    }
}

/// ProfileService
///
/// Read-or-create and create-or-update for the singleton profile.
#[derive(Clone)]
pub struct ProfileService {
    repo: ProfileRepositoryState,
}

impl ProfileService {
    pub fn new(repo: ProfileRepositoryState) -> Self {
        Self { repo }
    }

    pub async fn get(&self) -> Result<Profile, ApiError> {
        let placeholder = Profile::placeholder(Uuid::new_v4(), Utc::now());
        Ok(self.repo.get_or_create(&placeholder).await?)
    }

    pub async fn upsert(&self, patch: ProfilePatch) -> Result<Profile, ApiError> {
        let mut profile = self.get().await?;
        profile.apply(patch);
        profile.validate()?;
        profile.updated_at = Utc::now();
        Ok(self.repo.save(&profile).await?)
    }
}
