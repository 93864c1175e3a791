//! Async facade over a mapping store.
//!
//! Store access is blocking, so every operation runs on tokio's blocking
//! pool. Operations take a [`CancellationToken`] which is checked before
//! each store call; since every write is a single store operation, a
//! cancelled request leaves either the old or the new state behind.

use std::sync::Arc;

use statmap_model::{DataSetVersionId, DataSetVersionMapping};
use tokio_util::sync::CancellationToken;

use crate::automap::AutoMapOptions;
use crate::create::{VersionMeta, create_mapping, delete_mapping, load_mapping};
use crate::error::{MappingError, Result};
use crate::overrides::{MappingUpdate, UpdatedEntry, apply_override};
use crate::path::MappingPath;
use crate::projection::{MappingReview, project};
use crate::store::MappingStore;

/// Shared handle to a mapping store.
#[derive(Debug)]
pub struct MappingService<S> {
    store: Arc<S>,
    options: AutoMapOptions,
}

impl<S> Clone for MappingService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            options: self.options,
        }
    }
}

impl<S: MappingStore + 'static> MappingService<S> {
    pub fn new(store: S) -> Self {
        Self::from_shared(Arc::new(store))
    }

    pub fn from_shared(store: Arc<S>) -> Self {
        Self {
            store,
            options: AutoMapOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AutoMapOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn create(
        &self,
        source: VersionMeta,
        target: VersionMeta,
        cancel: &CancellationToken,
    ) -> Result<DataSetVersionMapping> {
        let options = self.options;
        self.run(cancel, move |store| {
            create_mapping(store, &source, &target, options)
        })
        .await
    }

    pub async fn apply_override(
        &self,
        version_id: DataSetVersionId,
        target: MappingPath,
        update: MappingUpdate,
        cancel: &CancellationToken,
    ) -> Result<UpdatedEntry> {
        self.run(cancel, move |store| {
            apply_override(store, &version_id, &target, &update)
        })
        .await
    }

    pub async fn review(
        &self,
        version_id: DataSetVersionId,
        cancel: &CancellationToken,
    ) -> Result<MappingReview> {
        self.run(cancel, move |store| {
            load_mapping(store, &version_id).map(|record| project(&record))
        })
        .await
    }

    pub async fn delete(
        &self,
        version_id: DataSetVersionId,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.run(cancel, move |store| delete_mapping(store, &version_id))
            .await
    }

    async fn run<T, F>(&self, cancel: &CancellationToken, operation: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> Result<T> + Send + 'static,
    {
        if cancel.is_cancelled() {
            return Err(MappingError::Cancelled);
        }
        let store = Arc::clone(&self.store);
        let token = cancel.clone();
        let task = tokio::task::spawn_blocking(move || {
            // The request may have been cancelled while queued for a thread.
            if token.is_cancelled() {
                return Err(MappingError::Cancelled);
            }
            operation(store.as_ref())
        });
        task.await.map_err(MappingError::Task)?
    }
}
