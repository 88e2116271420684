//! Generic entity repository.
//!
//! Reads are synchronous and served from the [`LocalCache`]. Writes go to the
//! [`RemoteStore`] first; the cache changes only after the store call
//! succeeded, so a failed write leaves every read exactly as it was.

use crate::cache::{CachedEntity, LocalCache};
use crate::store::RemoteStore;
use kennel_core::{EntityIdType, KennelResult, ValidationError};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// CRUD surface for one entity kind.
pub struct Repository<E> {
    store: Arc<dyn RemoteStore>,
    cache: Arc<LocalCache>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            _entity: PhantomData,
        }
    }
}

impl<E: CachedEntity> fmt::Debug for Repository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("collection", &E::COLLECTION)
            .field("backend", &self.store.backend())
            .finish()
    }
}

impl<E: CachedEntity> Repository<E> {
    pub fn new(store: Arc<dyn RemoteStore>, cache: Arc<LocalCache>) -> Self {
        Self {
            store,
            cache,
            _entity: PhantomData,
        }
    }

    pub fn cache(&self) -> &Arc<LocalCache> {
        &self.cache
    }

    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Every cached entity, in the collection's declared order.
    pub fn get_all(&self) -> Vec<E> {
        self.cache.all()
    }

    pub fn get_by_id(&self, id: &E::Id) -> Option<E> {
        self.cache.find(id)
    }

    pub fn count(&self) -> usize {
        self.cache.count::<E>()
    }

    /// Cached entities matching a predicate, in declared order.
    pub fn filter(&self, predicate: impl Fn(&E) -> bool) -> Vec<E> {
        self.cache.filter(predicate)
    }

    /// Cached copy when present, otherwise read from the store.
    pub async fn fetch(&self, id: &E::Id) -> KennelResult<E> {
        if let Some(entity) = self.get_by_id(id) {
            return Ok(entity);
        }
        let row = self.store.get(E::COLLECTION, id.as_str()).await?;
        E::from_row(&row)
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Check that every typed reference points at a cached entity. A check is
    /// skipped while the cache is unloaded or when the target collection
    /// failed to load, since absence proves nothing then.
    pub fn validate_references(&self, entity: &E) -> KennelResult<()> {
        let references = entity.references();
        if references.is_empty() {
            return Ok(());
        }
        self.cache.read(|state| {
            if !state.loaded {
                return Ok(());
            }
            for reference in references {
                if state.failed.contains(&reference.collection) {
                    continue;
                }
                if !state.contains(reference.collection, &reference.id) {
                    return Err(ValidationError::DanglingReference {
                        field: reference.field.to_string(),
                        collection: reference.collection,
                        id: reference.id,
                    }
                    .into());
                }
            }
            Ok(())
        })
    }

    /// Create (no id) or fully replace (with id) an entity.
    ///
    /// Returns the entity as stored, with id and timestamps assigned.
    pub async fn save(&self, entity: &E) -> KennelResult<E> {
        self.validate_references(entity)?;
        self.write_through(entity).await
    }

    /// Store write plus cache update without reference checks. Used for
    /// bookkeeping writes that change fields other than the references.
    pub(crate) async fn write_through(&self, entity: &E) -> KennelResult<E> {
        let row = entity.to_row()?;
        let collection = E::COLLECTION;

        match entity.id() {
            None => {
                let stored = self.store.insert(collection, row).await?;
                let saved = E::from_row(&stored)?;
                debug!(
                    %collection,
                    id = saved.id().map(|id| id.as_str()).unwrap_or_default(),
                    "Inserted entity"
                );
                self.cache.insert(saved.clone());
                Ok(saved)
            }
            Some(id) => {
                let stored = self.store.update(collection, id.as_str(), row).await?;
                let saved = E::from_row(&stored)?;
                debug!(%collection, id = id.as_str(), "Updated entity");
                self.cache.replace(saved.clone());
                Ok(saved)
            }
        }
    }

    /// Delete from the store, then drop the cached entry.
    pub async fn delete(&self, id: &E::Id) -> KennelResult<()> {
        let collection = E::COLLECTION;
        self.store.delete(collection, id.as_str()).await?;
        debug!(%collection, id = id.as_str(), "Deleted entity");
        self.cache.remove::<E>(id);
        Ok(())
    }
}
