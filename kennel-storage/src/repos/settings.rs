//! Singleton settings record.

use crate::cache::LocalCache;
use crate::store::{ListQuery, RemoteStore};
use kennel_core::schema::row_id;
use kennel_core::{Collection, KennelResult, Settings, SettingsId, StoreRecord};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Repository for the single settings row.
#[derive(Clone)]
pub struct SettingsRepository {
    store: Arc<dyn RemoteStore>,
    cache: Arc<LocalCache>,
}

impl fmt::Debug for SettingsRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsRepository")
            .field("backend", &self.store.backend())
            .finish()
    }
}

impl SettingsRepository {
    pub fn new(store: Arc<dyn RemoteStore>, cache: Arc<LocalCache>) -> Self {
        Self { store, cache }
    }

    /// Cached settings; defaults when none exist yet.
    pub fn get(&self) -> Settings {
        self.cache.settings()
    }

    /// One section of the site content document.
    pub fn site_section(&self, key: &str) -> Option<Value> {
        self.cache.read(|s| s.settings.site_content.get(key).cloned())
    }

    /// Write the settings. Once a row exists every save targets its id,
    /// whatever id the caller passed.
    pub async fn save(&self, settings: &Settings) -> KennelResult<Settings> {
        let row = settings.to_row()?;
        let collection = Settings::COLLECTION;
        let existing = match self.existing_id().await? {
            Some(id) => Some(id),
            None => settings.id.clone(),
        };

        let stored = match existing {
            Some(id) => {
                let stored = self.store.update(collection, id.as_str(), row).await?;
                debug!(%collection, id = id.as_str(), "Updated settings");
                stored
            }
            None => {
                let stored = self.store.insert(collection, row).await?;
                debug!(%collection, "Inserted settings");
                stored
            }
        };

        let saved = Settings::from_row(&stored)?;
        self.cache.set_settings(saved.clone());
        Ok(saved)
    }

    /// Id of the stored settings row. Read from the cache, or from the store
    /// when the settings collection failed to load.
    async fn existing_id(&self) -> KennelResult<Option<SettingsId>> {
        if let Some(id) = self.cache.settings().id {
            return Ok(Some(id));
        }
        if !self.cache.is_failed(Collection::Settings) {
            return Ok(None);
        }

        warn!("Settings not cached, looking up the stored row");
        let rows = self
            .store
            .list(Settings::COLLECTION, &ListQuery::new().limit(1))
            .await?;
        Ok(rows.first().and_then(row_id).map(SettingsId::new))
    }
}
