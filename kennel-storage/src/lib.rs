//! KENNEL Storage - Remote Store, Local Cache and Repositories
//!
//! Writes go to a [`RemoteStore`] and are mirrored into a [`LocalCache`] only
//! once they succeed. Reads are synchronous and served from the cache after
//! the one-time bulk load.

pub mod cache;
pub mod kennel;
pub mod memory;
pub mod repos;
pub mod repository;
pub mod rest;
pub mod saga;
pub mod store;

pub use cache::{CacheState, CachedEntity, LoadReport, LocalCache};
pub use kennel::Kennel;
pub use memory::MemoryStore;
pub use repos::{
    CustomerRepository, PurchaseRepository, PuppyRepository, SettingsRepository,
    TestimonialRepository,
};
pub use repository::Repository;
pub use rest::{RestStore, RestStoreConfig};
pub use saga::{Saga, Undo};
pub use store::{Filter, ListQuery, RemoteStore};
