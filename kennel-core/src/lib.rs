//! KENNEL Core - Entity Types
//!
//! Typed ids, entity structs with their store field tables, the error
//! taxonomy, configuration and the derived computations. No I/O: every other
//! crate depends on this one.

#[macro_use]
mod macros;

pub mod config;
pub mod derived;
pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;
pub mod money;
pub mod schema;

pub use config::{AlertConfig, KennelConfig, StoreConfig};
pub use entities::*;
pub use enums::*;
pub use error::*;
pub use identity::*;
pub use money::Amount;
pub use schema::{
    Collection, FieldMapping, InsertPosition, OrderBy, Reference, Row, StoreRecord,
};
