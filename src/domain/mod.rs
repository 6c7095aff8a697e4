//! Domain layer: taxonomy entities and editing logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod entities;
pub mod error;
pub mod filter;
pub mod path;
pub mod store;
pub mod view;

pub use arena::{ArenaNode, TaxonArena, TaxonData};
pub use entities::Taxon;
pub use error::{DomainError, DomainResult};
pub use filter::{apply_filter, LevelCap};
pub use path::NodePath;
pub use store::TaxonomyStore;
pub use view::{ViewNode, ViewTree};
