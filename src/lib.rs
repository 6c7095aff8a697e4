//! taxedit: interactive editor for labeled taxonomy trees
//!
//! The canonical tree lives in [`domain::TaxonomyStore`]; the rendered,
//! independently-mutable projection is [`domain::ViewTree`]. Positional
//! paths ([`domain::NodePath`]) tie the two together and are re-derived
//! after every structural mutation. [`application::services::EditorSession`]
//! owns one load→edit→export cycle.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::services::{EditorSession, ExportService};
pub use domain::{LevelCap, NodePath, TaxonomyStore, ViewTree};
