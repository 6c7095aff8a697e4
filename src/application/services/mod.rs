//! Application services

pub mod export;
pub mod session;

pub use export::{ExportService, DEFAULT_EXPORT_FILE};
pub use session::{EditorSession, PromptedOutcome};
