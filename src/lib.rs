pub mod composer;
pub mod config;
pub mod error;
pub mod ignore;
pub mod store;
pub mod walker;

pub use error::{FileCollectorError, Result};
pub use ignore::{compile, is_ignored, should_ignore, CompiledPattern, IgnoreRules};
