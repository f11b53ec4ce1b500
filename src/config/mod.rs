//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/careerforge/config.toml)
//! 3. Project config (.careerforge/config.toml) or an explicit `--config` file
//! 4. Environment variables (CAREERFORGE_*)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
