//! # Configuration System
//!
//! Hierarchical TOML configuration for Memora.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.memora/config.toml`
//! 3. **Project config** - `./.memora/config.toml`
//! 4. **CLI arguments** - Command-line flags (highest priority)
//!
//! ## Loading Configuration
//!
//! ```rust,no_run
//! use memora_core::config::MemoraConfig;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MemoraConfig::load_hierarchy()?;
//!     let timeout = config.capture.timeout();
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

pub use types::{
    AutomationConfig, CaptureConfig, DetectionConfig, MemoraConfig, ShortcutConfig, WindowConfig,
};
pub use validation::validate_config;

impl MemoraConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }
}
