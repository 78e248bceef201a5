//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (FilterConfig::default)
//!     → loader.rs (optional TOML file)
//!     → args.rs (CLI flags / env vars overlay)
//!     → validation.rs (semantic checks)
//!     → FilterConfig (validated, immutable)
//!     → rules compiled into a RuleSet, shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Any configuration error is fatal at startup

pub mod args;
pub mod loader;
pub mod schema;
pub mod validation;

pub use args::Args;
pub use loader::{load_config, resolve_config, ConfigError};
pub use schema::{FilterConfig, ListenerConfig, LogFormat, ObservabilityConfig, TimeoutConfig};
