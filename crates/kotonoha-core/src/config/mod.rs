//! Configuration management
//!
//! Configuration is read once at startup from the environment and passed to
//! the components that need it; nothing reads the environment afterwards.

pub mod defaults;
pub mod env_loader;
pub mod model;

pub use env_loader::{load_from_env, load_from_lookup};
pub use model::{
    AdmissionConfig, AuditConfig, Config, KNOWN_PROVIDERS, LogFormat, LoggingConfig,
    ProviderSettings, TimeoutConfig,
};
