//! Populate configuration structs from environment variables.
//!
//! Fields are annotated with `#[field(...)]` and the struct derives
//! [`EnvConfig`]. Each annotated field is read from the environment, falls back
//! to its declared default, is converted to the field's type and is then checked
//! by the loader's validators.
//!
//! ```rust
//! use env_binder::EnvConfig;
//!
//! #[derive(Debug, Default, EnvConfig)]
//! struct Database {
//!     #[field(env = "DOC_DB_HOST", default = "localhost")]
//!     host: String,
//!     #[field(env = "DOC_DB_PORT", default = 5432, min = 1, max = 65535)]
//!     port: i64,
//! }
//!
//! #[derive(Debug, Default, EnvConfig)]
//! struct Config {
//!     #[field(env = "DOC_TIMEOUT", default = "30")]
//!     timeout: std::time::Duration,
//!     #[field(env = "DOC_TAGS", default = "a,b")]
//!     tags: Vec<String>,
//!     database: Database,
//! }
//!
//! let mut config = Config::default();
//! env_binder::load_config(&mut config).unwrap();
//!
//! assert_eq!(config.timeout, std::time::Duration::from_secs(30));
//! assert_eq!(config.tags, vec!["a", "b"]);
//! assert_eq!(config.database.port, 5432);
//! ```

pub mod builder;
pub mod error;
pub mod field;
pub mod loader;
pub mod parsers;
pub mod validators;
pub mod value;

// Re-export main types
pub use builder::LoaderBuilder;
pub use error::{
    BoxError, ConfigError, DurationError, ParseError, RangeError, ValidationError,
    format_config_error,
};
pub use field::{Field, FieldSpec, FieldValue, Tags};
pub use loader::{Loader, default_loader};
pub use parsers::{ValueParser, parse_duration};
pub use validators::Validator;
pub use value::{Kind, Numeric, Value};

// Re-export derive macro
pub use env_binder_macros::EnvConfig;

/// A structure whose fields can be loaded from the environment.
///
/// Usually implemented with `#[derive(EnvConfig)]`.
pub trait EnvConfig {
    /// Visit every field in declaration order, loading leaves and recursing into
    /// nested structures
    fn load_fields(&mut self, loader: &Loader) -> Result<(), ConfigError>;

    /// Build a default instance and load it with the shared default loader
    fn from_env() -> Result<Self, ConfigError>
    where
        Self: Default + Sized,
    {
        let mut config = Self::default();
        load_config(&mut config)?;
        Ok(config)
    }

    /// Like [`EnvConfig::from_env`], panicking with a readable message on failure
    fn load() -> Self
    where
        Self: Default + Sized,
    {
        match Self::from_env() {
            Ok(config) => config,
            Err(err) => panic!("{}", format_config_error(&err)),
        }
    }
}

/// Load `config` using the shared default loader
pub fn load_config<C: EnvConfig + ?Sized>(config: &mut C) -> Result<(), ConfigError> {
    default_loader().load_config(config)
}
