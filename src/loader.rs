use crate::EnvConfig;
use crate::builder::LoaderBuilder;
use crate::error::ConfigError;
use crate::field::{Field, FieldSpec, FieldValue};
use crate::parsers::{DurationParser, SliceParser, ValueParser};
use crate::validators::Validator;
use crate::value::Kind;
use std::collections::HashMap;
use std::env;
use std::sync::OnceLock;
use tracing::{debug, trace, warn};

/// Loads configuration structures from environment variables.
///
/// A loader is immutable once built and can be shared between threads.
pub struct Loader {
    pub(crate) parsers: HashMap<Kind, Box<dyn ValueParser>>,
    pub(crate) validators: Vec<Box<dyn Validator>>,
    pub(crate) prefix: String,
}

/// Where a field's raw value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Environment,
    Default,
    Empty,
}

impl Loader {
    /// A loader with the default parsers and validators and no prefix
    pub fn new() -> Self {
        LoaderBuilder::new().build()
    }

    pub fn builder() -> LoaderBuilder {
        LoaderBuilder::new()
    }

    /// Prefix applied to every environment key
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Parser registered for `kind`
    pub fn parser(&self, kind: Kind) -> Option<&dyn ValueParser> {
        self.parsers.get(&kind).map(|parser| parser.as_ref())
    }

    /// Populate `config` from the environment.
    ///
    /// Fields are visited in declaration order and the first failure stops the
    /// walk. Fields loaded before the failure keep their new values.
    pub fn load_config<C: EnvConfig + ?Sized>(&self, config: &mut C) -> Result<(), ConfigError> {
        let span = tracing::debug_span!("load_config", config = std::any::type_name::<C>());
        let _guard = span.enter();

        config.load_fields(self)
    }

    /// Load one field, wrapping any failure with the field's name
    pub fn visit<F: Field + ?Sized>(&self, field: &mut F, spec: &FieldSpec) -> Result<(), ConfigError> {
        field
            .load(self, spec)
            .map_err(|err| err.in_field(spec.name))
    }

    /// Resolve, parse and validate a single leaf field.
    ///
    /// Fields without an environment key are left untouched.
    pub fn load_leaf<T: FieldValue>(
        &self,
        field: &mut T,
        spec: &FieldSpec,
    ) -> Result<(), ConfigError> {
        let Some(key) = spec.tags.env_key() else {
            trace!(field = spec.name, "no environment key, skipping");
            return Ok(());
        };

        let raw = self.resolve(key, spec);
        let previous = field.to_value();
        let mut value = previous.clone();

        match T::kind() {
            Kind::Duration => DurationParser.parse(&raw, &mut value)?,
            Kind::Slice => {
                let element = T::element_kind().ok_or(ConfigError::UnsupportedType(Kind::Slice))?;
                trace!(field = spec.name, %element, "parsing sequence");
                SliceParser.parse_with(&raw, element, &|kind| self.parser(kind), &mut value)?;
            }
            kind => {
                let parser = self.parser(kind).ok_or(ConfigError::UnsupportedType(kind))?;
                trace!(field = spec.name, %kind, "parsing value");
                parser.parse(&raw, &mut value)?;
            }
        }

        // Only store what the parser changed; `to_value` may be lossy
        if value != previous {
            *field = T::from_value(value)?;
        }

        let value = field.to_value();
        for validator in &self.validators {
            if let Err(err) = validator.validate(&value, &spec.tags) {
                debug!(field = spec.name, error = %err, "validation failed");
                return Err(err.into());
            }
        }

        Ok(())
    }

    /// Raw value for `key`: the environment, then the declared default
    fn resolve(&self, key: &str, spec: &FieldSpec) -> String {
        let key = format!("{}{}", self.prefix, key);

        let from_env = match env::var(&key) {
            Ok(value) => Some(value),
            Err(env::VarError::NotPresent) => None,
            Err(env::VarError::NotUnicode(_)) => {
                warn!(key = %key, "environment value is not valid unicode, treating as unset");
                None
            }
        };

        let (raw, source) = match from_env.filter(|value| !value.is_empty()) {
            Some(value) => (value, Source::Environment),
            None => match spec.tags.default_literal() {
                Some(default) => (default.to_string(), Source::Default),
                None => (String::new(), Source::Empty),
            },
        };

        debug!(field = spec.name, key = %key, source = ?source, "resolved raw value");
        raw
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.parsers.keys().copied().collect();
        kinds.sort();
        f.debug_struct("Loader")
            .field("parsers", &kinds)
            .field("validators", &self.validators.len())
            .field("prefix", &self.prefix)
            .finish()
    }
}

/// Shared loader with the default configuration, built on first use
pub fn default_loader() -> &'static Loader {
    static DEFAULT_LOADER: OnceLock<Loader> = OnceLock::new();
    DEFAULT_LOADER.get_or_init(Loader::new)
}
