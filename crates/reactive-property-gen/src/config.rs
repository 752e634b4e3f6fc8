use serde::Deserialize;
use syn::Ident;
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid generator config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("events_field '{0}' is not a valid field identifier")]
    InvalidEventsField(String),
}

///
/// GeneratorConfig
///
/// Knobs read by the emitter and the orchestrator. Every field has a default so
/// an empty table is a valid config.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Field of the owning type that stores its generated `…Events` struct.
    pub events_field: String,

    /// Print `[debug]` pass events to stdout.
    pub debug: bool,
}

impl GeneratorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.events_ident().map(|_| ())
    }

    /// The events field as an identifier for generated code.
    pub fn events_ident(&self) -> Result<Ident, ConfigError> {
        syn::parse_str::<Ident>(&self.events_field)
            .map_err(|_| ConfigError::InvalidEventsField(self.events_field.clone()))
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            events_field: "events".to_string(),
            debug: false,
        }
    }
}

///
/// TESTS
///
