use reactive_property_gen::config::{ConfigError, GeneratorConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Optional per-crate config file, read from the manifest directory.
pub const CONFIG_FILE: &str = "reactive-property.toml";

///
/// BuildConfig
///
/// ```toml
/// source_dir = "src"
///
/// [generator]
/// events_field = "events"
/// debug = false
/// ```
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Source root scanned by the generator, relative to the manifest.
    pub source_dir: PathBuf,

    pub generator: GeneratorConfig,
}

impl BuildConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.generator.validate()?;

        Ok(config)
    }

    #[must_use]
    pub fn source_root(&self, manifest_dir: &Path) -> PathBuf {
        manifest_dir.join(&self.source_dir)
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("src"),
            generator: GeneratorConfig::default(),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = BuildConfig::from_toml_str("").unwrap();

        assert_eq!(config, BuildConfig::default());
        assert_eq!(config.source_dir, Path::new("src"));
        assert_eq!(config.generator.events_field, "events");
    }

    #[test]
    fn nested_generator_table_is_read() {
        let config = BuildConfig::from_toml_str(
            r#"
            source_dir = "design"

            [generator]
            events_field = "changes"
            debug = true
            "#,
        )
        .unwrap();

        assert_eq!(config.source_root(Path::new("/m")), Path::new("/m/design"));
        assert_eq!(config.generator.events_field, "changes");
        assert!(config.generator.debug);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(BuildConfig::from_toml_str("sources = \"src\"").is_err());
    }

    #[test]
    fn invalid_events_field_is_rejected() {
        let err = BuildConfig::from_toml_str("[generator]\nevents_field = \"1st\"").unwrap_err();

        assert!(matches!(err, ConfigError::InvalidEventsField(_)));
    }
}
