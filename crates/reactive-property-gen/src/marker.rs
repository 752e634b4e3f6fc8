//! Marker definition provider.
//!
//! The marker is a fixed, non-configurable attribute type injected at the crate
//! root once per pass. Fields opt in by carrying an attribute whose path
//! resolves to [`MarkerIdentity`].
use crate::{
    generator::GeneratedUnit,
    model::{CanonicalPath, ModulePath},
    normalize::{self, CancellationToken, NormalizeError},
};
use darling::{FromMeta, ast::NestedMeta};
use std::sync::OnceLock;
use syn::{Attribute, Meta};

/// Type name of the marker attribute.
pub const MARKER_NAME: &str = "ReactiveProperty";

/// Key of the unit carrying the marker definition.
pub const MARKER_KEY: &str = "ReactivePropertyAttribute_g";

const DEFINITION_TEXT: &str = r#"
/// Requests a change-notifying property for a private field.
///
/// Valid on fields only. Not inherited, and applied at most once per field.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReactiveProperty {
    /// Reserved name override. The generator does not read it.
    pub property_name: Option<&'static str>,
}

impl ReactiveProperty {
    pub const TARGETS: &'static [&'static str] = &["field"];
    pub const INHERITED: bool = false;
    pub const ALLOW_MULTIPLE: bool = false;
}
"#;

///
/// DEFINITION
/// canonical marker text, rendered on first registration and kept for the process
///

static DEFINITION: OnceLock<String> = OnceLock::new();

/// Raw marker definition text, before normalization.
#[must_use]
pub const fn definition_text() -> &'static str {
    DEFINITION_TEXT
}

/// Register the marker definition, normalizing it on first use.
pub(crate) fn register() -> Result<&'static str, NormalizeError> {
    if let Some(text) = DEFINITION.get() {
        return Ok(text);
    }

    let text = normalize::normalize(MARKER_KEY, DEFINITION_TEXT, &CancellationToken::new())?;

    Ok(DEFINITION.get_or_init(|| text))
}

/// The marker definition as a unit for the host, once registered.
pub(crate) fn unit() -> Option<GeneratedUnit> {
    DEFINITION
        .get()
        .map(|text| GeneratedUnit::new(MARKER_KEY, None, text.clone()))
}

///
/// MarkerIdentity
///
/// Structural identity of the marker type: `crate::ReactiveProperty`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarkerIdentity {
    path: CanonicalPath,
}

impl MarkerIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: CanonicalPath::in_module(&ModulePath::root(), MARKER_NAME),
        }
    }

    #[must_use]
    pub fn matches(&self, path: Option<&CanonicalPath>) -> bool {
        path.is_some_and(|path| *path == self.path)
    }

    #[must_use]
    pub const fn path(&self) -> &CanonicalPath {
        &self.path
    }
}

impl Default for MarkerIdentity {
    fn default() -> Self {
        Self::new()
    }
}

///
/// MarkerArgs
///
/// Arguments accepted by the marker. `property_name` is parsed but never
/// consulted by the emitter.
///

#[derive(Clone, Debug, Default, Eq, FromMeta, PartialEq)]
pub struct MarkerArgs {
    #[darling(default)]
    pub property_name: Option<String>,
}

impl MarkerArgs {
    pub fn from_attribute(attr: &Attribute) -> Result<Self, darling::Error> {
        match &attr.meta {
            Meta::Path(_) => Ok(Self::default()),
            Meta::List(list) => {
                let items = NestedMeta::parse_meta_list(list.tokens.clone())?;

                Self::from_list(&items)
            }
            Meta::NameValue(name_value) => {
                Err(darling::Error::unsupported_format("name-value").with_span(name_value))
            }
        }
    }
}

///
/// TESTS
///
