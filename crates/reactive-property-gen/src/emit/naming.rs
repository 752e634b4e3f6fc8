use convert_case::{Case, Casing};
use proc_macro2::{Ident, Span};
use thiserror::Error as ThisError;

/// Leading character that marks a private backing field.
pub const FIELD_PREFIX: char = '_';

/// Suffix appended to a property name to form its event name.
pub const EVENT_SUFFIX: &str = "Changed";

///
/// NameError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum NameError {
    #[error("field `{field}` is too short to derive a property name (needs at least 2 characters)")]
    TooShort { field: String },

    #[error("field `{field}` does not start with `_`; cannot derive a property name")]
    MissingPrefix { field: String },

    #[error("field `{field}` derives `{derived}`, which is not a usable identifier")]
    InvalidIdentifier { field: String, derived: String },

    #[error("field `{field}` generates `{ident}`, which field `{other}` also generates")]
    Collision {
        field: String,
        other: String,
        ident: String,
    },
}

/// Derive the property name: uppercase of the second character followed by
/// the rest of the name from the third character on.
pub fn property_name(field: &str) -> Result<String, NameError> {
    let mut chars = field.chars();
    let (Some(first), Some(second)) = (chars.next(), chars.next()) else {
        return Err(NameError::TooShort {
            field: field.to_string(),
        });
    };

    if first != FIELD_PREFIX {
        return Err(NameError::MissingPrefix {
            field: field.to_string(),
        });
    }

    let derived: String = second.to_uppercase().chain(chars).collect();
    if syn::parse_str::<syn::Ident>(&derived).is_err() {
        return Err(NameError::InvalidIdentifier {
            field: field.to_string(),
            derived,
        });
    }

    Ok(derived)
}

#[must_use]
pub fn event_name(property: &str) -> String {
    format!("{property}{EVENT_SUFFIX}")
}

/// Snake-case method identifier for a derived name, raw when it collides
/// with a keyword. `None` when no identifier can spell it.
pub(crate) fn method_ident(name: &str) -> Option<Ident> {
    let snake = name.to_case(Case::Snake);

    if syn::parse_str::<syn::Ident>(&snake).is_ok() {
        return Some(Ident::new(&snake, Span::call_site()));
    }

    match snake.as_str() {
        "" | "_" | "self" | "Self" | "super" | "crate" => None,
        _ if syn::parse_str::<syn::Ident>(&format!("r#{snake}")).is_ok() => {
            Some(Ident::new_raw(&snake, Span::call_site()))
        }
        _ => None,
    }
}

///
/// TESTS
///
