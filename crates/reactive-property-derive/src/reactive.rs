use proc_macro2::TokenStream;
use syn::{Attribute, Data, DeriveInput, Error, Fields, LitStr};

/// Helper attribute the build-time generator looks for.
const MARKER: &str = "ReactiveProperty";

// derive_reactive
// checks where the marker sits and what it carries, and expands to nothing
pub fn derive_reactive(input: TokenStream) -> TokenStream {
    match check(input) {
        Ok(()) => TokenStream::new(),
        Err(err) => err.to_compile_error(),
    }
}

fn check(input: TokenStream) -> Result<(), Error> {
    let input: DeriveInput = syn::parse2(input)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(Error::new_spanned(
                    &data.fields,
                    "Reactive can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(Error::new_spanned(
                &input.ident,
                "Reactive can only be derived for structs with named fields",
            ));
        }
    };

    let mut errors: Option<Error> = None;
    for attr in fields.iter().flat_map(|field| &field.attrs) {
        if let Err(err) = check_marker(attr) {
            match &mut errors {
                Some(errors) => errors.combine(err),
                None => errors = Some(err),
            }
        }
    }

    errors.map_or(Ok(()), Err)
}

// check_marker
// `#[ReactiveProperty]` or `#[ReactiveProperty(property_name = "..")]`
fn check_marker(attr: &Attribute) -> Result<(), Error> {
    if !attr.path().is_ident(MARKER) {
        return Ok(());
    }
    if matches!(attr.meta, syn::Meta::Path(_)) {
        return Ok(());
    }

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("property_name") {
            let value: LitStr = meta.value()?.parse()?;
            if value.value().is_empty() {
                return Err(meta.error("property_name cannot be empty"));
            }

            Ok(())
        } else {
            Err(meta.error("unknown ReactiveProperty argument"))
        }
    })
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    #[test]
    fn marked_struct_expands_to_nothing() {
        let out = derive_reactive(quote! {
            struct Player {
                #[ReactiveProperty]
                _health: u32,
                #[ReactiveProperty(property_name = "Label")]
                _name: String,
                events: PlayerEvents,
            }
        });

        assert!(out.is_empty());
    }

    #[test]
    fn other_attributes_are_left_alone() {
        let out = derive_reactive(quote! {
            struct S {
                #[serde(rename = "x", default)]
                _x: u8,
            }
        });

        assert!(out.is_empty());
    }

    #[test]
    fn unknown_marker_arguments_are_compile_errors() {
        let out = derive_reactive(quote! {
            struct S {
                #[ReactiveProperty(name = "X")]
                _x: u8,
                #[ReactiveProperty(property_name = "")]
                _y: u8,
            }
        })
        .to_string();

        assert_eq!(out.matches("compile_error").count(), 2);
        assert!(out.contains("unknown ReactiveProperty argument"));
        assert!(out.contains("property_name cannot be empty"));
    }

    #[test]
    fn enums_and_tuple_structs_are_rejected() {
        for input in [
            quote!(enum E { A }),
            quote!(struct T(#[ReactiveProperty] u8);),
        ] {
            let out = derive_reactive(input).to_string();
            assert!(out.contains("structs with named fields"), "{out}");
        }
    }
}
