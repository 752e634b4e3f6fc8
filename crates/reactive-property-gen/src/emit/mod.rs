//! Property emitter.
//!
//! Turns one `TypeGroup` into the raw text of one unit: an `<Owner>Events`
//! struct with a `ChangeEvent` slot per property, and an `impl` block with a
//! getter, a change-checking setter, and an event accessor for each field.
mod naming;

pub use naming::{EVENT_SUFFIX, FIELD_PREFIX, NameError, event_name, property_name};

use crate::{
    diagnostic::{Diagnostic, DiagnosticCode},
    generator::GeneratedUnit,
    group::TypeGroup,
    scan::FieldCandidate,
};
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use std::collections::{BTreeMap, BTreeSet};

///
/// PropertyDescriptor
///
/// Names derived for one field, plus the Rust identifiers rendered from them.
///

#[derive(Clone, Debug)]
pub struct PropertyDescriptor {
    pub property: String,
    pub event: String,
    pub field: Ident,
    pub ty: syn::Type,
    pub getter: Ident,
    pub setter: Ident,
    pub accessor: Ident,
}

impl PropertyDescriptor {
    pub fn from_candidate(candidate: &FieldCandidate) -> Result<Self, NameError> {
        let property = property_name(&candidate.name)?;
        let event = event_name(&property);

        let invalid = || NameError::InvalidIdentifier {
            field: candidate.name.clone(),
            derived: property.clone(),
        };
        let field = syn::parse_str::<Ident>(&candidate.name).map_err(|_| invalid())?;
        let getter = naming::method_ident(&property).ok_or_else(invalid)?;
        let accessor = naming::method_ident(&event).ok_or_else(invalid)?;
        let setter = format_ident!("set_{}", getter);

        Ok(Self {
            property,
            event,
            field,
            ty: candidate.ty.clone(),
            getter,
            setter,
            accessor,
        })
    }

    /// Every identifier this property adds to the owner and its events struct.
    fn idents(&self) -> [String; 3] {
        [
            self.getter.to_string(),
            self.setter.to_string(),
            self.accessor.to_string(),
        ]
    }
}

///
/// Emission
///
/// Raw output for one group. `unit` is `None` when no field produced a
/// property.
///

#[derive(Debug, Default)]
pub struct Emission {
    pub unit: Option<GeneratedUnit>,
    pub properties: usize,
    pub diagnostics: Vec<Diagnostic>,
}

// emit
#[must_use]
/// Emit the raw unit for a group under `key`.
pub fn emit(group: &TypeGroup, key: &str, events_field: &Ident) -> Emission {
    let mut emission = Emission::default();

    let mut derived = Vec::new();
    for candidate in &group.fields {
        match PropertyDescriptor::from_candidate(candidate) {
            Ok(descriptor) => derived.push((candidate, descriptor)),
            Err(err) => emission.diagnostics.push(
                Diagnostic::malformed_name(&err, candidate.location.clone()).in_unit(key),
            ),
        }
    }

    let mut properties = Vec::new();
    for (candidate, result) in without_collisions(derived) {
        match result {
            Ok(descriptor) => properties.push(descriptor),
            Err(err) => emission.diagnostics.push(
                Diagnostic::malformed_name(&err, candidate.location.clone()).in_unit(key),
            ),
        }
    }
    if properties.is_empty() {
        return emission;
    }

    let Some(builder) = UnitBuilder::new(group, events_field, &properties) else {
        emission.diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::Resolution,
                format!("owner `{}` cannot be named from generated code", group.owner),
            )
            .in_unit(key),
        );
        return emission;
    };

    let tokens = builder.generate();
    emission.properties = properties.len();
    emission.unit = Some(GeneratedUnit::new(
        key,
        group.owner.namespace().cloned(),
        tokens.to_string(),
    ));

    emission
}

// without_collisions
// snake-casing folds names like `ReactiveField` and `Reactive_field` together,
// so every field whose identifiers are shared is dropped
fn without_collisions(
    derived: Vec<(&FieldCandidate, PropertyDescriptor)>,
) -> Vec<(&FieldCandidate, Result<PropertyDescriptor, NameError>)> {
    let mut owners: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    for (candidate, descriptor) in &derived {
        for ident in descriptor.idents() {
            owners.entry(ident).or_default().insert(candidate.name.as_str());
        }
    }

    derived
        .into_iter()
        .map(|(candidate, descriptor)| {
            let clash = descriptor.idents().into_iter().find_map(|ident| {
                let other = owners[&ident]
                    .iter()
                    .find(|owner| **owner != candidate.name)?;
                Some(NameError::Collision {
                    field: candidate.name.clone(),
                    other: (*other).to_string(),
                    ident,
                })
            });

            (candidate, clash.map_or(Ok(descriptor), Err))
        })
        .collect()
}

///
/// UnitBuilder
///

struct UnitBuilder<'a> {
    name: Ident,
    owner: syn::Path,
    events_struct: Ident,
    events_field: &'a Ident,
    properties: &'a [PropertyDescriptor],
}

impl<'a> UnitBuilder<'a> {
    fn new(
        group: &TypeGroup,
        events_field: &'a Ident,
        properties: &'a [PropertyDescriptor],
    ) -> Option<Self> {
        let name = syn::parse_str::<Ident>(group.owner.name()).ok()?;

        // root types are addressed by bare name
        let owner = if group.owner.namespace().is_some() {
            syn::parse_str::<syn::Path>(&group.owner.to_string()).ok()?
        } else {
            syn::Path::from(name.clone())
        };

        Some(Self {
            events_struct: format_ident!("{}Events", name),
            name,
            owner,
            events_field,
            properties,
        })
    }

    fn generate(&self) -> TokenStream {
        let events = self.events_struct();
        let methods = self.properties.iter().map(|p| self.methods(p));
        let owner = &self.owner;

        quote! {
            #events

            impl #owner {
                #(#methods)*
            }
        }
    }

    // events_struct
    // one ChangeEvent per property, in field-name order
    fn events_struct(&self) -> TokenStream {
        let name = &self.events_struct;
        let doc = format!(" Change events for the reactive properties of `{}`.", self.name);
        let slots = self.properties.iter().map(|p| {
            let slot = &p.accessor;
            let doc = format!(" Raised after `{}` changes.", p.property);

            quote! {
                #[doc = #doc]
                pub #slot: ::reactive_property::ChangeEvent,
            }
        });

        quote! {
            #[doc = #doc]
            #[derive(Debug, Default)]
            pub struct #name {
                #(#slots)*
            }
        }
    }

    fn methods(&self, p: &PropertyDescriptor) -> TokenStream {
        let PropertyDescriptor {
            property,
            event,
            field,
            ty,
            getter,
            setter,
            accessor,
        } = p;
        let events = self.events_field;

        let getter_doc = format!(" Current value of `{property}`, backed by `{field}`.");
        let setter_doc =
            format!(" Set `{property}`, raising `{event}` only when the value changes.");
        let accessor_doc = format!(" Subscribe to or raise `{event}`.");

        quote! {
            #[doc = #accessor_doc]
            pub const fn #accessor(&mut self) -> &mut ::reactive_property::ChangeEvent {
                &mut self.#events.#accessor
            }

            #[doc = #getter_doc]
            #[must_use]
            pub const fn #getter(&self) -> &#ty {
                &self.#field
            }

            #[doc = #setter_doc]
            #[allow(clippy::float_cmp)]
            pub fn #setter(&mut self, value: #ty) {
                if self.#field != value {
                    self.#field = value;
                    self.#events.#accessor.publish();
                }
            }
        }
    }
}

///
/// TESTS
///
