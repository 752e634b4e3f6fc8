use super::{Accessibility, Location, ModulePath, SourceFile, TypeId, item_ident};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{self, Display},
};
use syn::{Attribute, Field, Generics, Ident, Item, UseTree, spanned::Spanned};
use thiserror::Error as ThisError;

// leading-colon imports (`use ::dep::X`) never resolve into the crate
const EXTERNAL: &str = "::";

///
/// ResolveError
///

#[derive(Debug, ThisError)]
pub enum ResolveError {
    #[error("field {index} of `{owner}` has no name to derive a property from")]
    UnnamedField { owner: TypeId, index: usize },

    #[error("`{owner}` is declared inside a function body and cannot be augmented")]
    LocalOwner { owner: String },

    #[error("`{owner}` is generic; generic owning types are not supported")]
    GenericOwner { owner: TypeId },

    #[error("invalid marker arguments on `{field}`: {message}")]
    MarkerArguments { field: String, message: String },
}

///
/// CanonicalPath
///
/// Fully resolved crate-internal path, always starting at `crate`.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CanonicalPath(Vec<String>);

impl CanonicalPath {
    /// Path of `name` declared directly in `module`.
    #[must_use]
    pub fn in_module(module: &ModulePath, name: &str) -> Self {
        Self::relative_to(module, &[name.to_string()])
    }

    fn relative_to(module: &ModulePath, rest: &[String]) -> Self {
        let segments = std::iter::once("crate".to_string())
            .chain(module.segments().iter().cloned())
            .chain(rest.iter().cloned())
            .collect();

        Self(segments)
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("::"))
    }
}

///
/// Scope
///
/// Names visible inside one module body: its `use` bindings and the items it
/// declares. Inline modules get their own scope; imports are not inherited.
///

#[derive(Clone, Debug)]
pub struct Scope {
    module: ModulePath,
    imports: BTreeMap<String, Vec<String>>,
    locals: BTreeSet<String>,
}

impl Scope {
    #[must_use]
    pub fn new(module: ModulePath, items: &[Item]) -> Self {
        let mut imports = BTreeMap::new();
        let mut locals = BTreeSet::new();

        for item in items {
            if let Item::Use(item_use) = item {
                let prefix = if item_use.leading_colon.is_some() {
                    vec![EXTERNAL.to_string()]
                } else {
                    Vec::new()
                };
                collect_use(&item_use.tree, &prefix, &mut imports);
            } else if let Some(ident) = item_ident(item) {
                locals.insert(ident.to_string());
            }
        }

        Self {
            module,
            imports,
            locals,
        }
    }

    #[must_use]
    pub const fn module(&self) -> &ModulePath {
        &self.module
    }

    /// Whether `name` is bound in this module, by an item or a `use`.
    #[must_use]
    pub fn binds(&self, name: &str) -> bool {
        self.locals.contains(name) || self.imports.contains_key(name)
    }

    /// Resolve a path as written at a use site (attribute, type) in this scope.
    ///
    /// Returns `None` for paths that leave the crate.
    #[must_use]
    pub fn resolve_path(&self, path: &syn::Path) -> Option<CanonicalPath> {
        if path.leading_colon.is_some() {
            return None;
        }

        let segments: Vec<String> = path
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        let (first, rest) = segments.split_first()?;

        if let Some(target) = self.imports.get(first) {
            let mut full = target.clone();
            full.extend(rest.iter().cloned());

            return self.resolve_absolute(&full);
        }

        // unbound single names fall back to the crate root, where injected
        // definitions live
        if rest.is_empty() && !self.locals.contains(first) && !is_path_keyword(first) {
            return Some(CanonicalPath::in_module(&ModulePath::root(), first));
        }

        self.resolve_absolute(&segments)
    }

    // resolve_absolute
    // resolution rules for `use` targets: `crate`, `self`, `super` or a local item
    fn resolve_absolute(&self, segments: &[String]) -> Option<CanonicalPath> {
        let (first, rest) = segments.split_first()?;

        match first.as_str() {
            "crate" => Some(CanonicalPath(segments.to_vec())),
            "self" => Some(CanonicalPath::relative_to(&self.module, rest)),
            "super" => {
                let mut module = self.module.parent()?;
                let mut rest = rest;
                while let Some((next, tail)) = rest.split_first() {
                    if next != "super" {
                        break;
                    }
                    module = module.parent()?;
                    rest = tail;
                }

                Some(CanonicalPath::relative_to(&module, rest))
            }
            _ if self.locals.contains(first) => {
                Some(CanonicalPath::relative_to(&self.module, segments))
            }
            _ => None,
        }
    }
}

fn is_path_keyword(segment: &str) -> bool {
    matches!(segment, "crate" | "self" | "super" | "Self")
}

fn collect_use(tree: &UseTree, prefix: &[String], imports: &mut BTreeMap<String, Vec<String>>) {
    let extend = |ident: &Ident| {
        let mut target = prefix.to_vec();
        if ident != "self" {
            target.push(ident.to_string());
        }
        target
    };

    match tree {
        UseTree::Path(path) => {
            let mut next = prefix.to_vec();
            next.push(path.ident.to_string());
            collect_use(&path.tree, &next, imports);
        }
        UseTree::Name(name) => {
            let target = extend(&name.ident);
            if let Some(bound) = target.last() {
                imports.insert(bound.clone(), target.clone());
            }
        }
        UseTree::Rename(rename) => {
            if rename.rename != "_" {
                imports.insert(rename.rename.to_string(), extend(&rename.ident));
            }
        }
        UseTree::Glob(_) => {}
        UseTree::Group(group) => {
            for item in &group.items {
                collect_use(item, prefix, imports);
            }
        }
    }
}

///
/// ResolvedAttribute
///

#[derive(Clone, Debug)]
pub struct ResolvedAttribute<'a> {
    pub path: Option<CanonicalPath>,
    pub attr: &'a Attribute,
}

///
/// FieldDecl
///
/// Syntax-side view of one field-like declaration as the scanner meets it.
///

#[derive(Clone, Copy, Debug)]
pub struct FieldDecl<'a> {
    pub file: &'a SourceFile,
    pub scope: &'a Scope,
    pub owner: &'a Ident,
    pub generics: &'a Generics,
    pub local: bool,
    pub in_variant: bool,
    pub index: usize,
    pub field: &'a Field,
}

impl<'a> FieldDecl<'a> {
    #[must_use]
    pub fn accessibility(&self) -> Accessibility {
        Accessibility::of(&self.field.vis, self.in_variant)
    }

    #[must_use]
    pub fn attributes(&self) -> Vec<ResolvedAttribute<'a>> {
        self.field
            .attrs
            .iter()
            .map(|attr| ResolvedAttribute {
                path: self.scope.resolve_path(attr.path()),
                attr,
            })
            .collect()
    }

    #[must_use]
    pub fn location(&self) -> Location {
        let span = self
            .field
            .ident
            .as_ref()
            .map_or_else(|| self.field.span(), Ident::span);

        Location::from_span(self.file.path(), span)
    }

    /// Produce the semantic descriptor for the declared name.
    pub fn resolve(&self) -> Result<FieldSymbol, ResolveError> {
        if self.local {
            return Err(ResolveError::LocalOwner {
                owner: self.owner.to_string(),
            });
        }

        let owner = TypeId::new(self.scope.module().clone(), self.owner.to_string());
        if !self.generics.params.is_empty() {
            return Err(ResolveError::GenericOwner { owner });
        }

        let Some(ident) = &self.field.ident else {
            return Err(ResolveError::UnnamedField {
                owner,
                index: self.index,
            });
        };

        Ok(FieldSymbol {
            owner,
            name: ident.to_string(),
            ty: self.field.ty.clone(),
            accessibility: self.accessibility(),
            location: self.location(),
        })
    }
}

///
/// FieldSymbol
///

#[derive(Clone, Debug)]
pub struct FieldSymbol {
    pub owner: TypeId,
    pub name: String,
    pub ty: syn::Type,
    pub accessibility: Accessibility,
    pub location: Location,
}
