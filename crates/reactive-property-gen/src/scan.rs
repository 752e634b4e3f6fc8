//! Field scanner.
//!
//! A read-only fold over the declaration forest. Each file is visited on its
//! own and the per-file results are concatenated, so nothing is shared between
//! visits.
use crate::{
    diagnostic::Diagnostic,
    marker::{MarkerArgs, MarkerIdentity},
    model::{
        Accessibility, Compilation, FieldDecl, Location, ResolveError, Scope, SourceFile, TypeId,
    },
    normalize,
};
use quote::ToTokens;
use syn::{
    Block, Field, Generics, Ident, ItemEnum, ItemMod, ItemStruct, ItemUnion,
    visit::{self, Visit},
};

///
/// FieldCandidate
///
/// A private field carrying the marker, resolved against the host model.
///

#[derive(Clone, Debug)]
pub struct FieldCandidate {
    pub owner: TypeId,
    pub name: String,
    pub ty: syn::Type,
    pub type_display: String,
    pub accessibility: Accessibility,
    pub location: Location,
    pub marker: MarkerArgs,
}

///
/// ScanOutput
///

#[derive(Debug, Default)]
pub struct ScanOutput {
    pub candidates: Vec<FieldCandidate>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ScanOutput {
    fn merge(mut self, other: Self) -> Self {
        self.candidates.extend(other.candidates);
        self.diagnostics.extend(other.diagnostics);
        self
    }
}

/// Scan every file of the compilation for marked private fields.
#[must_use]
pub fn scan(compilation: &Compilation, marker: &MarkerIdentity) -> ScanOutput {
    compilation
        .files()
        .iter()
        .map(|file| scan_file(file, marker))
        .fold(ScanOutput::default(), ScanOutput::merge)
}

fn scan_file(file: &SourceFile, marker: &MarkerIdentity) -> ScanOutput {
    let mut visitor = FieldVisitor {
        file,
        marker,
        scopes: vec![Scope::new(file.module().clone(), &file.syntax().items)],
        local_depth: 0,
        output: ScanOutput::default(),
    };
    visitor.visit_file(file.syntax());

    visitor.output
}

///
/// FieldVisitor
///

struct FieldVisitor<'a> {
    file: &'a SourceFile,
    marker: &'a MarkerIdentity,
    scopes: Vec<Scope>,
    local_depth: usize,
    output: ScanOutput,
}

impl FieldVisitor<'_> {
    fn field(
        &mut self,
        owner: &Ident,
        generics: &Generics,
        in_variant: bool,
        index: usize,
        field: &Field,
    ) {
        if field.attrs.is_empty() {
            return;
        }
        let Some(scope) = self.scopes.last() else {
            return;
        };

        let decl = FieldDecl {
            file: self.file,
            scope,
            owner,
            generics,
            local: self.local_depth > 0,
            in_variant,
            index,
            field,
        };
        scan_field(&decl, self.marker, &mut self.output);
    }
}

impl<'ast> Visit<'ast> for FieldVisitor<'_> {
    fn visit_item_mod(&mut self, node: &'ast ItemMod) {
        let Some((_, items)) = &node.content else {
            return;
        };
        let Some(scope) = self.scopes.last() else {
            return;
        };

        let module = scope.module().child(node.ident.to_string());
        self.scopes.push(Scope::new(module, items));
        visit::visit_item_mod(self, node);
        self.scopes.pop();
    }

    fn visit_block(&mut self, node: &'ast Block) {
        self.local_depth += 1;
        visit::visit_block(self, node);
        self.local_depth -= 1;
    }

    fn visit_item_struct(&mut self, node: &'ast ItemStruct) {
        for (index, field) in node.fields.iter().enumerate() {
            self.field(&node.ident, &node.generics, false, index, field);
        }
        visit::visit_item_struct(self, node);
    }

    fn visit_item_union(&mut self, node: &'ast ItemUnion) {
        for (index, field) in node.fields.named.iter().enumerate() {
            self.field(&node.ident, &node.generics, false, index, field);
        }
        visit::visit_item_union(self, node);
    }

    fn visit_item_enum(&mut self, node: &'ast ItemEnum) {
        for variant in &node.variants {
            for (index, field) in variant.fields.iter().enumerate() {
                self.field(&node.ident, &node.generics, true, index, field);
            }
        }
        visit::visit_item_enum(self, node);
    }
}

// scan_field
// marker first (by resolved identity), then accessibility, then resolution
fn scan_field(decl: &FieldDecl<'_>, marker: &MarkerIdentity, output: &mut ScanOutput) {
    let markers: Vec<_> = decl
        .attributes()
        .into_iter()
        .filter(|attribute| marker.matches(attribute.path.as_ref()))
        .collect();
    let Some(first) = markers.first() else {
        return;
    };

    if decl.accessibility() != Accessibility::Private {
        return;
    }

    let location = decl.location();
    let symbol = match decl.resolve() {
        Ok(symbol) => symbol,
        Err(err) => {
            output
                .diagnostics
                .push(Diagnostic::resolution(&err, location));
            return;
        }
    };

    let args = match MarkerArgs::from_attribute(first.attr) {
        Ok(args) => args,
        Err(err) => {
            let err = ResolveError::MarkerArguments {
                field: symbol.name,
                message: err.to_string(),
            };
            output
                .diagnostics
                .push(Diagnostic::resolution(&err, location));
            return;
        }
    };

    if markers.len() > 1 {
        output.diagnostics.push(Diagnostic::duplicate_marker(
            &symbol.name,
            markers.len(),
            location,
        ));
    }

    output.candidates.push(FieldCandidate {
        type_display: normalize::render_inline(symbol.ty.to_token_stream()),
        owner: symbol.owner,
        name: symbol.name,
        ty: symbol.ty,
        accessibility: symbol.accessibility,
        location: symbol.location,
        marker: args,
    });
}

///
/// TESTS
///
