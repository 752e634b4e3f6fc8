//! Host model adapter.
//!
//! The generator sees a crate as a forest of parsed source files, each bound to
//! the module path it occupies. Everything here is read-only once built.
mod resolve;


pub use resolve::{CanonicalPath, FieldDecl, FieldSymbol, ResolveError, ResolvedAttribute, Scope};

use proc_macro2::Span;
use std::{
    fmt::{self, Display},
    fs,
    path::{Component, Path, PathBuf},
};
use syn::{Item, Visibility};
use thiserror::Error as ThisError;
use walkdir::WalkDir;

///
/// ModelError
///

#[derive(Debug, ThisError)]
pub enum ModelError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to walk '{path}': {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("failed to parse '{path}' at {line}:{column}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("'{path}' does not map to a module path")]
    UnmappedPath { path: PathBuf },
}

///
/// ModulePath
///
/// Crate-relative module path; the empty path is the crate root.
///

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ModulePath(Vec<String>);

impl ModulePath {
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Map a source-root-relative file path onto the module it defines.
    ///
    /// `lib.rs` / `main.rs` at the top are the root, `a.rs` and `a/mod.rs` are
    /// `a`, and `a/b.rs` is `a::b`.
    #[must_use]
    pub fn from_file_path(relative: &Path) -> Option<Self> {
        if relative.extension().is_none_or(|ext| ext != "rs") {
            return None;
        }

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_str()?.to_string()),
                Component::CurDir => {}
                _ => return None,
            }
        }

        let file = segments.pop()?;
        let stem = file.strip_suffix(".rs")?;
        match stem {
            "mod" => {}
            "lib" | "main" if segments.is_empty() => {}
            _ => segments.push(stem.to_string()),
        }

        Some(Self(segments))
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.into());

        Self(segments)
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;

        Some(Self(rest.to_vec()))
    }
}

impl Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("crate")
        } else {
            f.write_str(&self.0.join("::"))
        }
    }
}

///
/// TypeId
///
/// Stable identity of an owning type: the module it lives in plus its name.
/// Ordering is module path first, then name.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TypeId {
    module: ModulePath,
    name: String,
}

impl TypeId {
    #[must_use]
    pub fn new(module: ModulePath, name: impl Into<String>) -> Self {
        Self {
            module,
            name: name.into(),
        }
    }

    #[must_use]
    pub const fn module(&self) -> &ModulePath {
        &self.module
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace wrapper for generated text; `None` for crate-root types.
    #[must_use]
    pub fn namespace(&self) -> Option<&ModulePath> {
        (!self.module.is_root()).then_some(&self.module)
    }
}

impl Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.module.is_root() {
            write!(f, "crate::{}", self.name)
        } else {
            write!(f, "crate::{}::{}", self.module, self.name)
        }
    }
}

///
/// Accessibility
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Accessibility {
    Private,
    Restricted,
    Internal,
    Public,
}

impl Accessibility {
    /// Declared accessibility of a field. Enum variant fields carry no
    /// visibility of their own and are as public as the enum.
    #[must_use]
    pub fn of(vis: &Visibility, in_variant: bool) -> Self {
        if in_variant {
            return Self::Public;
        }

        match vis {
            Visibility::Inherited => Self::Private,
            Visibility::Public(_) => Self::Public,
            Visibility::Restricted(restricted) => {
                let path = &restricted.path;
                if path.is_ident("self") {
                    Self::Private
                } else if path.is_ident("crate") {
                    Self::Internal
                } else {
                    Self::Restricted
                }
            }
        }
    }
}

impl Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Private => "private",
            Self::Restricted => "restricted",
            Self::Internal => "internal",
            Self::Public => "public",
        };

        f.write_str(label)
    }
}

///
/// Location
///
/// One-based line and column inside a source file.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl Location {
    #[must_use]
    pub fn from_span(file: &Path, span: Span) -> Self {
        let start = span.start();

        Self {
            file: file.to_path_buf(),
            line: start.line,
            column: start.column + 1,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

///
/// SourceFile
///

#[derive(Clone, Debug)]
pub struct SourceFile {
    path: PathBuf,
    module: ModulePath,
    syntax: syn::File,
}

impl SourceFile {
    pub fn parse(
        path: impl Into<PathBuf>,
        module: ModulePath,
        text: &str,
    ) -> Result<Self, ModelError> {
        let path = path.into();
        let syntax = syn::parse_file(text).map_err(|err| {
            let start = err.span().start();

            ModelError::Parse {
                path: path.clone(),
                line: start.line,
                column: start.column + 1,
                message: err.to_string(),
            }
        })?;

        Ok(Self {
            path,
            module,
            syntax,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn module(&self) -> &ModulePath {
        &self.module
    }

    #[must_use]
    pub const fn syntax(&self) -> &syn::File {
        &self.syntax
    }
}

///
/// Compilation
///
/// The declaration forest handed to one generation pass.
///

#[derive(Clone, Debug, Default)]
pub struct Compilation {
    files: Vec<SourceFile>,
}

impl Compilation {
    #[must_use]
    pub const fn new(files: Vec<SourceFile>) -> Self {
        Self { files }
    }

    /// Build from `(source-root-relative path, text)` pairs.
    pub fn from_sources<I, P, S>(sources: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = (P, S)>,
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let mut files = Vec::new();
        for (path, text) in sources {
            let path = path.as_ref();
            let module =
                ModulePath::from_file_path(path).ok_or_else(|| ModelError::UnmappedPath {
                    path: path.to_path_buf(),
                })?;
            files.push(SourceFile::parse(path, module, text.as_ref())?);
        }

        Ok(Self { files })
    }

    /// Load every `.rs` file below `root`, in file-name order.
    pub fn from_dir(root: &Path) -> Result<Self, ModelError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|source| ModelError::Walk {
                path: root.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let Some(module) = ModulePath::from_file_path(relative) else {
                continue;
            };

            let text = fs::read_to_string(path).map_err(|source| ModelError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            files.push(SourceFile::parse(path, module, &text)?);
        }

        Ok(Self { files })
    }

    #[must_use]
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Whether the crate root already binds `name`, as an item or an import.
    #[must_use]
    pub fn root_declares(&self, name: &str) -> bool {
        self.files
            .iter()
            .filter(|file| file.module.is_root())
            .any(|file| Scope::new(ModulePath::root(), &file.syntax.items).binds(name))
    }
}

/// Name an item introduces into its module's namespace, if any.
pub(crate) fn item_ident(item: &Item) -> Option<&syn::Ident> {
    match item {
        Item::Const(item) => Some(&item.ident),
        Item::Enum(item) => Some(&item.ident),
        Item::ExternCrate(item) => {
            Some(item.rename.as_ref().map_or(&item.ident, |(_, ident)| ident))
        }
        Item::Fn(item) => Some(&item.sig.ident),
        Item::Macro(item) => item.ident.as_ref(),
        Item::Mod(item) => Some(&item.ident),
        Item::Static(item) => Some(&item.ident),
        Item::Struct(item) => Some(&item.ident),
        Item::Trait(item) => Some(&item.ident),
        Item::TraitAlias(item) => Some(&item.ident),
        Item::Type(item) => Some(&item.ident),
        Item::Union(item) => Some(&item.ident),
        _ => None,
    }
}
