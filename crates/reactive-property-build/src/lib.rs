//! Build-script host for the reactive property generator.
//!
//! Runs one generation pass over the crate's source root and writes every
//! delivered unit to `OUT_DIR/<key>.rs`, where `include_generated!` picks it up.
mod config;
mod macros;

pub use config::{BuildConfig, CONFIG_FILE};

use reactive_property_gen::{
    Error as GenError,
    diagnostic::Diagnostic,
    generator::{MemoryHost, ReactivePropertyGenerator},
    model::Compilation,
    normalize::CancellationToken,
};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

///
/// BuildError
///

#[derive(Debug, ThisError)]
pub enum BuildError {
    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Generator(#[from] GenError),
}

///
/// BuildReport
///
/// What one build pass read and wrote.
///

#[derive(Debug, Default)]
pub struct BuildReport {
    /// Files the pass depends on, for `cargo:rerun-if-changed`.
    pub inputs: Vec<PathBuf>,

    /// Unit files written to `OUT_DIR`, marker first.
    pub outputs: Vec<PathBuf>,

    pub diagnostics: Vec<Diagnostic>,
}

impl BuildReport {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }
}

/// Load `reactive-property.toml` from the manifest directory, if present.
pub fn load_config(manifest_dir: &Path) -> Result<BuildConfig, BuildError> {
    let path = manifest_dir.join(CONFIG_FILE);

    match fs::read_to_string(&path) {
        Ok(text) => Ok(BuildConfig::from_toml_str(&text).map_err(GenError::from)?),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(BuildConfig::default()),
        Err(source) => Err(BuildError::Io { path, source }),
    }
}

// generate
/// Run the generator over the crate at `manifest_dir` and write its units
/// into `out_dir`.
pub fn generate(manifest_dir: &Path, out_dir: &Path) -> Result<BuildReport, BuildError> {
    let config = load_config(manifest_dir)?;
    let source_root = config.source_root(manifest_dir);
    let compilation = Compilation::from_dir(&source_root).map_err(GenError::from)?;

    let mut generator = ReactivePropertyGenerator::new(config.generator);
    generator.initialize().map_err(GenError::from)?;

    let mut host = MemoryHost::new();
    generator
        .execute(&compilation, &mut host, &CancellationToken::new())
        .map_err(GenError::from)?;

    // a missing path would make cargo rerun the script on every build
    let config_file = Some(manifest_dir.join(CONFIG_FILE)).filter(|path| path.is_file());
    let mut report = BuildReport {
        inputs: config_file
            .into_iter()
            .chain(std::iter::once(source_root))
            .chain(compilation.files().iter().map(|f| f.path().to_path_buf()))
            .collect(),
        ..BuildReport::default()
    };

    fs::create_dir_all(out_dir).map_err(|source| BuildError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;
    for unit in &host.units {
        let path = out_dir.join(format!("{}.rs", unit.key()));
        fs::write(&path, unit.body()).map_err(|source| BuildError::Io {
            path: path.clone(),
            source,
        })?;
        report.outputs.push(path);
    }
    report.diagnostics = host.diagnostics;

    Ok(report)
}

/// Print the cargo directives for a finished pass.
pub fn print_cargo_directives(report: &BuildReport) {
    println!("cargo:rerun-if-changed=build.rs");

    for input in &report.inputs {
        println!("cargo:rerun-if-changed={}", input.display());
    }
    for diagnostic in &report.diagnostics {
        println!("cargo:warning={diagnostic}");
    }
}

///
/// TESTS
///
