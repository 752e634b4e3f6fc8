//! ## Crate layout
//! - `model`: parsed source files bound to module paths, plus name resolution.
//! - `marker`: the injected `ReactiveProperty` attribute and its identity.
//! - `scan`: finds private fields carrying the marker.
//! - `group`: partitions candidates by owning type and assigns unit keys.
//! - `emit`: name derivation and raw unit text for one owning type.
//! - `normalize`: syntax validation and canonical layout.
//! - `generator`: the pass orchestrator and the host boundary.
//! - `diagnostic` / `obs`: what a pass reports and what it logs.
//! - `config`: generator settings read from `reactive-property.toml`.

pub mod config;
pub mod diagnostic;
pub mod emit;
pub mod generator;
pub mod group;
pub mod marker;
pub mod model;
pub mod normalize;
pub mod obs;
pub mod scan;

use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        config::GeneratorConfig,
        diagnostic::{Diagnostic, DiagnosticCode, Severity},
        generator::{
            GeneratedUnit, GeneratorHost, MemoryHost, PassReport, ReactivePropertyGenerator,
        },
        model::Compilation,
        normalize::CancellationToken,
    };
}

///
/// Error
///
/// Every way a pass can fail, for hosts that report rather than branch on
/// the stage.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Generate(#[from] generator::GenerateError),

    #[error(transparent)]
    Model(#[from] model::ModelError),

    #[error(transparent)]
    Normalize(#[from] normalize::NormalizeError),
}
