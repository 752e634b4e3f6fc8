//! ## Crate layout
//! - `build`: build-script entry point that runs the generator over `src/`.
//! - `Reactive`: derive whose only job is to make `#[ReactiveProperty]`
//!   legal on the fields the generator reads.
//! - `event`: the `ChangeEvent` observer list used by generated properties.
//! - `macros`: `include_generated!` for splicing generated units.
//!
//! Generated code refers to this crate by absolute path (`::reactive_property`),
//! so consuming crates only need it as a regular dependency and, for the build
//! script, as a build dependency.

pub use reactive_property_build as build;

mod event;
mod macros;

pub use event::{ChangeEvent, SubscriptionId};
pub use reactive_property_build::build;
pub use reactive_property_derive::Reactive;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
