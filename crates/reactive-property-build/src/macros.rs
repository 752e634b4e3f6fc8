//! Build-script entry point for crates that use reactive properties.
//!
//! Call `reactive_property::build!();` from a `build.rs` whose `main` returns
//! `Result<(), Box<dyn std::error::Error>>`.
#[macro_export]
macro_rules! build {
    () => {
        use std::{env::var, path::PathBuf};

        //
        // CARGO
        //
        // the manifest dir locates the source root and the optional
        // reactive-property.toml, OUT_DIR receives the units
        //

        let manifest_dir = PathBuf::from(var("CARGO_MANIFEST_DIR")?);
        let out_dir = PathBuf::from(var("OUT_DIR")?);

        //
        // UNITS
        //

        let report = ::reactive_property::build::generate(&manifest_dir, &out_dir)?;
        ::reactive_property::build::print_cargo_directives(&report);
    };
}
