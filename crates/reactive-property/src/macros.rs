// include_generated
// splice one generated unit into the module that owns the type
/// Include a unit emitted by `build!` (placed in `OUT_DIR/<key>.rs`).
///
/// Invoke it inside the module that declares the owning type so the generated
/// `impl` can reach the type's private fields.
#[macro_export]
macro_rules! include_generated {
    ($key:literal) => {
        include!(concat!(env!("OUT_DIR"), "/", $key, ".rs"));
    };
}
