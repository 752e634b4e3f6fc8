use proc_macro::TokenStream;

mod reactive;

/// Makes `#[ReactiveProperty]` legal on the fields of a struct.
///
/// The derive adds no code of its own. The build script reads the marked
/// fields from the same sources and generates the properties.
#[proc_macro_derive(Reactive, attributes(ReactiveProperty))]
pub fn derive_reactive(input: TokenStream) -> TokenStream {
    reactive::derive_reactive(input.into()).into()
}
