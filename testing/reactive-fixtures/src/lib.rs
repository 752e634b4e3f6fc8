//! Types whose reactive properties are generated by the build script.
#![allow(clippy::used_underscore_binding)]

pub mod game;
pub mod scenes;

reactive_property::include_generated!("ReactivePropertyAttribute_g");
