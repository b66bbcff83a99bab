//! Library crate root re-exporting the picker modules.

#[path = "lib/mod.rs"]
pub mod lib_mod;
pub use lib_mod as lib;
pub mod cli;
pub mod picker;
pub mod profiles;
pub mod session;
