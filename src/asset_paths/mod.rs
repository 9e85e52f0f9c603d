//! Helpers for turning discovered references into mirrorable URLs and flat local names.
//!
//! The responsibilities are split into focused submodules so the naming scheme, the relative
//! resolution rules and the inline-content filter can be tested independently. The rewrite
//! engine and the mirror builder both go through these helpers.

mod filters;
mod naming;
mod resolve;

pub use filters::is_inline_reference;
pub use naming::{extension_of, name_for, normalize_url};
pub use resolve::{Resolution, resolve, strip_query};
