//! Loading resolver settings and declaration files from disk.

pub mod loader;
pub mod manifest;

pub use loader::load_declarations;
pub use manifest::{ManifestError, ResolverManifest};
