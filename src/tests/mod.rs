mod manifest;
mod singletons;
pub(crate) mod support;
