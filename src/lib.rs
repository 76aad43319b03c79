//! Resolves declarations of a mixin-based nominal object model into flat
//! definitions: every method, attribute and variable visible on a type,
//! with generic parameters substituted and ancestors linearized.

pub mod definition;
pub mod language;
pub mod project;
pub mod tools;

pub use definition::{
    ancestry::{Ancestor, AncestorSource, AncestryChain},
    resolver::Resolver,
    Definition, DefinitionKind, MethodDefinition, ResolverConfig,
};
pub use language::{
    errors::{DeclarationError, ResolveError, ResolveResult},
    types::{MethodType, Type},
};

#[cfg(test)]
mod tests;
