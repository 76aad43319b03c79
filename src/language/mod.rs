pub mod ast;
pub mod env;
pub mod errors;
pub mod span;
pub mod subst;
pub mod types;
