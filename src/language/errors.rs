use crate::language::ast::DeclarationKind;
use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

pub type ResolveResult<T> = Result<T, ResolveError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: usize,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}..={}", self.min, self.max)
        }
    }
}

#[derive(Clone, Debug, Error, Diagnostic, PartialEq)]
pub enum ResolveError {
    #[error("cyclic ancestry for `{name}`: {}", .path.join(" -> "))]
    #[diagnostic(
        code(resolve::cyclic_ancestry),
        help("a class or module cannot appear in its own superclass or mixin chain")
    )]
    CyclicAncestry { name: String, path: Vec<String> },

    #[error("unknown type `{name}` referenced from `{context}`")]
    #[diagnostic(code(resolve::unresolved_name))]
    UnresolvedName { name: String, context: String },

    #[error("`{name}` expects {expected} type argument(s) but `{context}` supplies {received}")]
    #[diagnostic(code(resolve::invalid_argument_count))]
    InvalidArgumentCount {
        name: String,
        expected: Arity,
        received: usize,
        context: String,
    },

    #[error("alias `{new_name}` in `{owner}` refers to undefined method `{old_name}`")]
    #[diagnostic(
        code(resolve::unresolved_alias),
        help("an alias can only target a method declared before it or inherited from a farther ancestor")
    )]
    UnresolvedAlias {
        new_name: String,
        old_name: String,
        owner: String,
    },

    #[error("`{name}` is a {found} but `{context}` uses it as {expected}")]
    #[diagnostic(code(resolve::invalid_ancestor_kind))]
    InvalidAncestorKind {
        name: String,
        found: DeclarationKind,
        expected: &'static str,
        context: String,
    },
}

impl ResolveError {
    pub fn unresolved(name: impl Into<String>, context: impl Into<String>) -> Self {
        ResolveError::UnresolvedName {
            name: name.into(),
            context: context.into(),
        }
    }

    pub fn subject(&self) -> &str {
        match self {
            ResolveError::CyclicAncestry { name, .. }
            | ResolveError::UnresolvedName { name, .. }
            | ResolveError::InvalidArgumentCount { name, .. }
            | ResolveError::InvalidAncestorKind { name, .. } => name,
            ResolveError::UnresolvedAlias { new_name, .. } => new_name,
        }
    }
}

#[derive(Clone, Debug, Error, Diagnostic, PartialEq)]
pub enum DeclarationError {
    #[error("`{name}` is declared as a {existing} and cannot be reopened as a {found}")]
    #[diagnostic(code(declaration::kind_mismatch))]
    KindMismatch {
        name: String,
        existing: DeclarationKind,
        found: DeclarationKind,
    },

    #[error("`{name}` is reopened with type parameters [{}] but was declared with [{}]", .found.join(", "), .existing.join(", "))]
    #[diagnostic(
        code(declaration::generic_parameter_mismatch),
        help("every declaration body of a generic type must repeat the same parameter names")
    )]
    GenericParameterMismatch {
        name: String,
        existing: Vec<String>,
        found: Vec<String>,
    },

    #[error("`{name}` is declared with superclass `{existing}` and again with `{found}`")]
    #[diagnostic(code(declaration::superclass_mismatch))]
    SuperclassMismatch {
        name: String,
        existing: String,
        found: String,
    },

    #[error("{kind} `{name}` is declared more than once")]
    #[diagnostic(code(declaration::duplicate))]
    DuplicateDeclaration { name: String, kind: DeclarationKind },

    #[error("interface `{name}` cannot declare {member}")]
    #[diagnostic(
        code(declaration::invalid_interface_member),
        help("interfaces hold instance methods and aliases only")
    )]
    InvalidInterfaceMember { name: String, member: &'static str },
}
