//! Resolution of declarations into flattened, queryable definitions.
//!
//! Data moves one way: the declaration store is linearized into an
//! [`ancestry::AncestryChain`], each ancestor contributes a member table
//! substituted with the type arguments that reach it, tables are merged with
//! closer ancestors winning, and the result is memoized per query.

pub mod ancestry;
pub mod builder;
pub mod cache;
mod members;
pub mod resolver;

use crate::language::{
    ast::Visibility,
    types::{MethodType, Type},
};
use ancestry::AncestryChain;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    Instance,
    Singleton,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionKind::Instance => write!(f, "instance"),
            DefinitionKind::Singleton => write!(f, "singleton"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    InstanceMethod,
    SingletonMethod,
    Alias,
    Attribute,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    pub implicit_superclass: Option<String>,
    pub root_classes: Vec<String>,
    pub class_root: Option<String>,
    pub module_root: Option<String>,
    pub disable_cache: bool,
}

impl ResolverConfig {
    pub(crate) fn implicit_superclass_for(&self, class_name: &str) -> Option<&str> {
        let implicit = self.implicit_superclass.as_deref()?;
        if implicit == class_name || self.root_classes.iter().any(|root| root == class_name) {
            return None;
        }
        Some(implicit)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodDefinition {
    pub name: String,
    pub visibility: Visibility,
    pub overloads: Vec<MethodType>,
    pub defined_in: String,
    pub origin: MemberKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableDefinition {
    #[serde(rename = "type")]
    pub ty: Type,
    pub declared_in: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub type_name: String,
    pub kind: DefinitionKind,
    pub self_type: Type,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_args: Vec<Type>,
    pub ancestors: AncestryChain,
    methods: BTreeMap<String, MethodDefinition>,
    variables: BTreeMap<String, VariableDefinition>,
}

impl Definition {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        type_name: String,
        kind: DefinitionKind,
        self_type: Type,
        type_args: Vec<Type>,
        ancestors: AncestryChain,
        methods: BTreeMap<String, MethodDefinition>,
        variables: BTreeMap<String, VariableDefinition>,
    ) -> Self {
        Self {
            type_name,
            kind,
            self_type,
            type_args,
            ancestors,
            methods,
            variables,
        }
    }

    pub fn members(&self) -> &BTreeMap<String, MethodDefinition> {
        &self.methods
    }

    pub fn method(&self, name: &str) -> Option<&MethodDefinition> {
        self.methods.get(name)
    }

    pub fn variables(&self) -> BTreeMap<&str, &Type> {
        self.variables
            .iter()
            .map(|(name, var)| (name.as_str(), &var.ty))
            .collect()
    }

    pub fn variable(&self, name: &str) -> Option<&VariableDefinition> {
        self.variables.get(name)
    }

    /// Variables still present in member signatures beyond each method's own
    /// type parameters. Empty for a fully instantiated query.
    pub fn free_variables(&self) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        for method in self.methods.values() {
            for overload in &method.overloads {
                vars.extend(overload.free_variables());
            }
        }
        for var in self.variables.values() {
            vars.extend(var.ty.free_variables());
        }
        vars
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.self_type, self.kind)?;
        for method in self.methods.values() {
            let head = format!("{} def {}:", method.visibility, method.name);
            for (i, overload) in method.overloads.iter().enumerate() {
                let lead = if i == 0 {
                    head.clone()
                } else {
                    format!("{:width$}|", "", width = head.len() - 1)
                };
                writeln!(f, "  {lead} {overload}  # {}", method.defined_in)?;
            }
        }
        for (name, var) in &self.variables {
            writeln!(f, "  {name}: {}  # {}", var.ty, var.declared_in)?;
        }
        Ok(())
    }
}
