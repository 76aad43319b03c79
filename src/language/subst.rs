use crate::language::types::{Block, Function, MethodType, Type};
use std::collections::{BTreeMap, BTreeSet};

/// Type-variable to type mapping plus the names that must pass through
/// untouched because an inner signature re-binds them.
///
/// Application is single pass: a mapped type is inserted as-is and never
/// substituted again, so `T -> Array[T]` cannot expand forever. Unknown
/// variables are left alone, which lets the builder substitute partially
/// while walking an ancestry chain.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Substitution {
    mapping: BTreeMap<String, Type>,
    skip: BTreeSet<String>,
    instance_type: Option<Type>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(params: &[String], args: &[Type]) -> Self {
        let mut subst = Self::new();
        for (param, arg) in params.iter().zip(args) {
            subst.insert(param.clone(), arg.clone());
        }
        subst
    }

    pub fn insert(&mut self, name: impl Into<String>, ty: Type) {
        self.mapping.insert(name.into(), ty);
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.mapping.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty() && self.instance_type.is_none()
    }

    pub fn domain(&self) -> impl Iterator<Item = &str> + '_ {
        self.mapping.keys().map(String::as_str)
    }

    pub fn is_skipped(&self, name: &str) -> bool {
        self.skip.contains(name)
    }

    pub fn instance_type(&self) -> Option<&Type> {
        self.instance_type.as_ref()
    }

    pub fn with_instance_type(mut self, ty: Type) -> Self {
        self.instance_type = Some(ty);
        self
    }

    pub fn without<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut child = self.clone();
        child.skip.extend(names.into_iter().map(Into::into));
        child
    }

    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::Variable { name } => {
                if self.skip.contains(name) {
                    return ty.clone();
                }
                self.mapping.get(name).cloned().unwrap_or_else(|| ty.clone())
            }
            Type::Instance => self.instance_type.clone().unwrap_or(Type::Instance),
            Type::Class => match &self.instance_type {
                Some(Type::ClassInstance { name, .. }) => Type::singleton(name.clone()),
                _ => Type::Class,
            },
            _ => ty.map_type(|child| self.apply(child)),
        }
    }

    pub fn apply_function(&self, function: &Function) -> Function {
        function.map_type(|ty| self.apply(ty))
    }

    pub fn apply_block(&self, block: &Block) -> Block {
        block.map_type(|ty| self.apply(ty))
    }

    /// Substitutes into a method signature. The method's own type parameters
    /// shadow same-named entries for the duration of this signature.
    pub fn apply_method(&self, method: &MethodType) -> MethodType {
        let shadows = method
            .type_params
            .iter()
            .any(|param| self.mapping.contains_key(param));
        if shadows {
            let child = self.without(method.type_params.iter().cloned());
            method.map_type(|ty| child.apply(ty))
        } else {
            method.map_type(|ty| self.apply(ty))
        }
    }

    /// `self` then `outer`: every image of `self` is pushed through `outer`,
    /// and `outer`'s own entries fill names `self` does not bind. The
    /// instance type of `self` wins when both carry one.
    pub fn compose(&self, outer: &Substitution) -> Substitution {
        let mut mapping: BTreeMap<String, Type> = self
            .mapping
            .iter()
            .map(|(name, ty)| (name.clone(), outer.apply(ty)))
            .collect();
        for (name, ty) in &outer.mapping {
            mapping
                .entry(name.clone())
                .or_insert_with(|| ty.clone());
        }
        Substitution {
            mapping,
            skip: self.skip.union(&outer.skip).cloned().collect(),
            instance_type: self
                .instance_type
                .clone()
                .or_else(|| outer.instance_type.clone()),
        }
    }
}

#[cfg(test)]
mod tests;
