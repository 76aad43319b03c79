use crate::language::{
    ast::{
        Declaration, DeclarationKind, Member, MethodKind, Mixin, MixinKind, SuperClass, TypeParam,
    },
    errors::{Arity, DeclarationError, ResolveError, ResolveResult},
    subst::Substitution,
    types::Type,
};
use std::collections::HashMap;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct TypeEntry {
    pub name: String,
    pub kind: DeclarationKind,
    decls: Vec<Declaration>,
}

impl TypeEntry {
    fn new(decl: Declaration) -> Self {
        Self {
            name: decl.name().to_string(),
            kind: decl.kind(),
            decls: vec![decl],
        }
    }

    pub fn decls(&self) -> &[Declaration] {
        &self.decls
    }

    pub fn type_params(&self) -> &[TypeParam] {
        self.decls[0].type_params()
    }

    pub fn param_names(&self) -> Vec<String> {
        self.type_params()
            .iter()
            .map(|param| param.name.clone())
            .collect()
    }

    pub fn arity(&self) -> Arity {
        let params = self.type_params();
        let required = params
            .iter()
            .take_while(|param| param.default_type.is_none())
            .count();
        Arity {
            min: required,
            max: params.len(),
        }
    }

    pub fn super_class(&self) -> Option<&SuperClass> {
        self.decls.iter().find_map(|decl| match decl {
            Declaration::Class(class) => class.super_class.as_ref(),
            _ => None,
        })
    }

    pub fn mixins(&self) -> impl Iterator<Item = &Mixin> + '_ {
        self.decls.iter().flat_map(|decl| decl.mixins().iter())
    }

    pub fn self_args(&self) -> Vec<Type> {
        self.type_params()
            .iter()
            .map(|param| Type::var(param.name.clone()))
            .collect()
    }

    pub fn instantiate_args(&self, args: &[Type], context: &str) -> ResolveResult<Vec<Type>> {
        let arity = self.arity();
        if !arity.accepts(args.len()) {
            return Err(ResolveError::InvalidArgumentCount {
                name: self.name.clone(),
                expected: arity,
                received: args.len(),
                context: context.to_string(),
            });
        }
        let params = self.type_params();
        let mut filled = args.to_vec();
        for param in &params[args.len()..] {
            let names: Vec<String> = params[..filled.len()]
                .iter()
                .map(|p| p.name.clone())
                .collect();
            let subst = Substitution::build(&names, &filled);
            let default = param.default_type.as_ref().map_or(Type::Untyped, |ty| subst.apply(ty));
            filled.push(default);
        }
        Ok(filled)
    }
}

#[derive(Clone, Debug, Default)]
pub struct DeclarationStore {
    entries: HashMap<String, TypeEntry>,
    order: Vec<String>,
    generation: u64,
}

impl DeclarationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, decl: Declaration) -> Result<(), DeclarationError> {
        if let Declaration::Interface(_) = &decl {
            validate_interface(&decl)?;
        }
        let name = decl.name().to_string();
        match self.entries.get_mut(&name) {
            Some(entry) => {
                reopen(entry, &decl)?;
                entry.decls.push(decl);
                debug!(name = %name, bodies = entry.decls.len(), "reopened declaration");
            }
            None => {
                debug!(name = %name, kind = %decl.kind(), "added declaration");
                self.order.push(name.clone());
                self.entries.insert(name, TypeEntry::new(decl));
            }
        }
        self.generation += 1;
        Ok(())
    }

    pub fn extend<I>(&mut self, decls: I) -> Result<(), DeclarationError>
    where
        I: IntoIterator<Item = Declaration>,
    {
        for decl in decls {
            self.insert(decl)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TypeEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn require(&self, name: &str, context: &str) -> ResolveResult<&TypeEntry> {
        self.get(name)
            .ok_or_else(|| ResolveError::unresolved(name, context))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// One level of alias expansion: `name[args]` becomes the aliased type
    /// with the alias parameters substituted. The result may itself name
    /// further aliases.
    pub fn expand_alias(&self, name: &str, args: &[Type]) -> ResolveResult<Type> {
        let entry = self.require(name, name)?;
        let Some(Declaration::TypeAlias(decl)) = entry.decls.first() else {
            return Err(ResolveError::InvalidAncestorKind {
                name: name.to_string(),
                found: entry.kind,
                expected: "a type alias",
                context: name.to_string(),
            });
        };
        let args = entry.instantiate_args(args, name)?;
        let subst = Substitution::build(&entry.param_names(), &args);
        Ok(subst.apply(&decl.ty))
    }
}

fn reopen(entry: &TypeEntry, decl: &Declaration) -> Result<(), DeclarationError> {
    let name = entry.name.clone();
    if entry.kind != decl.kind() {
        return Err(DeclarationError::KindMismatch {
            name,
            existing: entry.kind,
            found: decl.kind(),
        });
    }
    if matches!(
        entry.kind,
        DeclarationKind::Interface | DeclarationKind::TypeAlias
    ) {
        return Err(DeclarationError::DuplicateDeclaration {
            name,
            kind: entry.kind,
        });
    }
    let existing = entry.param_names();
    let found: Vec<String> = decl
        .type_params()
        .iter()
        .map(|param| param.name.clone())
        .collect();
    if existing != found {
        return Err(DeclarationError::GenericParameterMismatch {
            name,
            existing,
            found,
        });
    }
    if let (Some(current), Declaration::Class(class)) = (entry.super_class(), decl) {
        if let Some(next) = &class.super_class {
            if current.name != next.name || current.args != next.args {
                return Err(DeclarationError::SuperclassMismatch {
                    name,
                    existing: current.name.clone(),
                    found: next.name.clone(),
                });
            }
        }
    }
    Ok(())
}

fn validate_interface(decl: &Declaration) -> Result<(), DeclarationError> {
    let invalid = |member: &'static str| DeclarationError::InvalidInterfaceMember {
        name: decl.name().to_string(),
        member,
    };
    if decl
        .mixins()
        .iter()
        .any(|mixin| mixin.kind != MixinKind::Include)
    {
        return Err(invalid("extend or prepend directives"));
    }
    for member in decl.members() {
        match member {
            Member::Method(method) if method.kind == MethodKind::Instance => {}
            Member::Method(_) => return Err(invalid("singleton methods")),
            Member::Alias(alias) if !alias.singleton => {}
            Member::Alias(_) => return Err(invalid("singleton aliases")),
            Member::Attribute(_) => return Err(invalid("attributes")),
            Member::InstanceVariable(_)
            | Member::ClassInstanceVariable(_)
            | Member::ClassVariable(_) => return Err(invalid("variables")),
            Member::Public | Member::Private => return Err(invalid("visibility sections")),
        }
    }
    Ok(())
}
