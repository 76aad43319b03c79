use super::{
    ancestry::{AncestorSource, AncestryChain, Linearizer},
    members::{self, MemberTable},
    Definition, DefinitionKind, MemberKind, MethodDefinition, ResolverConfig,
};
use crate::language::{
    ast::{DeclarationKind, Visibility},
    env::{DeclarationStore, TypeEntry},
    errors::{Arity, ResolveError, ResolveResult},
    subst::Substitution,
    types::{MethodType, Type},
};
use std::collections::{btree_map::Entry, BTreeMap, HashMap};
use tracing::{debug, trace};

pub struct DefinitionBuilder<'a> {
    store: &'a DeclarationStore,
    config: &'a ResolverConfig,
}

struct Instantiation {
    type_args: Vec<Type>,
    self_type: Type,
    instance_type: Option<Type>,
}

impl<'a> DefinitionBuilder<'a> {
    pub fn new(store: &'a DeclarationStore, config: &'a ResolverConfig) -> Self {
        Self { store, config }
    }

    pub fn ancestors(&self, name: &str, kind: DefinitionKind) -> ResolveResult<AncestryChain> {
        Linearizer::new(self.store, self.config).ancestors(name, kind)
    }

    pub fn build(
        &self,
        name: &str,
        args: &[Type],
        kind: DefinitionKind,
    ) -> ResolveResult<Definition> {
        let entry = self.store.require(name, name)?;
        let inst = instantiate(entry, args, kind)?;
        let chain = self.ancestors(name, kind)?;
        let base = Substitution::build(&entry.param_names(), &inst.type_args);
        let substs = self.ancestor_substitutions(&chain, &base, inst.instance_type.as_ref())?;

        // Farthest first, so an alias can see what the rest of the chain
        // already resolved.
        let mut tables: Vec<MemberTable> = Vec::with_capacity(chain.len());
        for (index, ancestor) in chain.iter().enumerate().rev() {
            let ancestor_entry = self.store.require(&ancestor.name, name)?;
            let table = members::collect(ancestor_entry, ancestor, &substs[index], |method| {
                tables.iter().rev().find_map(|table| table.methods.get(method))
            })?;
            trace!(
                ancestor = %ancestor.label(),
                methods = table.methods.len(),
                variables = table.variables.len(),
                "collected ancestor members"
            );
            tables.push(table);
        }
        tables.reverse();

        // Closest first; a name claimed by a closer ancestor is never merged
        // with a farther one.
        let mut methods = BTreeMap::new();
        let mut origins: HashMap<String, usize> = HashMap::new();
        let mut variables = BTreeMap::new();
        for (index, table) in tables.into_iter().enumerate() {
            for (method_name, method) in table.methods {
                if let Entry::Vacant(slot) = methods.entry(method_name) {
                    origins.insert(slot.key().clone(), index);
                    slot.insert(method);
                }
            }
            for (var_name, var) in table.variables {
                variables.entry(var_name).or_insert(var);
            }
        }

        if kind == DefinitionKind::Singleton && entry.kind == DeclarationKind::Class {
            let declared = origins
                .get("new")
                .and_then(|&index| chain.get(index))
                .is_some_and(|ancestor| ancestor.source != AncestorSource::Root);
            if !declared {
                if let Some(constructor) = self.constructor(entry)? {
                    methods.insert(constructor.name.clone(), constructor);
                }
            }
        }

        debug!(
            type_name = name,
            kind = %kind,
            ancestors = chain.len(),
            methods = methods.len(),
            variables = variables.len(),
            "built definition"
        );
        Ok(Definition::new(
            name.to_string(),
            kind,
            inst.self_type,
            inst.type_args,
            chain,
            methods,
            variables,
        ))
    }

    fn ancestor_substitutions(
        &self,
        chain: &AncestryChain,
        base: &Substitution,
        instance_type: Option<&Type>,
    ) -> ResolveResult<Vec<Substitution>> {
        let mut memo = vec![None; chain.len()];
        for index in 0..chain.len() {
            self.substitution_at(chain, index, base, instance_type, &mut memo)?;
        }
        Ok(memo.into_iter().map(Option::unwrap_or_default).collect())
    }

    /// Substitution for one ancestor: its parameters mapped to the arguments
    /// recorded at its inclusion site, composed with the substitution of
    /// whichever ancestor introduced it.
    fn substitution_at(
        &self,
        chain: &AncestryChain,
        index: usize,
        base: &Substitution,
        instance_type: Option<&Type>,
        memo: &mut Vec<Option<Substitution>>,
    ) -> ResolveResult<Substitution> {
        if let Some(subst) = &memo[index] {
            return Ok(subst.clone());
        }
        let ancestor = &chain.entries()[index];
        let outer = match ancestor.introduced_by {
            Some(parent) => self.substitution_at(chain, parent, base, instance_type, memo)?,
            None => base.clone(),
        };
        let mut subst = if ancestor.singleton {
            Substitution::new()
        } else {
            let entry = self.store.require(&ancestor.name, &ancestor.name)?;
            Substitution::build(&entry.param_names(), &ancestor.args).compose(&outer)
        };
        if let Some(instance_type) = instance_type {
            subst = subst.with_instance_type(instance_type.clone());
        }
        memo[index] = Some(subst.clone());
        Ok(subst)
    }

    fn constructor(&self, entry: &TypeEntry) -> ResolveResult<Option<MethodDefinition>> {
        let self_args = entry.self_args();
        let instance = self.build(&entry.name, &self_args, DefinitionKind::Instance)?;
        let Some(initialize) = instance.method("initialize") else {
            return Ok(None);
        };
        let class_params = entry.param_names();
        let instance_type = Type::instance(entry.name.clone(), self_args);
        let overloads = initialize
            .overloads
            .iter()
            .map(|overload| {
                let mut type_params = class_params.clone();
                type_params.extend(
                    overload
                        .type_params
                        .iter()
                        .filter(|param| !class_params.contains(param))
                        .cloned(),
                );
                MethodType {
                    type_params,
                    function: overload.function.with_return_type(instance_type.clone()),
                    block: overload.block.clone(),
                    location: overload.location.clone(),
                }
            })
            .collect();
        Ok(Some(MethodDefinition {
            name: "new".to_string(),
            visibility: Visibility::Public,
            overloads,
            defined_in: initialize.defined_in.clone(),
            origin: MemberKind::SingletonMethod,
            alias_of: None,
        }))
    }
}

fn instantiate(
    entry: &TypeEntry,
    args: &[Type],
    kind: DefinitionKind,
) -> ResolveResult<Instantiation> {
    let name = entry.name.as_str();
    match (entry.kind, kind) {
        (DeclarationKind::TypeAlias, _) => Err(ResolveError::InvalidAncestorKind {
            name: name.to_string(),
            found: entry.kind,
            expected: "a class, module, or interface",
            context: name.to_string(),
        }),
        (DeclarationKind::Interface, DefinitionKind::Singleton) => {
            Err(ResolveError::InvalidAncestorKind {
                name: name.to_string(),
                found: entry.kind,
                expected: "a class or module with a singleton",
                context: format!("singleton({name})"),
            })
        }
        (DeclarationKind::Interface, DefinitionKind::Instance) => {
            let type_args = entry.instantiate_args(args, name)?;
            Ok(Instantiation {
                self_type: Type::interface(name, type_args.clone()),
                type_args,
                instance_type: None,
            })
        }
        (_, DefinitionKind::Instance) => {
            let type_args = entry.instantiate_args(args, name)?;
            let self_type = Type::instance(name, type_args.clone());
            Ok(Instantiation {
                instance_type: Some(self_type.clone()),
                self_type,
                type_args,
            })
        }
        (_, DefinitionKind::Singleton) => {
            if !args.is_empty() {
                return Err(ResolveError::InvalidArgumentCount {
                    name: name.to_string(),
                    expected: Arity { min: 0, max: 0 },
                    received: args.len(),
                    context: format!("singleton({name})"),
                });
            }
            let untyped = vec![Type::Untyped; entry.type_params().len()];
            Ok(Instantiation {
                type_args: Vec::new(),
                self_type: Type::singleton(name),
                instance_type: Some(Type::instance(name, untyped)),
            })
        }
    }
}
