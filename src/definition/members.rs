use super::{ancestry::Ancestor, MemberKind, MethodDefinition, VariableDefinition};
use crate::language::{
    ast::{AttributeDecl, DeclarationKind, Member, MethodKind, Visibility},
    env::TypeEntry,
    errors::{ResolveError, ResolveResult},
    subst::Substitution,
    types::{Function, MethodType, Type},
};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default)]
pub(super) struct MemberTable {
    pub methods: BTreeMap<String, MethodDefinition>,
    pub variables: BTreeMap<String, VariableDefinition>,
}

/// Accumulates one ancestor's declaration bodies in source order.
///
/// `inherited` answers alias lookups that fall through this ancestor: the
/// method as resolved by the farther part of the chain.
pub(super) fn collect<'t>(
    entry: &TypeEntry,
    ancestor: &Ancestor,
    subst: &Substitution,
    inherited: impl Fn(&str) -> Option<&'t MethodDefinition>,
) -> ResolveResult<MemberTable> {
    let mut collector = Collector {
        owner: ancestor.label(),
        singleton: ancestor.singleton,
        interface: entry.kind == DeclarationKind::Interface,
        subst,
        table: MemberTable::default(),
    };
    for decl in entry.decls() {
        // Sections never leak from one body into the next.
        let mut section = Visibility::Public;
        for member in decl.members() {
            match member {
                Member::Public => section = Visibility::Public,
                Member::Private => section = Visibility::Private,
                Member::Method(method) => {
                    let Some((kind, visibility)) = collector.method_visibility(
                        &method.name,
                        method.kind,
                        method.visibility,
                        section,
                    ) else {
                        continue;
                    };
                    collector.add_method(&method.name, kind, visibility, &method.overloads);
                }
                Member::Alias(alias) => {
                    if alias.singleton != collector.singleton {
                        continue;
                    }
                    let target = collector
                        .table
                        .methods
                        .get(&alias.old_name)
                        .or_else(|| inherited(&alias.old_name))
                        .cloned()
                        .ok_or_else(|| ResolveError::UnresolvedAlias {
                            new_name: alias.new_name.clone(),
                            old_name: alias.old_name.clone(),
                            owner: collector.owner.clone(),
                        })?;
                    collector.table.methods.insert(
                        alias.new_name.clone(),
                        MethodDefinition {
                            name: alias.new_name.clone(),
                            visibility: target.visibility,
                            overloads: target.overloads,
                            defined_in: collector.owner.clone(),
                            origin: MemberKind::Alias,
                            alias_of: Some(alias.old_name.clone()),
                        },
                    );
                }
                Member::Attribute(attr) => {
                    if attr.singleton == collector.singleton {
                        collector.add_attribute(attr, section);
                    }
                }
                Member::InstanceVariable(var) => {
                    if !collector.singleton {
                        collector.add_variable(&var.name, &var.ty);
                    }
                }
                Member::ClassInstanceVariable(var) => {
                    if collector.singleton {
                        collector.add_variable(&var.name, &var.ty);
                    }
                }
                Member::ClassVariable(var) => collector.add_variable(&var.name, &var.ty),
            }
        }
    }
    Ok(collector.table)
}

struct Collector<'s> {
    owner: String,
    singleton: bool,
    interface: bool,
    subst: &'s Substitution,
    table: MemberTable,
}

impl Collector<'_> {
    fn method_visibility(
        &self,
        name: &str,
        kind: MethodKind,
        explicit: Option<Visibility>,
        section: Visibility,
    ) -> Option<(MemberKind, Visibility)> {
        if self.interface {
            return Some((MemberKind::InstanceMethod, Visibility::Public));
        }
        match (self.singleton, kind) {
            (false, MethodKind::Instance) => Some((
                MemberKind::InstanceMethod,
                explicit.unwrap_or_else(|| instance_default(name, section)),
            )),
            (false, MethodKind::SingletonInstance) => {
                Some((MemberKind::InstanceMethod, Visibility::Private))
            }
            (true, MethodKind::Singleton) => Some((
                MemberKind::SingletonMethod,
                explicit.unwrap_or(Visibility::Public),
            )),
            (true, MethodKind::SingletonInstance) => {
                Some((MemberKind::SingletonMethod, Visibility::Public))
            }
            (false, MethodKind::Singleton) | (true, MethodKind::Instance) => None,
        }
    }

    fn add_method(
        &mut self,
        name: &str,
        origin: MemberKind,
        visibility: Visibility,
        overloads: &[MethodType],
    ) {
        let substituted: Vec<MethodType> = overloads
            .iter()
            .map(|overload| self.subst.apply_method(overload))
            .collect();
        match self.table.methods.get_mut(name) {
            Some(existing) if existing.origin != MemberKind::Alias => {
                existing.overloads.extend(substituted);
            }
            _ => {
                self.table.methods.insert(
                    name.to_string(),
                    MethodDefinition {
                        name: name.to_string(),
                        visibility,
                        overloads: substituted,
                        defined_in: self.owner.clone(),
                        origin,
                        alias_of: None,
                    },
                );
            }
        }
    }

    fn add_attribute(&mut self, attr: &AttributeDecl, section: Visibility) {
        let visibility = match (attr.visibility, self.singleton) {
            (Some(explicit), _) => explicit,
            (None, true) => Visibility::Public,
            (None, false) => section,
        };
        if attr.kind.reads() {
            let reader = MethodType::new(Function::returning(attr.ty.clone()));
            self.add_method(&attr.name, MemberKind::Attribute, visibility, &[reader]);
        }
        if attr.kind.writes() {
            let writer = MethodType::new(
                Function::returning(attr.ty.clone()).with_required([attr.ty.clone()]),
            );
            let name = format!("{}=", attr.name);
            self.add_method(&name, MemberKind::Attribute, visibility, &[writer]);
        }
        if let Some(ivar) = attr.ivar_name() {
            self.add_variable(&ivar, &attr.ty);
        }
    }

    fn add_variable(&mut self, name: &str, ty: &Type) {
        self.table.variables.insert(
            name.to_string(),
            VariableDefinition {
                ty: self.subst.apply(ty),
                declared_in: self.owner.clone(),
            },
        );
    }
}

fn instance_default(name: &str, section: Visibility) -> Visibility {
    if name == "initialize" {
        Visibility::Private
    } else {
        section
    }
}
