use super::{DefinitionKind, ResolverConfig};
use crate::language::{
    ast::{DeclarationKind, Mixin, MixinKind},
    env::{DeclarationStore, TypeEntry},
    errors::{ResolveError, ResolveResult},
    types::Type,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AncestorSource {
    #[serde(rename = "self")]
    SelfType,
    Superclass,
    Include,
    Prepend,
    Extend,
    Root,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ancestor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Type>,
    pub source: AncestorSource,
    #[serde(default)]
    pub singleton: bool,
    /// Chain index of the ancestor whose declaration introduced this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduced_by: Option<usize>,
}

impl Ancestor {
    pub fn label(&self) -> String {
        if self.singleton {
            format!("singleton({})", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Ancestors in method-resolution order, closest first. A module reached
/// through several paths appears once per path.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AncestryChain {
    entries: Vec<Ancestor>,
}

impl AncestryChain {
    pub fn entries(&self) -> &[Ancestor] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Ancestor> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ancestor> {
        self.entries.iter()
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(Ancestor::label).collect()
    }
}

/// Partial chain produced while linearizing one declaration: `root` is the
/// index of that declaration's own entry, the one whose `introduced_by` is
/// still open.
struct Segment {
    entries: Vec<Ancestor>,
    root: usize,
}

pub struct Linearizer<'a> {
    store: &'a DeclarationStore,
    config: &'a ResolverConfig,
}

impl<'a> Linearizer<'a> {
    pub fn new(store: &'a DeclarationStore, config: &'a ResolverConfig) -> Self {
        Self { store, config }
    }

    pub fn ancestors(&self, name: &str, kind: DefinitionKind) -> ResolveResult<AncestryChain> {
        let entry = self.store.require(name, name)?;
        let mut stack = Vec::new();
        let segment = match kind {
            DefinitionKind::Instance => self.instance_segment(entry, &mut stack)?,
            DefinitionKind::Singleton => self.singleton_segment(entry, &mut stack)?,
        };
        debug!(
            type_name = name,
            kind = %kind,
            len = segment.entries.len(),
            "linearized ancestry"
        );
        Ok(AncestryChain {
            entries: segment.entries,
        })
    }

    fn instance_segment(
        &self,
        entry: &TypeEntry,
        stack: &mut Vec<String>,
    ) -> ResolveResult<Segment> {
        enter(stack, &entry.name)?;
        let segment = match entry.kind {
            DeclarationKind::Class | DeclarationKind::Module => self.mixin_layout(entry, stack),
            DeclarationKind::Interface => self.interface_layout(entry, stack),
            DeclarationKind::TypeAlias => Err(ResolveError::InvalidAncestorKind {
                name: entry.name.clone(),
                found: entry.kind,
                expected: "a class, module, or interface",
                context: stack_context(stack),
            }),
        };
        stack.pop();
        segment
    }

    /// `prepends… self includes… superclass…`
    fn mixin_layout(&self, entry: &TypeEntry, stack: &mut Vec<String>) -> ResolveResult<Segment> {
        let mixins = effective_mixins(entry);
        let mut prepends = Vec::new();
        for mixin in mixins.iter().filter(|m| m.kind == MixinKind::Prepend) {
            prepends.push(self.mixin_segment(entry, mixin, stack)?);
        }
        let mut includes = Vec::new();
        for mixin in mixins.iter().filter(|m| m.kind == MixinKind::Include) {
            includes.push(self.mixin_segment(entry, mixin, stack)?);
        }
        let super_segment = match entry.kind {
            DeclarationKind::Class => self.superclass_segment(entry, stack)?,
            _ => None,
        };

        let root = prepends.iter().map(|s| s.entries.len()).sum();
        let mut entries = Vec::new();
        for segment in prepends.into_iter().rev() {
            splice(&mut entries, segment, root);
        }
        entries.push(Ancestor {
            name: entry.name.clone(),
            args: entry.self_args(),
            source: AncestorSource::SelfType,
            singleton: false,
            introduced_by: None,
        });
        for segment in includes.into_iter().rev() {
            splice(&mut entries, segment, root);
        }
        if let Some(segment) = super_segment {
            splice(&mut entries, segment, root);
        }
        Ok(Segment { entries, root })
    }

    fn interface_layout(
        &self,
        entry: &TypeEntry,
        stack: &mut Vec<String>,
    ) -> ResolveResult<Segment> {
        let mixins = effective_mixins(entry);
        let mut includes = Vec::new();
        for mixin in &mixins {
            includes.push(self.mixin_segment(entry, mixin, stack)?);
        }
        let mut entries = vec![Ancestor {
            name: entry.name.clone(),
            args: entry.self_args(),
            source: AncestorSource::SelfType,
            singleton: false,
            introduced_by: None,
        }];
        for segment in includes.into_iter().rev() {
            splice(&mut entries, segment, 0);
        }
        Ok(Segment { entries, root: 0 })
    }

    fn mixin_segment(
        &self,
        owner: &TypeEntry,
        mixin: &Mixin,
        stack: &mut Vec<String>,
    ) -> ResolveResult<Segment> {
        let target = self.store.require(&mixin.name, &owner.name)?;
        check_mixin_kind(owner, mixin, target)?;
        let args = target.instantiate_args(&mixin.args, &owner.name)?;
        let mut segment = self.instance_segment(target, stack)?;
        let root = &mut segment.entries[segment.root];
        root.args = args;
        root.source = match mixin.kind {
            MixinKind::Include => AncestorSource::Include,
            MixinKind::Prepend => AncestorSource::Prepend,
            MixinKind::Extend => AncestorSource::Extend,
        };
        Ok(segment)
    }

    fn superclass_segment(
        &self,
        entry: &TypeEntry,
        stack: &mut Vec<String>,
    ) -> ResolveResult<Option<Segment>> {
        let Some((super_entry, args)) = self.superclass_of(entry)? else {
            return Ok(None);
        };
        let mut segment = self.instance_segment(super_entry, stack)?;
        let root = &mut segment.entries[segment.root];
        root.args = args;
        root.source = AncestorSource::Superclass;
        Ok(Some(segment))
    }

    fn superclass_of(
        &self,
        entry: &TypeEntry,
    ) -> ResolveResult<Option<(&'a TypeEntry, Vec<Type>)>> {
        let (name, args) = match entry.super_class() {
            Some(super_class) => (super_class.name.as_str(), super_class.args.as_slice()),
            None => match self.config.implicit_superclass_for(&entry.name) {
                Some(name) => (name, &[][..]),
                None => return Ok(None),
            },
        };
        let super_entry = self.store.require(name, &entry.name)?;
        if super_entry.kind != DeclarationKind::Class {
            return Err(ResolveError::InvalidAncestorKind {
                name: name.to_string(),
                found: super_entry.kind,
                expected: "a superclass",
                context: entry.name.clone(),
            });
        }
        let args = super_entry.instantiate_args(args, &entry.name)?;
        Ok(Some((super_entry, args)))
    }

    /// `singleton(self) extends… singleton(superclass)… root…`
    fn singleton_segment(
        &self,
        entry: &TypeEntry,
        stack: &mut Vec<String>,
    ) -> ResolveResult<Segment> {
        let label = format!("singleton({})", entry.name);
        if !matches!(entry.kind, DeclarationKind::Class | DeclarationKind::Module) {
            return Err(ResolveError::InvalidAncestorKind {
                name: entry.name.clone(),
                found: entry.kind,
                expected: "a class or module with a singleton",
                context: label,
            });
        }
        enter(stack, &label)?;

        let mixins = effective_mixins(entry);
        let mut extends = Vec::new();
        for mixin in mixins.iter().filter(|m| m.kind == MixinKind::Extend) {
            extends.push(self.mixin_segment(entry, mixin, stack)?);
        }
        let upper = match entry.kind {
            DeclarationKind::Class => match self.superclass_of(entry)? {
                Some((super_entry, _)) => {
                    let mut segment = self.singleton_segment(super_entry, stack)?;
                    segment.entries[segment.root].source = AncestorSource::Superclass;
                    Some(segment)
                }
                None => self.root_segment(self.config.class_root.as_deref(), entry, stack)?,
            },
            _ => self.root_segment(self.config.module_root.as_deref(), entry, stack)?,
        };

        let mut entries = vec![Ancestor {
            name: entry.name.clone(),
            args: Vec::new(),
            source: AncestorSource::SelfType,
            singleton: true,
            introduced_by: None,
        }];
        for segment in extends.into_iter().rev() {
            splice(&mut entries, segment, 0);
        }
        if let Some(segment) = upper {
            splice(&mut entries, segment, 0);
        }
        stack.pop();
        Ok(Segment { entries, root: 0 })
    }

    fn root_segment(
        &self,
        root: Option<&str>,
        entry: &TypeEntry,
        stack: &mut Vec<String>,
    ) -> ResolveResult<Option<Segment>> {
        let Some(root) = root else {
            return Ok(None);
        };
        let root_entry = self.store.require(root, &entry.name)?;
        let mut segment = self.instance_segment(root_entry, stack)?;
        for ancestor in &mut segment.entries {
            ancestor.source = AncestorSource::Root;
        }
        Ok(Some(segment))
    }
}

/// Mixins across every declaration body, keeping only the last directive
/// when the same kind and target repeat.
fn effective_mixins(entry: &TypeEntry) -> Vec<&Mixin> {
    let all: Vec<&Mixin> = entry.mixins().collect();
    all.iter()
        .enumerate()
        .filter(|(i, mixin)| {
            !all[i + 1..]
                .iter()
                .any(|later| later.kind == mixin.kind && later.name == mixin.name)
        })
        .map(|(_, mixin)| *mixin)
        .collect()
}

fn check_mixin_kind(owner: &TypeEntry, mixin: &Mixin, target: &TypeEntry) -> ResolveResult<()> {
    let allowed = match (owner.kind, mixin.kind) {
        (DeclarationKind::Interface, _) => target.kind == DeclarationKind::Interface,
        (_, MixinKind::Prepend) => target.kind == DeclarationKind::Module,
        (_, MixinKind::Include | MixinKind::Extend) => matches!(
            target.kind,
            DeclarationKind::Module | DeclarationKind::Interface
        ),
    };
    if allowed {
        return Ok(());
    }
    Err(ResolveError::InvalidAncestorKind {
        name: target.name.clone(),
        found: target.kind,
        expected: match owner.kind {
            DeclarationKind::Interface => "an included interface",
            _ if mixin.kind == MixinKind::Prepend => "a prepended module",
            _ => "a mixin",
        },
        context: owner.name.clone(),
    })
}

fn enter(stack: &mut Vec<String>, name: &str) -> ResolveResult<()> {
    if let Some(pos) = stack.iter().position(|seen| seen == name) {
        let mut path = stack[pos..].to_vec();
        path.push(name.to_string());
        return Err(ResolveError::CyclicAncestry {
            name: name.to_string(),
            path,
        });
    }
    stack.push(name.to_string());
    Ok(())
}

fn stack_context(stack: &[String]) -> String {
    stack.last().cloned().unwrap_or_default()
}

fn splice(entries: &mut Vec<Ancestor>, segment: Segment, introducer: usize) {
    let offset = entries.len();
    for mut ancestor in segment.entries {
        ancestor.introduced_by = Some(match ancestor.introduced_by {
            Some(index) => index + offset,
            None => introducer,
        });
        entries.push(ancestor);
    }
}
