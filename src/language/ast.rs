use crate::language::{
    span::Location,
    types::{MethodType, Type},
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variance {
    #[default]
    Invariant,
    Covariant,
    Contravariant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParam {
    pub name: String,
    #[serde(default)]
    pub variance: Variance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<Type>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_type: Option<Type>,
}

impl TypeParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variance: Variance::Invariant,
            upper_bound: None,
            default_type: None,
        }
    }

    pub fn with_default(mut self, ty: Type) -> Self {
        self.default_type = Some(ty);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuperClass {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Type>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixinKind {
    Include,
    Extend,
    Prepend,
}

impl fmt::Display for MixinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MixinKind::Include => write!(f, "include"),
            MixinKind::Extend => write!(f, "extend"),
            MixinKind::Prepend => write!(f, "prepend"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mixin {
    pub kind: MixinKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Type>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    #[default]
    Instance,
    Singleton,
    /// `def self?.name`: public on the singleton, private on instances.
    SingletonInstance,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub kind: MethodKind,
    pub overloads: Vec<MethodType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AliasDecl {
    pub new_name: String,
    pub old_name: String,
    #[serde(default)]
    pub singleton: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Reader,
    Writer,
    Accessor,
}

impl AttributeKind {
    pub fn reads(self) -> bool {
        matches!(self, AttributeKind::Reader | AttributeKind::Accessor)
    }

    pub fn writes(self) -> bool {
        matches!(self, AttributeKind::Writer | AttributeKind::Accessor)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeIvar {
    #[default]
    Default,
    Named {
        name: String,
    },
    Omitted,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeDecl {
    pub name: String,
    pub kind: AttributeKind,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub singleton: bool,
    #[serde(default)]
    pub ivar: AttributeIvar,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl AttributeDecl {
    pub fn ivar_name(&self) -> Option<String> {
        match &self.ivar {
            AttributeIvar::Default => Some(format!("@{}", self.name)),
            AttributeIvar::Named { name } => Some(name.clone()),
            AttributeIvar::Omitted => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum Member {
    Method(MethodDecl),
    Alias(AliasDecl),
    Attribute(AttributeDecl),
    InstanceVariable(VariableDecl),
    ClassInstanceVariable(VariableDecl),
    ClassVariable(VariableDecl),
    Public,
    Private,
}

impl Member {
    pub fn method(name: impl Into<String>, overloads: Vec<MethodType>) -> Self {
        Member::Method(MethodDecl {
            name: name.into(),
            kind: MethodKind::Instance,
            overloads,
            visibility: None,
            location: None,
        })
    }

    pub fn singleton_method(name: impl Into<String>, overloads: Vec<MethodType>) -> Self {
        Member::Method(MethodDecl {
            name: name.into(),
            kind: MethodKind::Singleton,
            overloads,
            visibility: None,
            location: None,
        })
    }

    pub fn alias(new_name: impl Into<String>, old_name: impl Into<String>) -> Self {
        Member::Alias(AliasDecl {
            new_name: new_name.into(),
            old_name: old_name.into(),
            singleton: false,
            location: None,
        })
    }

    pub fn attribute(name: impl Into<String>, kind: AttributeKind, ty: Type) -> Self {
        Member::Attribute(AttributeDecl {
            name: name.into(),
            kind,
            ty,
            singleton: false,
            ivar: AttributeIvar::Default,
            visibility: None,
            location: None,
        })
    }

    pub fn ivar(name: impl Into<String>, ty: Type) -> Self {
        Member::InstanceVariable(VariableDecl {
            name: name.into(),
            ty,
            location: None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_class: Option<SuperClass>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<Mixin>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModuleDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<Mixin>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<Mixin>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeAliasDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Class,
    Module,
    Interface,
    TypeAlias,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationKind::Class => write!(f, "class"),
            DeclarationKind::Module => write!(f, "module"),
            DeclarationKind::Interface => write!(f, "interface"),
            DeclarationKind::TypeAlias => write!(f, "type alias"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "declaration", rename_all = "snake_case")]
pub enum Declaration {
    Class(ClassDecl),
    Module(ModuleDecl),
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Class(decl) => &decl.name,
            Declaration::Module(decl) => &decl.name,
            Declaration::Interface(decl) => &decl.name,
            Declaration::TypeAlias(decl) => &decl.name,
        }
    }

    pub fn kind(&self) -> DeclarationKind {
        match self {
            Declaration::Class(_) => DeclarationKind::Class,
            Declaration::Module(_) => DeclarationKind::Module,
            Declaration::Interface(_) => DeclarationKind::Interface,
            Declaration::TypeAlias(_) => DeclarationKind::TypeAlias,
        }
    }

    pub fn type_params(&self) -> &[TypeParam] {
        match self {
            Declaration::Class(decl) => &decl.type_params,
            Declaration::Module(decl) => &decl.type_params,
            Declaration::Interface(decl) => &decl.type_params,
            Declaration::TypeAlias(decl) => &decl.type_params,
        }
    }

    pub fn mixins(&self) -> &[Mixin] {
        match self {
            Declaration::Class(decl) => &decl.mixins,
            Declaration::Module(decl) => &decl.mixins,
            Declaration::Interface(decl) => &decl.mixins,
            Declaration::TypeAlias(_) => &[],
        }
    }

    pub fn members(&self) -> &[Member] {
        match self {
            Declaration::Class(decl) => &decl.members,
            Declaration::Module(decl) => &decl.members,
            Declaration::Interface(decl) => &decl.members,
            Declaration::TypeAlias(_) => &[],
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            Declaration::Class(decl) => decl.location.as_ref(),
            Declaration::Module(decl) => decl.location.as_ref(),
            Declaration::Interface(decl) => decl.location.as_ref(),
            Declaration::TypeAlias(decl) => decl.location.as_ref(),
        }
    }
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            super_class: None,
            mixins: Vec::new(),
            members: Vec::new(),
            location: None,
        }
    }

    pub fn with_params(mut self, params: &[&str]) -> Self {
        self.type_params = params.iter().map(|name| TypeParam::new(*name)).collect();
        self
    }

    pub fn with_super(mut self, name: impl Into<String>, args: Vec<Type>) -> Self {
        self.super_class = Some(SuperClass {
            name: name.into(),
            args,
            location: None,
        });
        self
    }

    pub fn with_mixin(mut self, kind: MixinKind, name: impl Into<String>, args: Vec<Type>) -> Self {
        self.mixins.push(Mixin {
            kind,
            name: name.into(),
            args,
            location: None,
        });
        self
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }
}

impl ModuleDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            mixins: Vec::new(),
            members: Vec::new(),
            location: None,
        }
    }

    pub fn with_params(mut self, params: &[&str]) -> Self {
        self.type_params = params.iter().map(|name| TypeParam::new(*name)).collect();
        self
    }

    pub fn with_mixin(mut self, kind: MixinKind, name: impl Into<String>, args: Vec<Type>) -> Self {
        self.mixins.push(Mixin {
            kind,
            name: name.into(),
            args,
            location: None,
        });
        self
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }
}

impl InterfaceDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            mixins: Vec::new(),
            members: Vec::new(),
            location: None,
        }
    }

    pub fn with_params(mut self, params: &[&str]) -> Self {
        self.type_params = params.iter().map(|name| TypeParam::new(*name)).collect();
        self
    }

    pub fn with_include(mut self, name: impl Into<String>, args: Vec<Type>) -> Self {
        self.mixins.push(Mixin {
            kind: MixinKind::Include,
            name: name.into(),
            args,
            location: None,
        });
        self
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }
}
