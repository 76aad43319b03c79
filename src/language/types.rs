use crate::language::span::Location;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    hash::{Hash, Hasher},
};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Type {
    Variable {
        name: String,
    },
    ClassInstance {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Type>,
    },
    ClassSingleton {
        name: String,
    },
    Interface {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Type>,
    },
    Alias {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Type>,
    },
    Union {
        types: Vec<Type>,
    },
    Intersection {
        types: Vec<Type>,
    },
    Optional {
        inner: Box<Type>,
    },
    Tuple {
        types: Vec<Type>,
    },
    Record {
        fields: BTreeMap<String, Type>,
    },
    Proc {
        function: Box<Function>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        block: Option<Box<Block>>,
    },
    Literal {
        value: Literal,
    },
    Untyped,
    Void,
    Bool,
    Nil,
    Top,
    Bottom,
    #[serde(rename = "self")]
    SelfType,
    Instance,
    Class,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Integer(i64),
    String(String),
    Symbol(String),
    Bool(bool),
}

/// A positional or rest parameter. The name is documentation only and takes
/// no part in equality or hashing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Param {
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty
    }
}

impl Eq for Param {}

impl Hash for Param {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ty.hash(state);
    }
}

impl Param {
    pub fn new(ty: Type) -> Self {
        Self { ty, name: None }
    }

    pub fn named(ty: Type, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: Some(name.into()),
        }
    }

    pub fn map_type<F: FnMut(&Type) -> Type>(&self, mut f: F) -> Param {
        Param {
            ty: f(&self.ty),
            name: self.name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeywordParam {
    #[serde(rename = "type")]
    pub ty: Type,
    pub required: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Function {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<Param>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optional: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest: Option<Param>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub keywords: BTreeMap<String, KeywordParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_keywords: Option<Param>,
    pub return_type: Type,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub function: Function,
    pub required: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MethodType {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,
    pub function: Function,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl PartialEq for MethodType {
    fn eq(&self, other: &Self) -> bool {
        self.type_params == other.type_params
            && self.function == other.function
            && self.block == other.block
    }
}

impl Eq for MethodType {}

impl Type {
    pub fn var(name: impl Into<String>) -> Self {
        Type::Variable { name: name.into() }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Type::ClassInstance {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn instance(name: impl Into<String>, args: Vec<Type>) -> Self {
        Type::ClassInstance {
            name: name.into(),
            args,
        }
    }

    pub fn singleton(name: impl Into<String>) -> Self {
        Type::ClassSingleton { name: name.into() }
    }

    pub fn interface(name: impl Into<String>, args: Vec<Type>) -> Self {
        Type::Interface {
            name: name.into(),
            args,
        }
    }

    pub fn alias(name: impl Into<String>, args: Vec<Type>) -> Self {
        Type::Alias {
            name: name.into(),
            args,
        }
    }

    pub fn union(types: Vec<Type>) -> Self {
        Type::Union { types }
    }

    pub fn intersection(types: Vec<Type>) -> Self {
        Type::Intersection { types }
    }

    pub fn optional(inner: Type) -> Self {
        Type::Optional {
            inner: Box::new(inner),
        }
    }

    pub fn tuple(types: Vec<Type>) -> Self {
        Type::Tuple { types }
    }

    pub fn record(fields: impl IntoIterator<Item = (String, Type)>) -> Self {
        Type::Record {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn proc(function: Function, block: Option<Block>) -> Self {
        Type::Proc {
            function: Box::new(function),
            block: block.map(Box::new),
        }
    }

    pub fn literal(value: Literal) -> Self {
        Type::Literal { value }
    }

    pub fn variable_name(&self) -> Option<&str> {
        match self {
            Type::Variable { name } => Some(name),
            _ => None,
        }
    }

    pub fn each_type(&self) -> Box<dyn Iterator<Item = &Type> + '_> {
        match self {
            Type::ClassInstance { args, .. }
            | Type::Interface { args, .. }
            | Type::Alias { args, .. } => Box::new(args.iter()),
            Type::Union { types } | Type::Intersection { types } | Type::Tuple { types } => {
                Box::new(types.iter())
            }
            Type::Optional { inner } => Box::new(std::iter::once(inner.as_ref())),
            Type::Record { fields } => Box::new(fields.values()),
            Type::Proc { function, block } => Box::new(
                function
                    .each_type()
                    .chain(block.iter().flat_map(|block| block.each_type())),
            ),
            Type::Variable { .. }
            | Type::ClassSingleton { .. }
            | Type::Literal { .. }
            | Type::Untyped
            | Type::Void
            | Type::Bool
            | Type::Nil
            | Type::Top
            | Type::Bottom
            | Type::SelfType
            | Type::Instance
            | Type::Class => Box::new(std::iter::empty()),
        }
    }

    pub fn map_type<F: FnMut(&Type) -> Type>(&self, mut f: F) -> Type {
        match self {
            Type::ClassInstance { name, args } => Type::ClassInstance {
                name: name.clone(),
                args: args.iter().map(&mut f).collect(),
            },
            Type::Interface { name, args } => Type::Interface {
                name: name.clone(),
                args: args.iter().map(&mut f).collect(),
            },
            Type::Alias { name, args } => Type::Alias {
                name: name.clone(),
                args: args.iter().map(&mut f).collect(),
            },
            Type::Union { types } => Type::Union {
                types: types.iter().map(&mut f).collect(),
            },
            Type::Intersection { types } => Type::Intersection {
                types: types.iter().map(&mut f).collect(),
            },
            Type::Tuple { types } => Type::Tuple {
                types: types.iter().map(&mut f).collect(),
            },
            Type::Optional { inner } => Type::Optional {
                inner: Box::new(f(inner)),
            },
            Type::Record { fields } => Type::Record {
                fields: fields
                    .iter()
                    .map(|(key, ty)| (key.clone(), f(ty)))
                    .collect(),
            },
            Type::Proc { function, block } => {
                let function = function.map_type(&mut f);
                let block = block.as_ref().map(|block| Box::new(block.map_type(&mut f)));
                Type::Proc {
                    function: Box::new(function),
                    block,
                }
            }
            leaf => leaf.clone(),
        }
    }

    pub fn free_variables(&self) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        self.collect_free_variables(&mut vars);
        vars
    }

    fn collect_free_variables(&self, vars: &mut BTreeSet<String>) {
        if let Type::Variable { name } = self {
            vars.insert(name.clone());
            return;
        }
        for child in self.each_type() {
            child.collect_free_variables(vars);
        }
    }

    fn needs_parens(&self) -> bool {
        matches!(
            self,
            Type::Union { .. } | Type::Intersection { .. } | Type::Proc { .. }
        )
    }
}

impl Function {
    pub fn returning(return_type: Type) -> Self {
        Function {
            required: Vec::new(),
            optional: Vec::new(),
            rest: None,
            keywords: BTreeMap::new(),
            rest_keywords: None,
            return_type,
        }
    }

    pub fn with_required(mut self, params: impl IntoIterator<Item = Type>) -> Self {
        self.required.extend(params.into_iter().map(Param::new));
        self
    }

    pub fn with_optional(mut self, params: impl IntoIterator<Item = Type>) -> Self {
        self.optional.extend(params.into_iter().map(Param::new));
        self
    }

    pub fn with_rest(mut self, ty: Type) -> Self {
        self.rest = Some(Param::new(ty));
        self
    }

    pub fn with_keyword(mut self, name: impl Into<String>, ty: Type, required: bool) -> Self {
        self.keywords
            .insert(name.into(), KeywordParam { ty, required });
        self
    }

    pub fn with_rest_keywords(mut self, ty: Type) -> Self {
        self.rest_keywords = Some(Param::new(ty));
        self
    }

    pub fn with_return_type(&self, return_type: Type) -> Function {
        Function {
            return_type,
            ..self.clone()
        }
    }

    pub fn each_type(&self) -> impl Iterator<Item = &Type> + '_ {
        self.required
            .iter()
            .chain(self.optional.iter())
            .chain(self.rest.iter())
            .map(|param| &param.ty)
            .chain(self.keywords.values().map(|keyword| &keyword.ty))
            .chain(self.rest_keywords.iter().map(|param| &param.ty))
            .chain(std::iter::once(&self.return_type))
    }

    pub fn map_type<F: FnMut(&Type) -> Type>(&self, mut f: F) -> Function {
        Function {
            required: self.required.iter().map(|p| p.map_type(&mut f)).collect(),
            optional: self.optional.iter().map(|p| p.map_type(&mut f)).collect(),
            rest: self.rest.as_ref().map(|p| p.map_type(&mut f)),
            keywords: self
                .keywords
                .iter()
                .map(|(name, keyword)| {
                    (
                        name.clone(),
                        KeywordParam {
                            ty: f(&keyword.ty),
                            required: keyword.required,
                        },
                    )
                })
                .collect(),
            rest_keywords: self.rest_keywords.as_ref().map(|p| p.map_type(&mut f)),
            return_type: f(&self.return_type),
        }
    }

    pub fn free_variables(&self) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        for ty in self.each_type() {
            vars.extend(ty.free_variables());
        }
        vars
    }

    fn has_params(&self) -> bool {
        !self.required.is_empty()
            || !self.optional.is_empty()
            || self.rest.is_some()
            || !self.keywords.is_empty()
            || self.rest_keywords.is_some()
    }
}

impl Block {
    pub fn new(function: Function, required: bool) -> Self {
        Self { function, required }
    }

    pub fn each_type(&self) -> impl Iterator<Item = &Type> + '_ {
        self.function.each_type()
    }

    pub fn map_type<F: FnMut(&Type) -> Type>(&self, f: F) -> Block {
        Block {
            function: self.function.map_type(f),
            required: self.required,
        }
    }
}

impl MethodType {
    pub fn new(function: Function) -> Self {
        Self {
            type_params: Vec::new(),
            function,
            block: None,
            location: None,
        }
    }

    pub fn with_type_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.block = Some(block);
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn each_type(&self) -> impl Iterator<Item = &Type> + '_ {
        self.function
            .each_type()
            .chain(self.block.iter().flat_map(|block| block.each_type()))
    }

    /// Rebuilds the signature through `f` without regard to the method's own
    /// type parameters. Substitution goes through `Substitution::apply_method`
    /// instead, which honours shadowing.
    pub fn map_type<F: FnMut(&Type) -> Type>(&self, mut f: F) -> MethodType {
        MethodType {
            type_params: self.type_params.clone(),
            function: self.function.map_type(&mut f),
            block: self.block.as_ref().map(|block| block.map_type(&mut f)),
            location: self.location.clone(),
        }
    }

    pub fn free_variables(&self) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        for ty in self.each_type() {
            vars.extend(ty.free_variables());
        }
        for param in &self.type_params {
            vars.remove(param);
        }
        vars
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Type], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_nested(f: &mut fmt::Formatter<'_>, ty: &Type) -> fmt::Result {
    if ty.needs_parens() {
        write!(f, "({ty})")
    } else {
        write!(f, "{ty}")
    }
}

fn write_named(f: &mut fmt::Formatter<'_>, name: &str, args: &[Type]) -> fmt::Result {
    write!(f, "{name}")?;
    if !args.is_empty() {
        write!(f, "[")?;
        write_list(f, args, ", ")?;
        write!(f, "]")?;
    }
    Ok(())
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(value) => write!(f, "{value}"),
            Literal::String(value) => write!(f, "{value:?}"),
            Literal::Symbol(value) => write!(f, ":{value}"),
            Literal::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Variable { name } => write!(f, "{name}"),
            Type::ClassInstance { name, args }
            | Type::Interface { name, args }
            | Type::Alias { name, args } => write_named(f, name, args),
            Type::ClassSingleton { name } => write!(f, "singleton({name})"),
            Type::Union { types } | Type::Intersection { types } => {
                let sep = if matches!(self, Type::Union { .. }) {
                    " | "
                } else {
                    " & "
                };
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{sep}")?;
                    }
                    write_nested(f, ty)?;
                }
                Ok(())
            }
            Type::Optional { inner } => {
                write_nested(f, inner)?;
                write!(f, "?")
            }
            Type::Tuple { types } => {
                write!(f, "[")?;
                write_list(f, types, ", ")?;
                write!(f, "]")
            }
            Type::Record { fields } => {
                write!(f, "{{ ")?;
                for (i, (key, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {ty}")?;
                }
                write!(f, " }}")
            }
            Type::Proc { function, block } => {
                write!(f, "^")?;
                if function.has_params() {
                    write!(f, "{} ", ParamList(function))?;
                } else {
                    write!(f, "() ")?;
                }
                if let Some(block) = block {
                    write!(f, "{block} ")?;
                }
                write!(f, "-> {}", function.return_type)
            }
            Type::Literal { value } => write!(f, "{value}"),
            Type::Untyped => write!(f, "untyped"),
            Type::Void => write!(f, "void"),
            Type::Bool => write!(f, "bool"),
            Type::Nil => write!(f, "nil"),
            Type::Top => write!(f, "top"),
            Type::Bottom => write!(f, "bot"),
            Type::SelfType => write!(f, "self"),
            Type::Instance => write!(f, "instance"),
            Type::Class => write!(f, "class"),
        }
    }
}

struct ParamList<'a>(&'a Function);

impl fmt::Display for ParamList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let function = self.0;
        let mut parts = Vec::new();
        let render = |prefix: &str, param: &Param| match &param.name {
            Some(name) => format!("{prefix}{} {name}", param.ty),
            None => format!("{prefix}{}", param.ty),
        };
        for param in &function.required {
            parts.push(render("", param));
        }
        for param in &function.optional {
            parts.push(render("?", param));
        }
        if let Some(rest) = &function.rest {
            parts.push(render("*", rest));
        }
        for (name, keyword) in &function.keywords {
            let prefix = if keyword.required { "" } else { "?" };
            parts.push(format!("{prefix}{name}: {}", keyword.ty));
        }
        if let Some(rest) = &function.rest_keywords {
            parts.push(render("**", rest));
        }
        write!(f, "({})", parts.join(", "))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", ParamList(self), self.return_type)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.required {
            write!(f, "?")?;
        }
        write!(f, "{{ {} }}", self.function)
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.type_params.is_empty() {
            write!(f, "[{}] ", self.type_params.join(", "))?;
        }
        write!(f, "{}", ParamList(&self.function))?;
        if let Some(block) = &self.block {
            write!(f, " {block}")?;
        }
        write!(f, " -> {}", self.function.return_type)
    }
}
