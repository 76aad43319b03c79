use crate::{
    definition::{resolver::Resolver, Definition, ResolverConfig},
    language::{
        ast::{ClassDecl, Declaration, Member, MixinKind, ModuleDecl},
        env::DeclarationStore,
        types::{Function, MethodType, Type},
    },
};

pub(crate) fn ty(name: &str) -> Type {
    Type::named(name)
}

pub(crate) fn var(name: &str) -> Type {
    Type::var(name)
}

pub(crate) fn sig(params: Vec<Type>, ret: Type) -> MethodType {
    MethodType::new(Function::returning(ret).with_required(params))
}

pub(crate) fn def(name: &str, params: Vec<Type>, ret: Type) -> Member {
    Member::method(name, vec![sig(params, ret)])
}

pub(crate) fn sdef(name: &str, params: Vec<Type>, ret: Type) -> Member {
    Member::singleton_method(name, vec![sig(params, ret)])
}

pub(crate) fn resolver(decls: impl IntoIterator<Item = Declaration>) -> Resolver {
    resolver_with(decls, ResolverConfig::default())
}

pub(crate) fn resolver_with(
    decls: impl IntoIterator<Item = Declaration>,
    config: ResolverConfig,
) -> Resolver {
    let mut store = DeclarationStore::new();
    store.extend(decls).expect("declarations");
    Resolver::with_config(store, config)
}

/// `BasicObject`, `Kernel`, `Object`, `Module` and `Class`, wired the usual
/// way.
pub(crate) fn core_decls() -> Vec<Declaration> {
    vec![
        Declaration::Class(
            ClassDecl::new("BasicObject")
                .with_member(def("initialize", vec![], Type::Void))
                .with_member(def("==", vec![Type::Untyped], Type::Bool)),
        ),
        Declaration::Module(
            ModuleDecl::new("Kernel")
                .with_member(def("itself", vec![], Type::SelfType))
                .with_member(def("frozen?", vec![], Type::Bool)),
        ),
        Declaration::Class(
            ClassDecl::new("Object")
                .with_super("BasicObject", Vec::new())
                .with_mixin(MixinKind::Include, "Kernel", Vec::new()),
        ),
        Declaration::Class(
            ClassDecl::new("Module")
                .with_super("Object", Vec::new())
                .with_member(def("name", vec![], ty("String"))),
        ),
        Declaration::Class(
            ClassDecl::new("Class")
                .with_super("Module", Vec::new())
                .with_member(def("allocate", vec![], Type::Instance)),
        ),
    ]
}

pub(crate) fn core_config() -> ResolverConfig {
    ResolverConfig {
        implicit_superclass: Some("Object".into()),
        root_classes: vec!["BasicObject".into()],
        class_root: Some("Class".into()),
        module_root: Some("Module".into()),
        disable_cache: false,
    }
}

pub(crate) fn core_resolver(decls: impl IntoIterator<Item = Declaration>) -> Resolver {
    let mut all = core_decls();
    all.extend(decls);
    resolver_with(all, core_config())
}

/// Rendered overloads of `name`, in order.
pub(crate) fn signatures(definition: &Definition, name: &str) -> Vec<String> {
    definition
        .method(name)
        .unwrap_or_else(|| panic!("{name} missing from {}", definition.self_type))
        .overloads
        .iter()
        .map(ToString::to_string)
        .collect()
}
