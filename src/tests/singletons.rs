use super::support::{core_resolver, def, sdef, signatures, ty};
use crate::language::{
    ast::{ClassDecl, Declaration, MixinKind, ModuleDecl, Visibility},
    types::Type,
};

#[test]
fn class_singleton_sees_own_inherited_and_root_methods() {
    let resolver = core_resolver([Declaration::Class(
        ClassDecl::new("Widget")
            .with_member(def("initialize", vec![ty("String")], Type::Void))
            .with_member(sdef("create", vec![], Type::Instance)),
    )]);
    let widget = resolver.singleton_definition("Widget").expect("singleton");

    assert_eq!(widget.self_type, Type::singleton("Widget"));
    assert_eq!(signatures(&widget, "new"), vec!["(String) -> Widget"]);
    assert_eq!(signatures(&widget, "create"), vec!["() -> Widget"]);
    assert_eq!(signatures(&widget, "allocate"), vec!["() -> Widget"]);
    assert_eq!(signatures(&widget, "itself"), vec!["() -> self"]);
    let owner = |name: &str| widget.method(name).map(|m| m.defined_in.clone());
    assert_eq!(owner("create").as_deref(), Some("singleton(Widget)"));
    assert_eq!(owner("allocate").as_deref(), Some("Class"));
    assert_eq!(owner("name").as_deref(), Some("Module"));
    assert_eq!(owner("itself").as_deref(), Some("Kernel"));
    assert_eq!(owner("new").as_deref(), Some("Widget"));
}

#[test]
fn constructor_falls_back_to_inherited_initialize() {
    let resolver = core_resolver([Declaration::Class(ClassDecl::new("Plain"))]);
    let plain = resolver.singleton_definition("Plain").expect("singleton");
    assert_eq!(signatures(&plain, "new"), vec!["() -> Plain"]);
    assert_eq!(
        plain.method("new").map(|m| m.defined_in.as_str()),
        Some("BasicObject")
    );
    assert_eq!(
        plain.method("new").map(|m| m.visibility),
        Some(Visibility::Public)
    );
}

#[test]
fn singleton_methods_are_inherited_with_the_receiver_type() {
    let resolver = core_resolver([
        Declaration::Class(
            ClassDecl::new("Base").with_member(sdef("build", vec![], Type::Instance)),
        ),
        Declaration::Class(ClassDecl::new("Derived").with_super("Base", Vec::new())),
    ]);
    let derived = resolver.singleton_definition("Derived").expect("singleton");
    assert_eq!(signatures(&derived, "build"), vec!["() -> Derived"]);
    assert_eq!(
        derived.method("build").map(|m| m.defined_in.as_str()),
        Some("singleton(Base)")
    );
}

#[test]
fn generic_classes_use_untyped_for_instance_on_singleton() {
    let resolver = core_resolver([Declaration::Class(
        ClassDecl::new("Stack")
            .with_params(&["T"])
            .with_member(sdef("empty", vec![], Type::Instance)),
    )]);
    let stack = resolver.singleton_definition("Stack").expect("singleton");
    assert_eq!(signatures(&stack, "empty"), vec!["() -> Stack[untyped]"]);
    assert_eq!(signatures(&stack, "new"), vec!["[T] () -> Stack[T]"]);
}

#[test]
fn extended_modules_add_singleton_methods() {
    let resolver = core_resolver([
        Declaration::Module(
            ModuleDecl::new("Registry")
                .with_member(def("register", vec![ty("Symbol")], Type::Class)),
        ),
        Declaration::Class(
            ClassDecl::new("Plugin").with_mixin(MixinKind::Extend, "Registry", Vec::new()),
        ),
    ]);
    let plugin = resolver.singleton_definition("Plugin").expect("singleton");
    assert_eq!(signatures(&plugin, "register"), vec!["(Symbol) -> singleton(Plugin)"]);

    let instance = resolver.instance_definition("Plugin", &[]).expect("instance");
    assert!(instance.method("register").is_none());
}

#[test]
fn module_singleton_has_no_constructor() {
    let resolver = core_resolver([Declaration::Module(
        ModuleDecl::new("Util").with_member(sdef("helper", vec![], Type::Nil)),
    )]);
    let util = resolver.singleton_definition("Util").expect("singleton");
    assert!(util.method("new").is_none());
    assert_eq!(signatures(&util, "helper"), vec!["() -> nil"]);
    assert_eq!(signatures(&util, "name"), vec!["() -> String"]);
}
