use super::*;
use crate::language::{
    span::{Location, Span},
    types::Literal,
};

fn integer() -> Type {
    Type::named("Integer")
}

fn array(elem: Type) -> Type {
    Type::instance("Array", vec![elem])
}

fn subst(pairs: &[(&str, Type)]) -> Substitution {
    let mut subst = Substitution::new();
    for (name, ty) in pairs {
        subst.insert(*name, ty.clone());
    }
    subst
}

fn every_type_variant() -> Vec<Type> {
    let callback = Function::returning(Type::var("T")).with_required([integer()]);
    vec![
        Type::var("T"),
        array(Type::var("T")),
        Type::singleton("Array"),
        Type::interface("_Each", vec![Type::var("Elem")]),
        Type::alias("json", vec![Type::var("T")]),
        Type::union(vec![integer(), Type::Nil]),
        Type::intersection(vec![Type::interface("_ToS", vec![]), Type::var("T")]),
        Type::optional(Type::var("T")),
        Type::tuple(vec![integer(), Type::var("U")]),
        Type::record([("id".to_string(), integer()), ("tag".to_string(), Type::var("T"))]),
        Type::proc(
            callback.clone(),
            Some(Block::new(Function::returning(Type::Void), false)),
        ),
        Type::proc(callback, None),
        Type::literal(Literal::Integer(42)),
        Type::literal(Literal::String("ok".into())),
        Type::literal(Literal::Symbol("ok".into())),
        Type::literal(Literal::Bool(true)),
        Type::Untyped,
        Type::Void,
        Type::Bool,
        Type::Nil,
        Type::Top,
        Type::Bottom,
        Type::SelfType,
        Type::Instance,
        Type::Class,
    ]
}

#[test]
fn empty_substitution_is_identity() {
    let empty = Substitution::new();
    for ty in every_type_variant() {
        assert_eq!(empty.apply(&ty), ty, "{ty}");
    }
}

#[test]
fn empty_substitution_leaves_signatures_untouched() {
    let empty = Substitution::new();
    let function = Function::returning(Type::proc(
        Function::returning(Type::var("U")).with_required([Type::var("T")]),
        None,
    ))
    .with_required([Type::var("T")])
    .with_optional([Type::optional(integer())])
    .with_rest(Type::Untyped)
    .with_keyword("limit", integer(), true)
    .with_keyword("name", Type::var("U"), false)
    .with_rest_keywords(Type::Untyped);
    let block = Block::new(
        Function::returning(Type::Bool).with_required([Type::var("T"), Type::SelfType]),
        true,
    );
    let method = MethodType::new(function.clone())
        .with_type_params(["T", "U"])
        .with_block(block.clone())
        .with_location(Location::new("sig/core.toml", Span::new(3, 41)));

    let applied = empty.apply_method(&method);
    assert_eq!(applied, method);
    assert_eq!(applied.to_string(), method.to_string());
    assert_eq!(applied.location, method.location);
    assert_eq!(empty.apply_function(&function), function);
    assert_eq!(empty.apply_block(&block), block);
}

#[test]
fn replaces_variables_deep_inside_types() {
    let s = subst(&[("T", integer())]);
    let ty = Type::record([(
        "items".to_string(),
        Type::optional(array(Type::var("T"))),
    )]);
    assert_eq!(
        s.apply(&ty),
        Type::record([("items".to_string(), Type::optional(array(integer())))])
    );
}

#[test]
fn application_is_single_pass() {
    let s = subst(&[("T", array(Type::var("T")))]);
    let once = s.apply(&Type::var("T"));
    assert_eq!(once, array(Type::var("T")));
    assert_eq!(s.apply(&once), array(array(Type::var("T"))));
}

#[test]
fn closed_images_make_application_idempotent() {
    let s = subst(&[("K", integer()), ("V", Type::named("String"))]);
    let ty = Type::instance("Hash", vec![Type::var("K"), Type::var("V")]);
    let once = s.apply(&ty);
    assert_eq!(s.apply(&once), once);
}

#[test]
fn unknown_variables_pass_through() {
    let s = subst(&[("T", integer())]);
    assert_eq!(s.apply(&Type::var("U")), Type::var("U"));
}

#[test]
fn method_type_params_shadow_outer_entries() {
    let s = subst(&[("T", integer()), ("Elem", Type::named("String"))]);
    let method = MethodType::new(
        Function::returning(Type::var("T")).with_required([Type::var("Elem")]),
    )
    .with_type_params(["T"]);
    let applied = s.apply_method(&method);
    assert_eq!(applied.function.return_type, Type::var("T"));
    assert_eq!(applied.function.required[0].ty, Type::named("String"));
    assert_eq!(applied.type_params, vec!["T".to_string()]);
}

#[test]
fn instance_and_class_follow_instance_type() {
    let s = Substitution::new().with_instance_type(Type::instance("Box", vec![integer()]));
    assert_eq!(s.apply(&Type::Instance), Type::instance("Box", vec![integer()]));
    assert_eq!(s.apply(&Type::Class), Type::singleton("Box"));
    assert_eq!(s.apply(&Type::SelfType), Type::SelfType);
}

#[test]
fn images_do_not_reintroduce_domain_variables() {
    let s = subst(&[("A", integer()), ("B", array(Type::named("String")))]);
    let ty = Type::tuple(vec![Type::var("A"), Type::var("B"), Type::var("C")]);
    let free = s.apply(&ty).free_variables();
    assert!(s.domain().all(|name| !free.contains(name)));
    assert!(free.contains("C"));
}

#[test]
fn build_pairs_params_positionally() {
    let s = Substitution::build(&["K".to_string(), "V".to_string()], &[integer()]);
    assert_eq!(s.get("K"), Some(&integer()));
    assert_eq!(s.get("V"), None);
}

#[test]
fn compose_pushes_images_through_outer() {
    let inner = subst(&[("Elem", Type::var("T"))]);
    let outer = subst(&[("T", integer()), ("U", Type::Bool)]);
    let composed = inner.compose(&outer);
    assert_eq!(composed.get("Elem"), Some(&integer()));
    assert_eq!(composed.get("U"), Some(&Type::Bool));
    let ty = array(Type::var("Elem"));
    assert_eq!(composed.apply(&ty), outer.apply(&inner.apply(&ty)));
}

#[test]
fn without_skips_only_named_variables() {
    let s = subst(&[("T", integer()), ("U", Type::Bool)]);
    let child = s.without(["T"]);
    assert!(child.is_skipped("T"));
    assert_eq!(child.apply(&Type::var("T")), Type::var("T"));
    assert_eq!(child.apply(&Type::var("U")), Type::Bool);
}

#[test]
fn applies_inside_blocks_and_functions() {
    let s = subst(&[("Elem", integer())]);
    let block = Block::new(
        Function::returning(Type::Void).with_required([Type::var("Elem")]),
        true,
    );
    assert_eq!(s.apply_block(&block).to_string(), "{ (Integer) -> void }");
    let function = Function::returning(array(Type::var("Elem")))
        .with_keyword("fill", Type::var("Elem"), false);
    assert_eq!(
        s.apply_function(&function).to_string(),
        "(?fill: Integer) -> Array[Integer]"
    );
    assert!(!s.is_empty());
    assert!(Substitution::new().is_empty());
}
