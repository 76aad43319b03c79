use super::support::signatures;
use crate::{definition::resolver::Resolver, project::ManifestError};
use std::fs;
use tempfile::tempdir;

const CORE_SIG: &str = r#"
[[declarations]]
declaration = "class"
name = "Box"
type_params = [{ name = "T" }]
members = [
  { member = "method", name = "get", overloads = [{ function = { return_type = { kind = "variable", name = "T" } } }] },
  { member = "alias", new_name = "fetch", old_name = "get" },
]
"#;

const APP_SIG: &str = r#"{
  "declarations": [
    {
      "declaration": "class",
      "name": "IntBox",
      "super_class": {
        "name": "Box",
        "args": [{ "kind": "class_instance", "name": "Integer" }]
      }
    }
  ]
}"#;

#[test]
fn loads_signatures_listed_in_manifest() {
    let dir = tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("sig")).expect("sig dir");
    fs::write(dir.path().join("sig/core.toml"), CORE_SIG).expect("write core");
    fs::write(dir.path().join("sig/app.json"), APP_SIG).expect("write app");
    let manifest_path = dir.path().join("resolver.toml");
    fs::write(
        &manifest_path,
        r#"
[resolver]
cache = false

[[signatures]]
path = "sig/core.toml"

[[signatures]]
path = "sig/app.json"
"#,
    )
    .expect("write manifest");

    let resolver = Resolver::from_manifest(&manifest_path).expect("resolver");
    assert!(resolver.config().disable_cache);
    assert_eq!(resolver.store().names().collect::<Vec<_>>(), vec!["Box", "IntBox"]);

    let intbox = resolver.instance_definition("IntBox", &[]).expect("IntBox");
    assert_eq!(signatures(&intbox, "get"), vec!["() -> Integer"]);
    assert_eq!(signatures(&intbox, "fetch"), vec!["() -> Integer"]);
}

#[test]
fn conflicting_signature_files_are_rejected() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("a.toml"), CORE_SIG).expect("write a");
    fs::write(
        dir.path().join("b.json"),
        r#"{ "declarations": [{ "declaration": "module", "name": "Box" }] }"#,
    )
    .expect("write b");
    let manifest_path = dir.path().join("resolver.toml");
    fs::write(
        &manifest_path,
        "[[signatures]]\npath = \"a.toml\"\n\n[[signatures]]\npath = \"b.json\"\n",
    )
    .expect("write manifest");

    let err = match Resolver::from_manifest(&manifest_path) {
        Ok(_) => panic!("kind mismatch accepted"),
        Err(err) => err,
    };
    assert!(matches!(err, ManifestError::Declaration { ref path, .. } if path.ends_with("b.json")));
}
