//! End-to-end tests for registration and the export views.

use confreg_rs_registry::{
    BulkEntry, ConfigValue, Primitive, Registry, RegistryError, UNKNOWN_CATEGORY,
};
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy)]
enum Dispatch {
    RoundRobin,
    Weighted,
}

impl Primitive for Dispatch {
    fn to_primitive(&self) -> ConfigValue {
        match self {
            Dispatch::RoundRobin => "round_robin".into(),
            Dispatch::Weighted => "weighted".into(),
        }
    }
}

fn worker_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .bulk_add(
            "worker",
            [
                BulkEntry::placed("worker_port", 8070, ["port"]),
                BulkEntry::placed("dispatch", Dispatch::RoundRobin, ["invocation", "dispatch"]),
                BulkEntry::placed("cpu_share", 0.5, ["container", "cpu_share"]),
                BulkEntry::new("worker_log_dir", "/tmp/worker"),
            ],
            Some("WORKER"),
        )
        .expect("worker");
    registry
        .bulk_add(
            "controller",
            [("controller_port", 8089, ["port"])],
            Some("CONTROLLER"),
        )
        .expect("controller");
    registry
}

/// Bulk registration followed by env export for the same category.
#[test]
fn bulk_add_then_env_export() {
    let mut registry = Registry::new();
    registry
        .bulk_add(
            "net",
            [
                BulkEntry::from(("host", "localhost", ["net", "host"])),
                BulkEntry::from(("port", 8080, ["net", "port"])),
            ],
            Some("MYAPP"),
        )
        .expect("bulk add");
    let vars = registry.to_env_var_dict("net").expect("env");
    let expected: BTreeMap<String, String> = [
        ("MYAPP__net__host", "localhost"),
        ("MYAPP__net__port", "8080"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect();
    assert_eq!(vars, expected);
}

/// Enum defaults export their underlying value in every view.
#[test]
fn enum_defaults_export_underlying_value() {
    let mut registry = worker_registry();
    registry.set("dispatch", Dispatch::Weighted);

    let vars = registry.to_env_var_dict("worker").expect("env");
    assert_eq!(vars["WORKER__invocation__dispatch"], "weighted".to_string());
    assert_eq!(vars["WORKER__container__cpu_share"], "0.5".to_string());

    let mut doc = Map::new();
    let err = registry.to_json("worker", &mut doc).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidPlacement(name) if name == "worker_log_dir"));
    registry.set("worker_log_dir", Option::<String>::None);
    registry.to_json("worker", &mut doc).expect("to_json");
    assert_eq!(
        Value::Object(doc),
        json!({
            "port": 8070,
            "invocation": { "dispatch": "weighted" },
            "container": { "cpu_share": 0.5 },
        })
    );
}

/// The combined dump keeps its four-view shape when serialized.
#[test]
fn dump_serializes_with_stable_shape() {
    let mut registry = worker_registry();
    registry.overwrite([("stray", vec![1, 2])]);
    let dump = registry.to_dict().expect("dump");
    let value = serde_json::to_value(&dump).expect("json");

    assert_eq!(
        value["flat"],
        json!({
            "controller_port": 8089,
            "cpu_share": 0.5,
            "dispatch": "round_robin",
            "stray": [1, 2],
            "worker_log_dir": "/tmp/worker",
            "worker_port": 8070,
        })
    );
    assert_eq!(value["by_category"][UNKNOWN_CATEGORY], json!({ "stray": [1, 2] }));
    assert_eq!(value["structured"]["controller"], json!({ "port": 8089 }));
    assert_eq!(value["structured"][UNKNOWN_CATEGORY], json!({}));
    assert_eq!(
        value["env_var_prefixes"],
        json!({ "controller": "CONTROLLER", "worker": "WORKER" })
    );
}

/// Categories only export their own items.
#[test]
fn exports_are_scoped_to_category() {
    let registry = worker_registry();
    let vars = registry.to_env_var_dict("controller").expect("env");
    assert_eq!(
        vars.into_iter().collect::<Vec<_>>(),
        vec![("CONTROLLER__port".to_string(), "8089".to_string())]
    );
    assert!(matches!(
        registry.to_env_var_dict("missing"),
        Err(RegistryError::MissingPrefix(_))
    ));
}

/// Item records carry the normalized default and tree.
#[test]
fn item_records_are_normalized() {
    let registry = worker_registry();
    let records: Vec<Value> = registry
        .items_in("worker")
        .map(|item| serde_json::to_value(item.to_dict()).expect("record"))
        .collect();
    assert_eq!(
        records[1],
        json!({
            "name": "dispatch",
            "category": "worker",
            "default": "round_robin",
            "tree": ["invocation", "dispatch"],
        })
    );
}
