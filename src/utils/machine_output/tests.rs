use super::*;

#[derive(Debug, Serialize)]
struct Payload {
    value: u32,
}

#[test]
fn envelope_ok_reflects_errors_empty() {
    let out = render_v1("list", Payload { value: 1 }, vec![], vec![], OutputFormat::Json)
        .unwrap()
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["version"], "v1");
    assert_eq!(json["command"], "list");
    assert_eq!(json["ok"], true);
    assert_eq!(json["data"]["value"], 1);
}

#[test]
fn errors_flip_ok() {
    let out = render_v1(
        "install",
        Payload { value: 0 },
        vec![],
        vec!["boom".to_string()],
        OutputFormat::Json,
    )
    .unwrap()
    .unwrap();
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["ok"], false);
    assert_eq!(json["errors"][0], "boom");
}

#[test]
fn yaml_contains_command() {
    let out = render_v1("search", Payload { value: 2 }, vec![], vec![], OutputFormat::Yaml)
        .unwrap()
        .unwrap();
    assert!(out.contains("command: search"));
}

#[test]
fn table_renders_nothing() {
    let out = render_v1("list", Payload { value: 2 }, vec![], vec![], OutputFormat::Table).unwrap();
    assert!(out.is_none());
}
