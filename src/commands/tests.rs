//! Tests for the command helpers.

use super::check::check_store;
use super::list::list_lines;
use super::render::format_rendered;
use super::*;
use crate::value::Value;
use std::fs;
use tempfile::TempDir;

fn write_templates(dir: &Path) {
    fs::write(
        dir.join("welcome.yaml"),
        r#"
id: email.welcome
name: Welcome
template_type: email
subject: "Hi {{ user.name }}"
body: "{% for t in tips %}- {{ t }}\n{% endfor %}"
html_body: "<p>{{ user.name | upper }}</p>"
variables:
  - name: user
    var_type: object
    example: {name: Ann}
  - name: tips
    required: false
    default: []
"#,
    )
    .unwrap();
    fs::write(
        dir.join("code.yml"),
        "id: sms.code\nname: Code\ntemplate_type: sms\nformat: mustache\nbody: \"{{code}}\"\n",
    )
    .unwrap();
}

#[test]
fn test_parse_context_json_and_yaml() {
    let ctx = parse_context("inline", r#"{"name": "Ann", "n": 2}"#).unwrap();
    assert_eq!(ctx.get("name"), Some(&Value::from("Ann")));

    let ctx = parse_context("inline", "name: Bo\nitems: [1, 2]\n").unwrap();
    assert_eq!(ctx.get("name"), Some(&Value::from("Bo")));
    assert_eq!(
        ctx.get("items"),
        Some(&Value::List(vec![Value::Int(1), Value::Int(2)]))
    );

    assert!(parse_context("inline", "   ").unwrap().is_empty());
}

#[test]
fn test_parse_context_rejects_non_mapping() {
    let err = parse_context("inline", "[1, 2]").unwrap_err();
    assert!(matches!(err, StencilError::UserError(_)));
    let err = parse_context("inline", "a: [unclosed").unwrap_err();
    assert!(matches!(err, StencilError::UserError(ref m) if m.contains("inline")));
}

#[test]
fn test_read_context_from_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("ctx.json");
    fs::write(&path, r#"{"code": 42}"#).unwrap();

    let ctx = read_context(Some(path.as_path())).unwrap();
    assert_eq!(ctx.get("code"), Some(&Value::Int(42)));
    assert!(read_context(None).unwrap().is_empty());
    assert!(read_context(Some(temp.path().join("missing.json").as_path())).is_err());
}

#[test]
fn test_load_config_default_and_file() {
    assert_eq!(load_config(None).unwrap(), EngineConfig::default());

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("stencil.yaml");
    fs::write(&path, "default_locale: de\n").unwrap();
    assert_eq!(load_config(Some(path.as_path())).unwrap().default_locale, "de");
}

#[test]
fn test_render_through_loaded_manager() {
    let temp = TempDir::new().unwrap();
    write_templates(temp.path());
    let manager = load_manager(&EngineConfig::default(), temp.path()).unwrap();

    let ctx = parse_context("inline", r#"{"user": {"name": "Ann"}, "tips": ["a", "b"]}"#).unwrap();
    let rendered = manager.render("email.welcome", &ctx, None).unwrap();
    assert_eq!(
        format_rendered(&rendered),
        "Subject: Hi Ann\n\n- a\n- b\n\n\n--- html ---\n<p>ANN</p>\n"
    );
}

#[test]
fn test_preview_through_loaded_manager() {
    let temp = TempDir::new().unwrap();
    write_templates(temp.path());
    let manager = load_manager(&EngineConfig::default(), temp.path()).unwrap();

    let rendered = manager.preview("email.welcome", None).unwrap();
    assert_eq!(rendered.subject.as_deref(), Some("Hi Ann"));
    assert_eq!(rendered.body, "");

    let rendered = manager.preview("sms.code", None).unwrap();
    assert_eq!(format_rendered(&rendered), "\n");
}

#[test]
fn test_list_lines() {
    let temp = TempDir::new().unwrap();
    write_templates(temp.path());
    let manager = load_manager(&EngineConfig::default(), temp.path()).unwrap();

    let lines = list_lines(manager.store());
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("ID "));
    assert!(lines[1].starts_with("email.welcome  en      jinja2    email     Welcome"));
    assert!(lines[2].starts_with("sms.code       en      mustache  sms       Code"));
}

#[test]
fn test_check_store_reports_each_broken_text() {
    let temp = TempDir::new().unwrap();
    write_templates(temp.path());
    fs::write(
        temp.path().join("broken.yaml"),
        "id: broken\nname: B\ntemplate_type: text\nsubject: \"{% if x %}\"\nbody: \"{% endfor %}\"\n",
    )
    .unwrap();
    let manager = load_manager(&EngineConfig::default(), temp.path()).unwrap();

    let problems = check_store(manager.store());
    let fields: Vec<_> = problems.iter().map(|p| (p.id.as_str(), p.field)).collect();
    assert_eq!(fields, vec![("broken", "subject"), ("broken", "body")]);
    assert!(problems
        .iter()
        .all(|p| matches!(p.error, StencilError::Syntax { .. })));
    assert_eq!(problems[0].error.exit_code(), crate::exit_codes::RENDER_FAILURE);
}

#[test]
fn test_check_store_clean() {
    let temp = TempDir::new().unwrap();
    write_templates(temp.path());
    let manager = load_manager(&EngineConfig::default(), temp.path()).unwrap();
    assert!(check_store(manager.store()).is_empty());
}
