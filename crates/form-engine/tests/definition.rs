use serde_json::{Value, json};

use form_engine::{DefinitionError, FormModel};

fn load(value: Value) -> Result<FormModel, DefinitionError> {
    FormModel::from_value(value)
}

fn condition(name: &str, entries: Value) -> Value {
    json!({ "name": name, "value": { "conditions": entries } })
}

#[test]
fn minimal_definition_loads() {
    let model = load(json!({ "pages": [{ "path": "/only" }] })).expect("loads");
    assert_eq!(model.version(), "1");
    assert_eq!(model.pages().len(), 2);
}

#[test]
fn invalid_json_is_reported() {
    let err = FormModel::from_json("{ not json").unwrap_err();
    assert!(matches!(err, DefinitionError::Json(_)));
}

#[test]
fn structural_violations_fail_fast() {
    let err = load(json!({ "pages": [{ "path": "/a", "components": [{ "type": "Slider", "name": "x" }] }] }))
        .unwrap_err();
    assert!(matches!(err, DefinitionError::Structure { .. }), "{err}");
}

#[test]
fn empty_page_list_is_rejected() {
    assert!(matches!(load(json!({ "pages": [] })).unwrap_err(), DefinitionError::NoPages));
}

#[test]
fn page_paths_must_be_unique_and_rooted() {
    let err = load(json!({ "pages": [{ "path": "/a" }, { "path": "/a" }] })).unwrap_err();
    assert!(matches!(err, DefinitionError::DuplicatePage { path } if path == "/a"));

    let err = load(json!({ "pages": [{ "path": "a" }] })).unwrap_err();
    assert!(matches!(err, DefinitionError::InvalidPath { .. }));

    let err = load(json!({ "pages": [{ "path": "/status" }] })).unwrap_err();
    assert!(matches!(err, DefinitionError::DuplicatePage { .. }));
}

#[test]
fn component_names_are_unique_per_scope() {
    let err = load(json!({
        "pages": [
            { "path": "/a", "components": [{ "type": "TextField", "name": "name", "title": "Name" }] },
            { "path": "/b", "components": [{ "type": "TextField", "name": "name", "title": "Name again" }] }
        ]
    }))
    .unwrap_err();
    assert!(matches!(err, DefinitionError::DuplicateComponent { name, .. } if name == "name"));

    load(json!({
        "sections": [{ "name": "partner", "title": "Partner" }],
        "pages": [
            { "path": "/a", "components": [{ "type": "TextField", "name": "name", "title": "Name" }] },
            {
                "path": "/b",
                "section": "partner",
                "components": [{ "type": "TextField", "name": "name", "title": "Partner name" }]
            }
        ]
    }))
    .expect("same name in another section is fine");
}

#[test]
fn root_fields_cannot_share_a_section_name() {
    let err = load(json!({
        "sections": [{ "name": "pet", "title": "Your pet" }],
        "pages": [
            { "path": "/a", "components": [{ "type": "TextField", "name": "pet", "title": "Pet" }] },
            {
                "path": "/b",
                "section": "pet",
                "components": [{ "type": "TextField", "name": "name", "title": "Pet name" }]
            }
        ]
    }))
    .unwrap_err();
    assert!(
        matches!(&err, DefinitionError::FieldShadowsSection { page, name } if page == "/a" && name == "pet"),
        "{err}"
    );

    load(json!({
        "sections": [{ "name": "pet", "title": "Your pet" }],
        "pages": [
            { "path": "/a", "components": [{ "type": "Para", "name": "pet", "content": "About your pet" }] }
        ]
    }))
    .expect("content components hold no answer");
}

#[test]
fn references_must_exist() {
    let err = load(json!({ "pages": [{ "path": "/a", "section": "ghost" }] })).unwrap_err();
    assert!(matches!(err, DefinitionError::UnknownSection { .. }));

    let err = load(json!({ "pages": [{ "path": "/a", "next": [{ "path": "/nowhere" }] }] })).unwrap_err();
    assert!(matches!(err, DefinitionError::UnknownLink { target, .. } if target == "/nowhere"));

    let err = load(json!({
        "pages": [{ "path": "/a", "next": [{ "path": "/a", "condition": "ghost" }] }]
    }))
    .unwrap_err();
    assert!(matches!(err, DefinitionError::UnknownCondition { condition, .. } if condition == "ghost"));

    let err = load(json!({
        "pages": [{ "path": "/a", "components": [{ "type": "RadiosField", "name": "x", "title": "X", "list": "ghost" }] }]
    }))
    .unwrap_err();
    assert!(matches!(err, DefinitionError::UnknownList { .. }));

    let err = load(json!({
        "pages": [{ "path": "/a", "components": [{ "type": "SelectField", "name": "x", "title": "X" }] }]
    }))
    .unwrap_err();
    assert!(matches!(err, DefinitionError::MissingList { .. }));

    let err = load(json!({ "startPage": "/ghost", "pages": [{ "path": "/a" }] })).unwrap_err();
    assert!(matches!(err, DefinitionError::UnknownStartPage { .. }));
}

#[test]
fn conditions_may_only_compare_known_fields() {
    let err = load(json!({
        "pages": [{ "path": "/a", "components": [{ "type": "TextField", "name": "name", "title": "Name" }] }],
        "conditions": [condition("c", json!([{
            "field": "age", "operator": "is", "value": { "type": "Value", "value": 1 }
        }]))]
    }))
    .unwrap_err();
    assert!(matches!(err, DefinitionError::UnknownField { field, .. } if field == "age"));
}

#[test]
fn condition_cycles_fail_the_load() {
    let err = load(json!({
        "pages": [{ "path": "/a" }],
        "conditions": [
            condition("first", json!([{ "conditionName": "second" }])),
            condition("second", json!([{ "conditionName": "first" }]))
        ]
    }))
    .unwrap_err();
    match err {
        DefinitionError::ConditionCycle { chain } => {
            assert_eq!(chain, ["first", "second", "first"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn list_values_must_match_the_list_type() {
    let err = load(json!({
        "pages": [{ "path": "/a" }],
        "lists": [{
            "name": "sizes",
            "type": "number",
            "items": [{ "text": "Big", "value": "big" }]
        }]
    }))
    .unwrap_err();
    assert!(matches!(err, DefinitionError::ListItemType { expected: "number", .. }));
}

#[test]
fn invalid_regex_names_the_component() {
    let err = load(json!({
        "pages": [{
            "path": "/a",
            "components": [{ "type": "TextField", "name": "code", "title": "Code", "schema": { "regex": "([" } }]
        }]
    }))
    .unwrap_err();
    assert!(matches!(err, DefinitionError::InvalidPattern { component, .. } if component == "code"));
}

#[test]
fn definition_schema_is_exposed() {
    let schema = form_engine::definition_schema().expect("definition schema builds");
    assert!(schema.is_object());
    assert!(schema.pointer("/properties/pages").is_some());
}
