use serde_json::{Value, json};

use form_engine::FormModel;

/// A farm-animal question whose larger animals need enough land.
fn animals_form() -> FormModel {
    FormModel::from_value(json!({
        "pages": [
            {
                "path": "/land",
                "components": [{ "type": "NumberField", "name": "acres", "title": "Acres of land" }],
                "next": [{ "path": "/animal" }]
            },
            {
                "path": "/animal",
                "components": [
                    { "type": "RadiosField", "name": "animal", "title": "Animal", "list": "animals" },
                    {
                        "type": "CheckboxesField",
                        "name": "extras",
                        "title": "Extras",
                        "list": "animals",
                        "options": { "required": false }
                    }
                ]
            }
        ],
        "lists": [{
            "name": "animals",
            "type": "string",
            "items": [
                { "text": "Cat", "value": "cat" },
                { "text": "Horse", "value": "horse", "condition": "hasLand" }
            ]
        }],
        "conditions": [{
            "name": "hasLand",
            "value": {
                "conditions": [{
                    "field": "acres",
                    "operator": "is at least",
                    "value": { "type": "Value", "value": 2 }
                }]
            }
        }]
    }))
    .expect("animals form loads")
}

fn eligible_values(model: &FormModel, state: &Value) -> Vec<Value> {
    model
        .eligible_items("animals", state)
        .into_iter()
        .map(|item| item.value.clone())
        .collect()
}

#[test]
fn conditional_items_follow_the_state() {
    let model = animals_form();
    assert_eq!(eligible_values(&model, &json!({ "acres": 1 })), [json!("cat")]);
    assert_eq!(
        eligible_values(&model, &json!({ "acres": 5 })),
        [json!("cat"), json!("horse")]
    );
    assert_eq!(eligible_values(&model, &json!({})), [json!("cat")]);
}

#[test]
fn unknown_list_has_no_items() {
    let model = animals_form();
    assert!(model.eligible_items("nope", &json!({})).is_empty());
}

#[test]
fn ineligible_choice_is_rejected() {
    let model = animals_form();
    let result = model.reconcile(&json!({ "acres": 1, "animal": "horse" }));
    let errors = result.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, "animal");
    assert_eq!(errors[0].code, "choice");

    let result = model.reconcile(&json!({ "acres": 3, "animal": "horse" }));
    assert!(result.is_complete(), "{:?}", result.errors());
}

#[test]
fn checkbox_answers_must_all_be_eligible() {
    let model = animals_form();
    let result = model.reconcile(&json!({ "acres": 1, "animal": "cat", "extras": ["cat", "horse"] }));
    assert_eq!(result.errors().len(), 1);
    assert_eq!(result.errors()[0].path, "extras");
}

#[test]
fn rendering_and_validation_agree() {
    let model = animals_form();
    for acres in [0, 1, 2, 10] {
        let base = json!({ "acres": acres });
        let eligible = eligible_values(&model, &base);
        for candidate in ["cat", "horse"] {
            let mut state = base.clone();
            state["animal"] = json!(candidate);
            let accepted = model.reconcile(&state).is_complete();
            assert_eq!(accepted, eligible.contains(&json!(candidate)), "acres={acres} {candidate}");
        }
    }
}

#[test]
fn abandoned_answers_do_not_unlock_items() {
    let model = FormModel::from_value(json!({
        "pages": [
            {
                "path": "/start",
                "components": [{ "type": "YesNoField", "name": "ownsLand", "title": "Do you own land?" }],
                "next": [{ "path": "/land", "condition": "ownsLand" }, { "path": "/animal" }]
            },
            {
                "path": "/land",
                "components": [{ "type": "NumberField", "name": "acres", "title": "Acres of land" }],
                "next": [{ "path": "/animal" }]
            },
            {
                "path": "/animal",
                "components": [{ "type": "RadiosField", "name": "animal", "title": "Animal", "list": "animals" }]
            }
        ],
        "lists": [{
            "name": "animals",
            "type": "string",
            "items": [
                { "text": "Cat", "value": "cat" },
                { "text": "Horse", "value": "horse", "condition": "hasLand" }
            ]
        }],
        "conditions": [
            {
                "name": "ownsLand",
                "value": {
                    "conditions": [{
                        "field": "ownsLand",
                        "operator": "is",
                        "value": { "type": "Value", "value": "true" }
                    }]
                }
            },
            {
                "name": "hasLand",
                "value": {
                    "conditions": [{
                        "field": "acres",
                        "operator": "is at least",
                        "value": { "type": "Value", "value": 2 }
                    }]
                }
            }
        ]
    }))
    .expect("form loads");

    let result = model.reconcile(&json!({ "ownsLand": false, "acres": 5, "animal": "horse" }));
    assert_eq!(result.errors().len(), 1);
    assert_eq!(result.errors()[0].path, "animal");
    assert_eq!(result.errors()[0].code, "choice");

    let result = model.reconcile(&json!({ "ownsLand": true, "acres": 5, "animal": "horse" }));
    assert!(result.is_complete(), "{:?}", result.errors());
}
