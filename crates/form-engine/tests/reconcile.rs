use serde_json::json;

use form_engine::FormModel;

fn pet_form() -> FormModel {
    FormModel::from_value(json!({
        "sections": [{ "name": "pet", "title": "Your pet" }],
        "pages": [
            {
                "path": "/a",
                "components": [
                    { "type": "TextField", "name": "name", "title": "Your name" },
                    { "type": "YesNoField", "name": "hasPet", "title": "Do you have a pet?" }
                ],
                "next": [
                    { "path": "/b", "condition": "hasPet" },
                    { "path": "/summary" }
                ]
            },
            {
                "path": "/b",
                "section": "pet",
                "components": [
                    { "type": "TextField", "name": "petName", "title": "Pet name" },
                    { "type": "RadiosField", "name": "kind", "title": "Kind of pet", "list": "kinds" }
                ],
                "next": [{ "path": "/summary" }]
            },
            {
                "path": "/summary",
                "components": [{ "type": "Html", "name": "thanks", "content": "<p>Thanks</p>" }]
            }
        ],
        "lists": [{
            "name": "kinds",
            "type": "string",
            "items": [
                { "text": "Cat", "value": "cat" },
                { "text": "Dog", "value": "dog" }
            ]
        }],
        "conditions": [{
            "name": "hasPet",
            "value": {
                "conditions": [{
                    "field": "hasPet",
                    "operator": "is",
                    "value": { "type": "Value", "value": "true" }
                }]
            }
        }]
    }))
    .expect("pet form loads")
}

#[test]
fn abandoned_branch_is_pruned_without_errors() {
    let model = pet_form();
    let state = json!({
        "name": "Ann",
        "hasPet": false,
        "pet": { "petName": "Rex", "kind": "dog" }
    });
    let result = model.reconcile(&state);
    assert_eq!(result.relevant_paths(), ["/a", "/summary"]);
    assert!(result.is_complete());
    assert_eq!(result.pruned_state(), &json!({ "name": "Ann", "hasPet": false }));
    assert_eq!(result.validation.pruned, ["pet"]);
}

#[test]
fn active_branch_requires_its_answers() {
    let model = pet_form();
    let result = model.reconcile(&json!({ "name": "Ann", "hasPet": true }));
    assert_eq!(result.relevant_paths(), ["/a", "/b", "/summary"]);
    assert!(!result.is_complete());

    let by_page = result.errors_by_page();
    assert_eq!(by_page.len(), 1);
    assert_eq!(by_page[0].page, "/b");
    let messages: Vec<&str> = by_page[0].errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, ["Enter Pet name", "Select Kind of pet"]);

    let by_section = result.errors_by_section();
    assert_eq!(by_section.len(), 1);
    assert_eq!(by_section[0].section.as_deref(), Some("pet"));
    assert_eq!(by_section[0].title.as_deref(), Some("Your pet"));
}

#[test]
fn narrowing_an_answer_shrinks_the_journey() {
    let model = pet_form();
    let wide = model.reconcile(&json!({ "name": "Ann", "hasPet": true }));
    let narrow = model.reconcile(&json!({ "name": "Ann", "hasPet": false }));
    assert!(narrow.relevant_pages.len() < wide.relevant_pages.len());
    for path in narrow.relevant_paths() {
        assert!(wide.relevant_paths().contains(&path));
    }
}

#[test]
fn reconciling_the_pruned_state_changes_nothing() {
    let model = pet_form();
    let state = json!({
        "name": " Ann ",
        "hasPet": "true",
        "pet": { "petName": "Rex", "kind": "cat", "colour": "ginger" },
        "stale": 1
    });
    let first = model.reconcile(&state);
    assert!(first.is_complete(), "{:?}", first.errors());
    let second = model.reconcile(first.pruned_state());
    assert_eq!(second.pruned_state(), first.pruned_state());
    assert!(second.validation.pruned.is_empty());
    assert_eq!(second.relevant_paths(), first.relevant_paths());
}

#[test]
fn summary_rows_display_answers_in_journey_order() {
    let model = pet_form();
    let state = json!({
        "name": "Ann",
        "hasPet": true,
        "pet": { "petName": "Rex", "kind": "dog" }
    });
    let result = model.reconcile(&state);
    let rows: Vec<(String, String)> = result
        .summary_rows()
        .into_iter()
        .map(|row| (row.path, row.display))
        .collect();
    assert_eq!(
        rows,
        [
            ("name".to_string(), "Ann".to_string()),
            ("hasPet".to_string(), "Yes".to_string()),
            ("pet.petName".to_string(), "Rex".to_string()),
            ("pet.kind".to_string(), "Dog".to_string()),
        ]
    );
}

#[test]
fn report_serialises_for_callers() {
    let model = pet_form();
    let report = model.reconcile(&json!({ "hasPet": false })).report();
    let value = serde_json::to_value(&report).expect("report serialises");
    assert_eq!(value["relevant_pages"], json!(["/a", "/summary"]));
    assert_eq!(value["complete"], json!(false));
    assert_eq!(value["errors"][0]["path"], json!("name"));
    assert_eq!(value["errors_by_page"][0]["page"], json!("/a"));
}

/// `/a` branches to `/b` on `q1`; `/c` then routes on the answer asked on `/b`.
fn downstream_form() -> FormModel {
    FormModel::from_value(json!({
        "pages": [
            {
                "path": "/a",
                "components": [{ "type": "YesNoField", "name": "q1", "title": "Question one" }],
                "next": [{ "path": "/b", "condition": "askX" }, { "path": "/c" }]
            },
            {
                "path": "/b",
                "components": [{ "type": "TextField", "name": "x", "title": "X" }],
                "next": [{ "path": "/c" }]
            },
            {
                "path": "/c",
                "next": [{ "path": "/d", "condition": "isFoo" }, { "path": "/e" }]
            },
            { "path": "/d" },
            {
                "path": "/e",
                "components": [{ "type": "TextField", "name": "y", "title": "Y" }]
            }
        ],
        "conditions": [
            {
                "name": "askX",
                "value": {
                    "conditions": [{
                        "field": "q1",
                        "operator": "is",
                        "value": { "type": "Value", "value": "true" }
                    }]
                }
            },
            {
                "name": "isFoo",
                "value": {
                    "conditions": [{
                        "field": "x",
                        "operator": "is",
                        "value": { "type": "Value", "value": "foo" }
                    }]
                }
            }
        ]
    }))
    .expect("downstream form loads")
}

#[test]
fn abandoned_answers_do_not_route_later_pages() {
    let model = downstream_form();
    let first = model.reconcile(&json!({ "q1": false, "x": "foo" }));
    assert_eq!(first.relevant_paths(), ["/a", "/c", "/e"]);
    assert_eq!(first.pruned_state(), &json!({ "q1": false }));
    assert_eq!(first.errors().len(), 1);
    assert_eq!(first.errors()[0].path, "y");

    let second = model.reconcile(first.pruned_state());
    assert_eq!(second.relevant_paths(), first.relevant_paths());
    assert_eq!(second.errors(), first.errors());
    assert_eq!(second.pruned_state(), first.pruned_state());
}

#[test]
fn answers_on_the_journey_still_route() {
    let model = downstream_form();
    let result = model.reconcile(&json!({ "q1": true, "x": "foo" }));
    assert_eq!(result.relevant_paths(), ["/a", "/b", "/c", "/d"]);
    assert!(result.is_complete());
}

#[test]
fn walking_from_a_later_page_keeps_earlier_answers() {
    let model = downstream_form();
    let on_branch = json!({ "q1": true, "x": "foo" });
    let paths = |pages: Vec<&form_engine::Page>| -> Vec<String> {
        pages.iter().map(|page| page.path.clone()).collect()
    };
    assert_eq!(paths(model.relevant_pages("/c", &on_branch)), ["/c", "/d"]);

    let off_branch = json!({ "q1": false, "x": "foo" });
    assert_eq!(paths(model.relevant_pages("/c", &off_branch)), ["/c", "/e"]);
    assert_eq!(model.walk(&off_branch).answers, json!({ "q1": false }));
}
