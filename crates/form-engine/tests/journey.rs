use serde_json::{Value, json};

use form_engine::{Clock, FormModel, SUBMITTED_PAGE_PATH};

fn pet_form() -> FormModel {
    FormModel::from_value(json!({
        "name": "Pets",
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
                "components": [
                    { "type": "TextField", "name": "petName", "title": "Pet name" }
                ],
                "next": [{ "path": "/summary" }]
            },
            { "path": "/summary" }
        ],
        "conditions": [{
            "name": "hasPet",
            "displayName": "Has a pet",
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

fn paths(pages: &[&form_engine::Page]) -> Vec<String> {
    pages.iter().map(|page| page.path.clone()).collect()
}

#[test]
fn journey_follows_the_branch() {
    let model = pet_form();
    let with_pet = json!({ "name": "Ann", "hasPet": true });
    assert_eq!(paths(&model.journey(&with_pet)), ["/a", "/b", "/summary"]);

    let without_pet = json!({ "name": "Ann", "hasPet": false });
    assert_eq!(paths(&model.journey(&without_pet)), ["/a", "/summary"]);
}

#[test]
fn missing_answer_fails_closed() {
    let model = pet_form();
    assert!(!model.evaluate("hasPet", &json!({})));
    assert_eq!(paths(&model.journey(&json!({}))), ["/a", "/summary"]);
}

#[test]
fn first_matching_link_wins() {
    let model = pet_form();
    let page = model.page("/a").expect("page exists");
    let next = model.next_page(page, &json!({ "hasPet": true })).expect("has next");
    assert_eq!(next.path, "/b");
    assert_eq!(model.next_path("/a", &json!({ "hasPet": false })), Some("/summary"));
}

#[test]
fn pages_without_links_are_terminal() {
    let model = pet_form();
    assert_eq!(model.next_path("/summary", &json!({})), None);
    assert_eq!(model.next_path("/missing", &json!({})), None);
}

#[test]
fn status_page_is_appended_but_never_relevant() {
    let model = pet_form();
    let last = model.pages().last().expect("pages");
    assert_eq!(last.path, SUBMITTED_PAGE_PATH);
    assert!(last.components.is_empty() && last.links.is_empty());
    assert!(model.relevant_pages(SUBMITTED_PAGE_PATH, &json!({})).is_empty());
}

#[test]
fn walk_stops_at_status_page() {
    let model = FormModel::from_value(json!({
        "pages": [
            { "path": "/start", "next": [{ "path": "/status" }] }
        ]
    }))
    .expect("form loads");
    assert_eq!(paths(&model.journey(&json!({}))), ["/start"]);
    assert_eq!(model.next_path("/start", &json!({})), Some("/status"));
}

#[test]
fn cyclic_links_stop_at_first_revisit() {
    let model = FormModel::from_value(json!({
        "pages": [
            { "path": "/one", "next": [{ "path": "/two" }] },
            { "path": "/two", "next": [{ "path": "/one" }] }
        ]
    }))
    .expect("form loads");
    assert_eq!(paths(&model.journey(&json!({}))), ["/one", "/two"]);
}

#[test]
fn start_page_can_be_declared() {
    let model = FormModel::from_value(json!({
        "startPage": "/second",
        "pages": [
            { "path": "/first" },
            { "path": "/second", "next": [{ "path": "/first" }] }
        ]
    }))
    .expect("form loads");
    assert_eq!(model.start_page().path, "/second");
    assert_eq!(paths(&model.journey(&json!({}))), ["/second", "/first"]);
}

#[test]
fn sectioned_answers_drive_conditions() {
    let model = FormModel::from_value(json!({
        "sections": [{ "name": "applicant", "title": "Applicant" }],
        "pages": [
            {
                "path": "/age",
                "section": "applicant",
                "components": [{ "type": "NumberField", "name": "age", "title": "Age" }],
                "next": [
                    { "path": "/adult", "condition": "isAdult" },
                    { "path": "/child" }
                ]
            },
            { "path": "/adult" },
            { "path": "/child" }
        ],
        "conditions": [{
            "name": "isAdult",
            "value": {
                "conditions": [{
                    "field": "applicant.age",
                    "operator": "is at least",
                    "value": { "type": "Value", "value": 18 }
                }]
            }
        }]
    }))
    .expect("form loads");

    assert_eq!(model.next_path("/age", &json!({ "applicant": { "age": 30 } })), Some("/adult"));
    assert_eq!(model.next_path("/age", &json!({ "applicant": { "age": 9 } })), Some("/child"));
    // Root-level keys do not satisfy sectioned references.
    assert_eq!(model.next_path("/age", &json!({ "age": 30 })), Some("/child"));
}

#[test]
fn relative_dates_use_the_configured_clock() {
    let form = json!({
        "pages": [
            {
                "path": "/dob",
                "components": [{ "type": "DatePartsField", "name": "dob", "title": "Date of birth" }],
                "next": [
                    { "path": "/adult", "condition": "isAdult" },
                    { "path": "/minor" }
                ]
            },
            { "path": "/adult" },
            { "path": "/minor" }
        ],
        "conditions": [{
            "name": "isAdult",
            "value": {
                "conditions": [{
                    "field": "dob",
                    "operator": "is at or before",
                    "value": {
                        "type": "RelativeTime",
                        "timePeriod": 18,
                        "timeUnit": "years",
                        "direction": "in the past"
                    }
                }]
            }
        }]
    });
    let today = form_engine::dates::parse_iso_date("2024-06-15").expect("valid date");
    let model = FormModel::from_value(form)
        .expect("form loads")
        .with_clock(Clock::Fixed(today));

    let state = |dob: &str| -> Value { json!({ "dob": dob }) };
    assert!(model.evaluate("isAdult", &state("2006-06-15")));
    assert!(!model.evaluate("isAdult", &state("2006-06-16")));
    assert_eq!(model.next_path("/dob", &state("1990-01-01")), Some("/adult"));
}

#[test]
fn model_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FormModel>();
}
