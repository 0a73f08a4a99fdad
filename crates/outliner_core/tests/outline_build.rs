use outliner_core::{
    ErrorKind, InitializationPayload, MemoryTransport, Outline, RawItem, SearchOptions, ROOT_ID,
};
use serde_json::{json, Value};

fn payload(children: Value) -> Value {
    json!({
        "projectTreeData": {
            "clientId": "client-1",
            "mainProjectTreeInfo": {
                "dateJoinedTimestampInSeconds": 1_000_000,
                "initialMostRecentOperationTransactionId": "42",
                "rootProjectChildren": children
            }
        }
    })
}

fn build(children: Value) -> Outline<MemoryTransport> {
    Outline::build(MemoryTransport::from_json(payload(children)).unwrap()).unwrap()
}

fn count_raw(items: &[RawItem]) -> usize {
    items
        .iter()
        .map(|item| 1 + count_raw(item.children.as_deref().unwrap_or(&[])))
        .sum()
}

fn sample_children() -> Value {
    json!([
        { "id": "inbox", "nm": "Inbox", "ct": 1, "lm": 2, "ch": [
            { "id": "groceries", "nm": "Groceries", "no": "weekly", "ch": [
                { "id": "milk", "nm": "Milk", "cp": 50 },
                { "id": "eggs", "nm": "Eggs" }
            ]},
            { "id": "errands", "nm": "Errands", "ch": null }
        ]},
        { "id": "projects", "nm": "Projects", "ch": [
            { "id": "rust", "nm": "Learn Rust" }
        ]},
        { "id": "empty" }
    ])
}

#[test]
fn index_holds_every_raw_item_plus_root() {
    let raw = payload(sample_children());
    let decoded = InitializationPayload::from_value(raw.clone()).unwrap();
    let outline = build(sample_children());

    assert_eq!(outline.len(), count_raw(decoded.root_items()) + 1);
    for item in outline.subtree(ROOT_ID).unwrap().into_iter().skip(1) {
        let parent_id = outline.parent_id(item.id()).unwrap();
        assert!(outline.contains(parent_id));
    }
    outline.check_consistency().unwrap();
}

#[test]
fn levels_follow_nesting_depth() {
    let outline = build(sample_children());
    assert_eq!(outline.root().level(), 0);
    assert_eq!(outline.item("inbox").unwrap().level(), 1);
    assert_eq!(outline.item("groceries").unwrap().level(), 2);
    assert_eq!(outline.item("milk").unwrap().level(), 3);

    for item in outline.subtree(ROOT_ID).unwrap() {
        if item.level() > 0 {
            assert_eq!(
                item.level(),
                outline.parent(item.id()).unwrap().level() + 1
            );
        }
    }
}

#[test]
fn children_keep_wire_order() {
    let outline = build(sample_children());
    let names: Vec<&str> = outline
        .children(ROOT_ID)
        .unwrap()
        .into_iter()
        .map(|item| item.id())
        .collect();
    assert_eq!(names, vec!["inbox", "projects", "empty"]);

    let subtree: Vec<&str> = outline
        .subtree("inbox")
        .unwrap()
        .into_iter()
        .map(|item| item.id())
        .collect();
    assert_eq!(subtree, vec!["inbox", "groceries", "milk", "eggs", "errands"]);
}

#[test]
fn absent_fields_take_defaults() {
    let outline = build(sample_children());
    let empty = outline.item("empty").unwrap();
    assert_eq!(empty.name(), "");
    assert_eq!(empty.description(), "");
    assert_eq!(empty.creation_time(), 0);
    assert_eq!(empty.last_modified_time(), 0);
    assert_eq!(empty.completed_time(), 0);
    assert!(empty.children().is_empty());

    let groceries = outline.item("groceries").unwrap();
    assert_eq!(groceries.description(), "weekly");

    let inbox = outline.item("inbox").unwrap();
    assert_eq!(inbox.creation_time(), 1_000_001);
    assert_eq!(inbox.last_modified_time(), 1_000_002);
    assert_eq!(outline.item("milk").unwrap().completed_time(), 1_000_050);
}

#[test]
fn parent_lookup_never_fails() {
    let outline = build(sample_children());
    assert_eq!(outline.parent("milk").unwrap().id(), "groceries");
    assert_eq!(outline.parent("inbox").unwrap().id(), ROOT_ID);
    assert!(outline.parent(ROOT_ID).is_none());
    assert!(outline.parent("unknown").is_none());
}

#[test]
fn unknown_item_lookup_is_not_found() {
    let outline = build(sample_children());
    assert!(outline.get("unknown").is_none());
    assert_eq!(outline.item("unknown").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(
        outline.children("unknown").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn empty_payload_builds_root_only() {
    let transport = MemoryTransport::from_json(json!({
        "projectTreeData": { "mainProjectTreeInfo": { "rootProjectChildren": null } }
    }))
    .unwrap();
    let outline = Outline::build(transport).unwrap();
    assert!(outline.is_empty());
    assert_eq!(outline.len(), 1);
    assert_eq!(outline.joined_epoch_seconds(), 0);
}

#[test]
fn payload_missing_tree_structure_is_protocol_error() {
    let err = MemoryTransport::from_json(json!({ "user": "me@example.com" })).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[test]
fn groceries_search_exact_and_case_insensitive() {
    let outline = build(sample_children());

    let exact = outline
        .search(ROOT_ID, "Groceries", SearchOptions::exact())
        .unwrap();
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].id(), "groceries");

    let fuzzy = outline
        .search(ROOT_ID, "grocer", SearchOptions::default())
        .unwrap();
    assert_eq!(fuzzy.len(), 1);
    assert_eq!(fuzzy[0].id(), "groceries");

    assert!(outline
        .search(ROOT_ID, "nothing-here", SearchOptions::all())
        .unwrap()
        .is_empty());
}

#[test]
fn long_field_names_are_accepted() {
    let outline = build(json!([
        { "id": "a", "name": "Long", "description": "form",
          "children": [{ "id": "b", "name": "Child" }],
          "createdOffset": 3 }
    ]));
    assert_eq!(outline.item("a").unwrap().name(), "Long");
    assert_eq!(outline.item("a").unwrap().creation_time(), 1_000_003);
    assert_eq!(outline.parent("b").unwrap().id(), "a");
}
