use outliner_core::{generate_item_id, is_valid_item_id};
use std::collections::HashSet;

#[test]
fn thousand_generated_ids_are_valid_and_distinct() {
    let ids: Vec<String> = (0..1000).map(|_| generate_item_id()).collect();
    for id in &ids {
        assert!(is_valid_item_id(id), "malformed id {id}");
    }
    let distinct: HashSet<&String> = ids.iter().collect();
    assert_eq!(distinct.len(), ids.len());
}

#[test]
fn generated_id_groups_are_lowercase_hex() {
    let id = generate_item_id();
    assert_eq!(id.len(), 36);
    assert!(id
        .chars()
        .all(|c| c == '-' || c.is_ascii_digit() || ('a'..='f').contains(&c)));
}
