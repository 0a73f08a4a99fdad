//! Provisional item id generation.
//!
//! # Responsibility
//! - Produce syntactically valid ids for client-created items.
//! - Validate the id shape shared by server and client ids.
//!
//! # Invariants
//! - Generated ids are eight lowercase 4-hex-digit groups laid out as
//!   `gg gg - gg - gg - gg - gg gg gg`.
//! - Ids are provisional; nothing guarantees the server keeps them.

use crate::model::item::ItemId;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

static ITEM_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("item id pattern is a valid regex")
});

/// Source of ids for client-initiated creation.
pub trait IdGenerator {
    fn next_id(&mut self) -> ItemId;
}

/// Thread-local RNG backed generator used by default.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&mut self) -> ItemId {
        generate_item_id()
    }
}

/// Generates one provisional item id.
pub fn generate_item_id() -> ItemId {
    let mut rng = rand::thread_rng();
    let mut group = || id_group(rng.gen_range(0x1_0000u32..0x2_0000u32));
    let mut id = String::with_capacity(36);
    id.push_str(&group());
    id.push_str(&group());
    id.push('-');
    for _ in 0..3 {
        id.push_str(&group());
        id.push('-');
    }
    for _ in 0..3 {
        id.push_str(&group());
    }
    id
}

/// Returns whether `value` has the item id shape.
pub fn is_valid_item_id(value: &str) -> bool {
    ITEM_ID_PATTERN.is_match(value)
}

// Values come from [0x10000, 0x20000); dropping the leading `1` keeps
// exactly four hex digits, zero padded.
fn id_group(value: u32) -> String {
    let hex = format!("{value:x}");
    hex[1..].to_string()
}

#[cfg(test)]
mod tests {
    use super::{generate_item_id, id_group, is_valid_item_id, IdGenerator, RandomIdGenerator};

    #[test]
    fn group_drops_leading_digit() {
        assert_eq!(id_group(0x1_0000), "0000");
        assert_eq!(id_group(0x1_00af), "00af");
        assert_eq!(id_group(0x1_ffff), "ffff");
    }

    #[test]
    fn generated_id_has_expected_layout() {
        let id = generate_item_id();
        let lengths: Vec<usize> = id.split('-').map(str::len).collect();
        assert_eq!(lengths, vec![8, 4, 4, 4, 12]);
        assert!(is_valid_item_id(&id));
    }

    #[test]
    fn validator_rejects_other_shapes() {
        assert!(!is_valid_item_id(""));
        assert!(!is_valid_item_id("0000-0000-0000-0000"));
        assert!(!is_valid_item_id("ABCDEF12-0000-0000-0000-000000000000"));
        assert!(is_valid_item_id("abcdef12-0000-0000-0000-000000000000"));
    }

    #[test]
    fn random_generator_yields_fresh_ids() {
        let mut generator = RandomIdGenerator;
        assert_ne!(generator.next_id(), generator.next_id());
    }
}
