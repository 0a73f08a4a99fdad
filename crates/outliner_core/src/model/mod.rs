//! Outline domain model.
//!
//! # Responsibility
//! - Define the in-memory item record owned by `Outline`.
//! - Define the serde shapes of the initialization payload.
//!
//! # Invariants
//! - Items reference children by id; the outline map is the only owner.
//! - Wire decoding never fails on absent or `null` optional fields.

pub mod item;
pub mod wire;
