// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

crate::define_id! {
    /// Test-only id newtype.
    pub struct ExampleId;
}

#[test]
fn short_truncates_long_strings() {
    assert_eq!("hello world".short(5), "hello");
}

#[test]
fn short_leaves_short_strings_untouched() {
    assert_eq!("hi".short(5), "hi");
}

#[test]
fn random_id_gen_renders_five_hyphenated_groups() {
    let gen = RandomIdGen;
    let id = gen.next();
    let groups: Vec<&str> = id.split('-').collect();
    assert_eq!(groups.len(), 5);
    assert_eq!(
        groups.iter().map(|g| g.len()).collect::<Vec<_>>(),
        vec![8, 4, 4, 4, 12]
    );
}

#[test]
fn random_id_gen_is_not_constant() {
    let gen = RandomIdGen;
    assert_ne!(gen.next(), gen.next());
}

#[test]
fn short_hex_has_requested_length_and_is_hex() {
    let s = RandomIdGen::short_hex(8);
    assert_eq!(s.len(), 8);
    assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
}

#[parameterized(
    one = { 1 },
    five = { 5 },
    twenty = { 20 },
)]
fn sequential_id_gen_counts_up(n: u64) {
    let gen = SequentialIdGen::new("t");
    let mut last = String::new();
    for _ in 0..n {
        last = gen.next();
    }
    assert_eq!(last, format!("t-{}", n));
}

#[test]
fn define_id_round_trips_through_string() {
    let id = ExampleId::new("abc");
    assert_eq!(id.as_str(), "abc");
    assert_eq!(id.to_string(), "abc");
    assert_eq!(id, "abc");
    assert_eq!(id.short(2), "ab");
}

#[test]
fn define_id_serializes_as_plain_string() {
    let id = ExampleId::new("abc");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
}
