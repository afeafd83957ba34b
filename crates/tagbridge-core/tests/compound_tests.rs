#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::collections::BTreeSet;

use proptest::prelude::*;
use tagbridge_core::host::{ArgKind, TargetType};
use tagbridge_core::{AccessorId, Compound, TagError, TagKind, VersionToken};
use uuid::Uuid;

proptest! {
    #[test]
    fn prop_int_round_trip(key in "[a-z]{1,8}", value in any::<i32>()) {
        let root = common::standalone();
        root.set_int(&key, value).unwrap();
        prop_assert_eq!(root.get_int(&key).unwrap(), Some(value));
        prop_assert_eq!(root.get_type(&key).unwrap(), Some(TagKind::Int));
    }

    #[test]
    fn prop_long_round_trip(key in "[a-z]{1,8}", value in any::<i64>()) {
        let root = common::standalone();
        root.set_long(&key, value).unwrap();
        prop_assert_eq!(root.get_long(&key).unwrap(), Some(value));
    }

    #[test]
    fn prop_small_ints_round_trip(byte in any::<i8>(), short in any::<i16>(), flag in any::<bool>()) {
        let root = common::standalone();
        root.set_byte("b", byte).unwrap();
        root.set_short("s", short).unwrap();
        root.set_bool("flag", flag).unwrap();
        prop_assert_eq!(root.get_byte("b").unwrap(), Some(byte));
        prop_assert_eq!(root.get_short("s").unwrap(), Some(short));
        prop_assert_eq!(root.get_bool("flag").unwrap(), Some(flag));
    }

    #[test]
    fn prop_floating_round_trip(f in -1.0e30f32..1.0e30f32, d in -1.0e300f64..1.0e300f64) {
        let root = common::standalone();
        root.set_float("f", f).unwrap();
        root.set_double("d", d).unwrap();
        prop_assert_eq!(root.get_float("f").unwrap(), Some(f));
        prop_assert_eq!(root.get_double("d").unwrap(), Some(d));
    }

    #[test]
    fn prop_string_round_trip(path in "[a-z]{1,6}(\\.[a-z]{1,6}){0,3}", value in "\\PC{0,32}") {
        let root = common::standalone();
        root.set_string(&path, &value).unwrap();
        prop_assert_eq!(root.get_string(&path).unwrap(), Some(value));
    }

    #[test]
    fn prop_arrays_round_trip(
        bytes in proptest::collection::vec(any::<u8>(), 0..16),
        ints in proptest::collection::vec(any::<i32>(), 0..16),
        longs in proptest::collection::vec(any::<i64>(), 0..16),
    ) {
        let root = common::standalone();
        root.set_byte_array("b", &bytes).unwrap();
        root.set_int_array("i", &ints).unwrap();
        root.set_long_array("l", &longs).unwrap();
        prop_assert_eq!(root.get_byte_array("b").unwrap(), Some(bytes));
        prop_assert_eq!(root.get_int_array("i").unwrap(), Some(ints));
        prop_assert_eq!(root.get_long_array("l").unwrap(), Some(longs));
    }

    #[test]
    fn prop_uuid_round_trip(high in any::<u64>(), low in any::<u64>()) {
        let id = Uuid::from_u64_pair(high, low);
        for version in [VersionToken::MC1_12_R1, VersionToken::MC1_20_R3] {
            let root = Compound::standalone(&common::context(version));
            root.set_uuid("owner", id).unwrap();
            prop_assert_eq!(root.get_uuid("owner").unwrap(), Some(id));
        }
    }
}

#[test]
fn test_none_behaves_like_remove() {
    let root = common::standalone();
    root.set_string("name", "Rogue").unwrap();
    root.set_int("level", 3).unwrap();

    root.set_string_opt("name", None).unwrap();
    root.set_int_opt("level", None).unwrap();

    assert!(!root.has_key("name").unwrap());
    assert_eq!(root.get_type("name").unwrap(), None);
    assert!(!root.has_key("level").unwrap());
    assert!(root.is_empty().unwrap());
}

#[test]
fn test_none_removes_every_scalar_kind() {
    let id = Uuid::from_u64_pair(0xDEAD_BEEF, 0xFEED_FACE);
    for version in [VersionToken::MC1_12_R1, VersionToken::MC1_20_R3] {
        let root = Compound::standalone(&common::context(version));
        root.set_byte("byte", 1).unwrap();
        root.set_short("short", 2).unwrap();
        root.set_int("int", 3).unwrap();
        root.set_long("long", 4).unwrap();
        root.set_float("float", 5.0).unwrap();
        root.set_double("double", 6.0).unwrap();
        root.set_string("string", "seven").unwrap();
        root.set_bool("bool", true).unwrap();
        root.set_byte_array("bytes", &[8]).unwrap();
        root.set_int_array("ints", &[9]).unwrap();
        root.set_long_array("longs", &[10]).unwrap();
        root.set_uuid("uuid", id).unwrap();

        for key in [
            "byte", "short", "int", "long", "float", "double", "string", "bool", "bytes", "ints",
            "longs", "uuid",
        ] {
            assert!(root.has_key(key).unwrap(), "{} on {}", key, version);
        }

        root.set_byte_opt("byte", None).unwrap();
        root.set_short_opt("short", None).unwrap();
        root.set_int_opt("int", None).unwrap();
        root.set_long_opt("long", None).unwrap();
        root.set_float_opt("float", None).unwrap();
        root.set_double_opt("double", None).unwrap();
        root.set_string_opt("string", None).unwrap();
        root.set_bool_opt("bool", None).unwrap();
        root.set_byte_array_opt("bytes", None).unwrap();
        root.set_int_array_opt("ints", None).unwrap();
        root.set_long_array_opt("longs", None).unwrap();
        root.set_uuid_opt("uuid", None).unwrap();

        assert_eq!(root.get_byte("byte").unwrap(), None);
        assert_eq!(root.get_short("short").unwrap(), None);
        assert_eq!(root.get_int("int").unwrap(), None);
        assert_eq!(root.get_long("long").unwrap(), None);
        assert_eq!(root.get_float("float").unwrap(), None);
        assert_eq!(root.get_double("double").unwrap(), None);
        assert_eq!(root.get_string("string").unwrap(), None);
        assert_eq!(root.get_bool("bool").unwrap(), None);
        assert_eq!(root.get_byte_array("bytes").unwrap(), None);
        assert_eq!(root.get_int_array("ints").unwrap(), None);
        assert_eq!(root.get_long_array("longs").unwrap(), None);
        assert_eq!(root.get_uuid("uuid").unwrap(), None, "{}", version);
        assert!(!root.has_key("uuid").unwrap());
        assert_eq!(root.get_type("uuid").unwrap(), None);
        assert!(root.get_keys().unwrap().is_empty(), "{}", version);
    }
}

#[test]
fn test_some_behaves_like_set() {
    let root = common::standalone();
    root.set_double_opt("speed", Some(0.25)).unwrap();
    assert_eq!(root.get_double("speed").unwrap(), Some(0.25));
}

#[test]
fn test_add_compound_is_idempotent() {
    let root = common::standalone();
    let first = root.add_compound("stats").unwrap();
    let second = root.add_compound("stats").unwrap();

    first.set_int("level", 5).unwrap();
    assert_eq!(second.get_int("level").unwrap(), Some(5));
    assert!(first.same_tree(&second));
    assert_eq!(root.len().unwrap(), 1);
}

#[test]
fn test_get_compound_absent_for_missing_and_non_compound() {
    let root = common::standalone();
    root.set_int("level", 1).unwrap();
    assert!(root.get_compound("missing").unwrap().is_none());
    assert!(root.get_compound("level").unwrap().is_none());
}

#[test]
fn test_write_through_non_compound_intermediate_fails() {
    let root = common::standalone();
    root.set_int("stats", 1).unwrap();
    let err = root.set_int("stats.level", 5).unwrap_err();
    assert!(matches!(
        err,
        TagError::TypeMismatch {
            expected: TagKind::Compound,
            found: TagKind::Int,
            ..
        }
    ));
}

#[test]
fn test_structural_equality() {
    let a = common::standalone();
    let b = common::standalone();
    for root in [&a, &b] {
        root.set_int("stats.level", 5).unwrap();
        root.set_string("stats.name", "Rogue").unwrap();
        root.get_integer_list("scores").unwrap().extend([1, 2]).unwrap();
    }
    assert!(a.structurally_eq(&b).unwrap());
    assert_eq!(a, b);

    b.set_int("stats.level", 6).unwrap();
    assert!(!a.structurally_eq(&b).unwrap());
    assert_ne!(a, b);
}

#[test]
fn test_equality_ignores_insertion_order() {
    let a = common::standalone();
    let b = common::standalone();
    a.set_int("x", 1).unwrap();
    a.set_int("y", 2).unwrap();
    b.set_int("y", 2).unwrap();
    b.set_int("x", 1).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_equality_distinguishes_kinds() {
    let a = common::standalone();
    let b = common::standalone();
    a.set_int("x", 1).unwrap();
    b.set_long("x", 1).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_end_to_end_bytes_round_trip() {
    let ctx = common::context(VersionToken::MC1_20_R3);
    let root = Compound::standalone(&ctx);
    root.set_int("stats.level", 5).unwrap();
    root.set_string("stats.name", "Rogue").unwrap();

    let stats = root.get_compound("stats").unwrap().unwrap();
    let expected: BTreeSet<String> = ["level", "name"].iter().map(|s| s.to_string()).collect();
    assert_eq!(stats.get_keys().unwrap(), expected);

    let bytes = root.to_bytes().unwrap();
    let reloaded = Compound::from_bytes(&ctx, &bytes).unwrap();
    assert_eq!(reloaded.get_int("stats.level").unwrap(), Some(5));
    assert_eq!(reloaded.get_string("stats.name").unwrap(), Some("Rogue".to_string()));
    assert_eq!(root, reloaded);
}

#[test]
fn test_clear_and_remove_nested() {
    let root = common::standalone();
    root.set_int("a.b.c", 1).unwrap();
    root.set_int("a.d", 2).unwrap();

    root.remove_key("a.b").unwrap();
    assert_eq!(root.get_int("a.b.c").unwrap(), None);
    assert_eq!(root.get_int("a.d").unwrap(), Some(2));

    let a = root.get_compound("a").unwrap().unwrap();
    a.clear().unwrap();
    assert!(a.is_empty().unwrap());
    assert!(root.has_key("a").unwrap());
}

#[test]
fn test_escaped_dot_key() {
    let root = common::standalone();
    root.set_int(r"minecraft:sharpness\.level", 3).unwrap();
    let keys = root.get_keys().unwrap();
    assert!(keys.contains("minecraft:sharpness.level"));
}

#[test]
fn test_merge_compound_nested() {
    let target = common::standalone();
    target.set_int("stats.level", 1).unwrap();
    target.set_int("stats.hp", 10).unwrap();

    let source = common::standalone();
    source.set_int("stats.level", 2).unwrap();
    source.set_string("title", "Knight").unwrap();

    target.merge_compound(&source).unwrap();
    assert_eq!(target.get_int("stats.level").unwrap(), Some(2));
    assert_eq!(target.get_int("stats.hp").unwrap(), Some(10));
    assert_eq!(target.get_string("title").unwrap(), Some("Knight".to_string()));
}

#[test]
fn test_merge_without_host_primitive_copies_key_by_key() {
    let ctx = common::PartialHost::new(VersionToken::MC1_20_R3)
        .without_method(TargetType::Compound, "a", &[ArgKind::Tag])
        .into_context();
    assert!(!ctx.is_available(AccessorId::CompoundMerge));

    let target = Compound::standalone(&ctx);
    target.set_int("stats.level", 1).unwrap();
    target.set_int("stats.hp", 10).unwrap();
    target.set_string("name", "Rogue").unwrap();

    let source = Compound::standalone(&ctx);
    source.set_int("stats.level", 2).unwrap();
    source.set_int("stats.mana", 4).unwrap();
    source.set_long("name", 7).unwrap();
    source.set_string("title", "Knight").unwrap();

    target.merge_compound(&source).unwrap();
    assert_eq!(target.get_int("stats.level").unwrap(), Some(2));
    assert_eq!(target.get_int("stats.hp").unwrap(), Some(10));
    assert_eq!(target.get_int("stats.mana").unwrap(), Some(4));
    assert_eq!(target.get_type("name").unwrap(), Some(TagKind::Long));
    assert_eq!(target.get_string("title").unwrap(), Some("Knight".to_string()));
}

#[test]
fn test_merge_into_child_view_without_host_primitive() {
    let ctx = common::PartialHost::new(VersionToken::MC1_12_R1)
        .without_method(TargetType::Compound, "a", &[ArgKind::Tag])
        .into_context();
    let root = Compound::standalone(&ctx);
    let stats = root.add_compound("stats").unwrap();
    stats.set_int("hp", 10).unwrap();

    let source = Compound::standalone(&ctx);
    source.set_int("level", 3).unwrap();

    stats.merge_compound(&source).unwrap();
    assert_eq!(root.get_int("stats.hp").unwrap(), Some(10));
    assert_eq!(root.get_int("stats.level").unwrap(), Some(3));
    assert_eq!(root.len().unwrap(), 1);
}
